//! Runtime-facing stream, virtual-stream and network views.
//!
//! Converting a layer descriptor into its runtime view (frame sizes, format
//! conversion) depends on shape and quantization data owned by the
//! program-image loader, so this model consumes those conversions through
//! the [`TransferSizer`] and [`ViewResolver`] seams; it never implements
//! them.

use crate::error::{ProgramError, Result};
use crate::layer::{LayerInfo, StreamDirection};
use tessera_chip::control::MAX_NETWORK_NAME_SIZE;

/// Runtime descriptor of one physical stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// Physical stream name.
    pub name: String,

    /// Stream direction relative to the host.
    pub direction: StreamDirection,

    /// Bytes moved over the wire per frame.
    pub hw_frame_size: usize,
}

/// Runtime descriptor of one virtual stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VstreamInfo {
    /// Virtual-stream name.
    pub name: String,

    /// Owning network.
    pub network_name: String,

    /// Stream direction relative to the host.
    pub direction: StreamDirection,
}

/// Computes the DMA transfer size of a single edge layer.
///
/// Implemented by the loader, which owns the format and shape data the
/// computation needs.
pub trait TransferSizer {
    /// Transfer size in bytes of one edge layer.
    ///
    /// # Errors
    ///
    /// Returns an error for layers whose format the implementation cannot
    /// size; [`ProgramError::unsupported_layer`] is the conventional shape.
    fn transfer_size(&self, layer: &LayerInfo) -> Result<usize>;
}

/// Resolves a layer descriptor into its runtime stream/vstream views.
///
/// A single layer may resolve to several virtual streams (a fused
/// detection-output layer reconstructed from its fragments yields one
/// descriptor per fragment, all naming the same logical vstream).
pub trait ViewResolver {
    /// Stream descriptor of one physical layer.
    fn stream_info(&self, layer: &LayerInfo) -> StreamInfo;

    /// Virtual-stream descriptors of one layer, one or more.
    fn vstream_infos(&self, layer: &LayerInfo) -> Vec<VstreamInfo>;
}

/// Fixed-width network-name record, as exchanged with the firmware.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    name: [u8; MAX_NETWORK_NAME_SIZE],
    name_len: usize,
}

impl NetworkInfo {
    /// Create a record from a network name.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::NetworkNameTooLong`] if the name plus its
    /// terminator does not fit the fixed record.
    pub fn new(name: &str) -> Result<Self> {
        if name.len() + 1 > MAX_NETWORK_NAME_SIZE {
            tracing::error!(
                "network '{name}' has a too long name ({MAX_NETWORK_NAME_SIZE} bytes max)"
            );
            return Err(ProgramError::NetworkNameTooLong {
                name: name.to_string(),
                max: MAX_NETWORK_NAME_SIZE,
            });
        }

        let mut record = [0u8; MAX_NETWORK_NAME_SIZE];
        record[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self {
            name: record,
            name_len: name.len(),
        })
    }

    /// The network name.
    #[must_use]
    pub fn name(&self) -> &str {
        // Written from a &str in new(); always valid UTF-8.
        std::str::from_utf8(&self.name[..self.name_len]).unwrap_or("")
    }
}

impl std::fmt::Debug for NetworkInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkInfo")
            .field("name", &self.name())
            .finish()
    }
}

impl std::fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
