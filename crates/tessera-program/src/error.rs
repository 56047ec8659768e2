//! Error types for program-metadata queries

use thiserror::Error;

/// Result type alias for program-metadata operations
pub type Result<T> = std::result::Result<T, ProgramError>;

/// Coarse failure classification, for callers that route rather than match.
///
/// A [`ProgramError::kind`] of `NotFound` is usually user-facing ("no such
/// network"); `InternalFailure` means the program image violated an invariant
/// this model relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A lookup by name missed (layer, stream, vstream or network).
    NotFound,

    /// An invariant of the compiled program image does not hold.
    InternalFailure,
}

/// Errors that can occur while querying program metadata
#[derive(Debug, Error)]
pub enum ProgramError {
    /// No layer carries the requested stream name
    #[error("No layer found for stream '{name}'")]
    LayerNotFound {
        /// Stream name that was looked up
        name: String,
    },

    /// No layer resolves to the requested virtual-stream name
    #[error("No stream resolves to vstream '{name}'")]
    VstreamNotFound {
        /// Virtual-stream name that was looked up
        name: String,
    },

    /// Network name missing from the program's networks metadata
    #[error("Network '{name}' is not found in networks metadata")]
    NetworkNotFound {
        /// Network name that was requested
        name: String,
    },

    /// An output stream name is missing from the canonical output order
    #[error("Stream '{name}' not found in sorted output names")]
    NotInSortedOutputs {
        /// Offending vstream name
        name: String,
    },

    /// A network name does not fit the fixed-width record
    #[error("Network name '{name}' is too long ({max} bytes max, terminator included)")]
    NetworkNameTooLong {
        /// Offending network name
        name: String,
        /// Record capacity in bytes
        max: usize,
    },

    /// A layer descriptor violates a structural invariant
    #[error("Invalid layer: {reason}")]
    InvalidLayer {
        /// Reason for failure
        reason: String,
    },

    /// Transfer sizing is not defined for this layer
    #[error("Cannot size layer '{name}': {reason}")]
    UnsupportedLayer {
        /// Layer that could not be sized
        name: String,
        /// Reason for failure
        reason: String,
    },

    /// No metadata variant registered for the requested cluster layout
    #[error("No metadata for partial clusters layout bitmap {bitmap:#010x}")]
    LayoutNotFound {
        /// Requested layout bitmap
        bitmap: u32,
    },

    /// "Any layout" was requested but no variant is registered at all
    #[error("No cluster-layout variants registered")]
    EmptyLayoutMap,
}

impl ProgramError {
    /// Create an invalid layer error
    pub fn invalid_layer(reason: impl Into<String>) -> Self {
        Self::InvalidLayer {
            reason: reason.into(),
        }
    }

    /// Create an unsupported layer error
    ///
    /// Intended for [`TransferSizer`](crate::TransferSizer) implementations
    /// that cannot size a layer (unsupported format, missing shape data).
    pub fn unsupported_layer(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedLayer {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Coarse classification of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::LayerNotFound { .. }
            | Self::VstreamNotFound { .. }
            | Self::NetworkNotFound { .. } => ErrorKind::NotFound,
            Self::NotInSortedOutputs { .. }
            | Self::NetworkNameTooLong { .. }
            | Self::InvalidLayer { .. }
            | Self::UnsupportedLayer { .. }
            | Self::LayoutNotFound { .. }
            | Self::EmptyLayoutMap => ErrorKind::InternalFailure,
        }
    }
}
