//! Edge-layer descriptors and the mux/demux tree.
//!
//! A [`LayerInfo`] describes one logical data stream at a context edge. Most
//! layers are plain physical streams; two virtual forms exist on top:
//!
//! - **mux** layers aggregate several physical sub-streams into one logical
//!   stream, forming a tree whose leaves are the physical layers;
//! - **defused NMS** layers are physical fragments of one logical
//!   detection-output layer the compiler split apart.
//!
//! The program-image loader builds these descriptors; this model only reads
//! them.

use crate::error::{ProgramError, Result};

/// Direction of a stream relative to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamDirection {
    /// Host writes, device reads (inference input).
    HostToDevice,

    /// Device writes, host reads (inference output).
    DeviceToHost,
}

impl std::fmt::Display for StreamDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HostToDevice => write!(f, "h2d"),
            Self::DeviceToHost => write!(f, "d2h"),
        }
    }
}

/// Descriptor of one edge-layer data stream.
///
/// Invariants the loader upholds: `predecessors` is non-empty iff `is_mux`
/// is set, and `fused_nms_layer` is `Some` iff `is_defused_nms` is set.
/// Queries treat violations as [`ProgramError::InvalidLayer`], never panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    /// Stream name, unique within the owning context.
    pub name: String,

    /// Stream direction relative to the host.
    pub direction: StreamDirection,

    /// Owning network. Empty for single-network legacy programs.
    pub network_name: String,

    /// True if this is a virtual layer multiplexing several sub-streams.
    pub is_mux: bool,

    /// Mux sub-stream tree, populated only for mux layers. Order is
    /// significant: it fixes the demux enumeration order.
    pub predecessors: Vec<LayerInfo>,

    /// True if this layer is one fragment of a defused detection-output layer.
    pub is_defused_nms: bool,

    /// The logical fused layer this fragment was split from.
    pub fused_nms_layer: Option<Box<LayerInfo>>,
}

impl LayerInfo {
    /// Create a plain physical layer.
    pub fn new(
        name: impl Into<String>,
        direction: StreamDirection,
        network_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            direction,
            network_name: network_name.into(),
            is_mux: false,
            predecessors: Vec::new(),
            is_defused_nms: false,
            fused_nms_layer: None,
        }
    }

    /// Create a virtual mux layer aggregating `predecessors`.
    pub fn new_mux(
        name: impl Into<String>,
        direction: StreamDirection,
        network_name: impl Into<String>,
        predecessors: Vec<LayerInfo>,
    ) -> Self {
        Self {
            is_mux: true,
            predecessors,
            ..Self::new(name, direction, network_name)
        }
    }

    /// Create a defused fragment of the logical `fused` detection-output layer.
    pub fn new_defused_nms(
        name: impl Into<String>,
        direction: StreamDirection,
        network_name: impl Into<String>,
        fused: LayerInfo,
    ) -> Self {
        Self {
            is_defused_nms: true,
            fused_nms_layer: Some(Box::new(fused)),
            ..Self::new(name, direction, network_name)
        }
    }

    /// Names of the physical (non-mux) layers reachable from this layer,
    /// depth-first in predecessor order.
    ///
    /// For a non-mux layer this is exactly `[self.name]`. The order maps 1:1
    /// to the physical stream order downstream and must not change.
    #[must_use]
    pub fn demux_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_demux_names(&mut names);
        names
    }

    fn collect_demux_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        if self.is_mux {
            for predecessor in &self.predecessors {
                predecessor.collect_demux_names(names);
            }
        } else {
            names.push(&self.name);
        }
    }

    /// True if `edge_name` names a physical layer in this layer's mux tree
    /// (or this layer itself, for a non-mux layer).
    #[must_use]
    pub fn is_edge_under_mux(&self, edge_name: &str) -> bool {
        if !self.is_mux {
            return self.name == edge_name;
        }
        self.predecessors
            .iter()
            .any(|predecessor| predecessor.is_edge_under_mux(edge_name))
    }

    /// The logical fused layer this defused fragment belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::InvalidLayer`] if the fragment carries no
    /// fused-layer descriptor.
    pub fn fused_layer(&self) -> Result<&LayerInfo> {
        self.fused_nms_layer.as_deref().ok_or_else(|| {
            ProgramError::invalid_layer(format!(
                "defused layer '{}' has no fused-layer descriptor",
                self.name
            ))
        })
    }
}
