//! Per-context metadata: action list, edge layers, config-buffer sizing.

use std::collections::BTreeMap;

use crate::action::{Action, ActionType};
use crate::error::Result;
use crate::layer::{LayerInfo, StreamDirection};
use crate::views::TransferSizer;

/// Config-buffer sizing: config channel index → byte size of each
/// incremental descriptor write to that channel, in write order.
pub type ConfigBufferInfoMap = BTreeMap<u8, Vec<u32>>;

/// Category of an edge layer within a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeCategory {
    /// Crosses the host/device boundary (true inference input/output).
    Boundary,

    /// Passes data between two contexts of the same program.
    InterContext,

    /// Staged through off-chip DDR memory.
    Ddr,
}

/// Edge-layer slots: three categories × two directions.
const EDGE_SLOTS: usize = 6;

const fn edge_slot(category: EdgeCategory, direction: StreamDirection) -> usize {
    let category_index = match category {
        EdgeCategory::Boundary => 0,
        EdgeCategory::InterContext => 1,
        EdgeCategory::Ddr => 2,
    };
    let direction_index = match direction {
        StreamDirection::HostToDevice => 0,
        StreamDirection::DeviceToHost => 1,
    };
    category_index * 2 + direction_index
}

/// Metadata of one hardware execution context.
///
/// Built once by the program-image loader from the context's action list and
/// config-buffer map; edge layers are appended during assembly and the whole
/// structure is read-only afterwards. Every added layer lands in exactly one
/// of the six (category, direction) slots.
#[derive(Debug, Clone, Default)]
pub struct ContextMetadata {
    actions: Vec<Action>,
    config_buffers_info: ConfigBufferInfoMap,
    edge_layers: [Vec<LayerInfo>; EDGE_SLOTS],
}

impl ContextMetadata {
    /// Create context metadata from its action list and config-buffer map.
    #[must_use]
    pub fn new(actions: Vec<Action>, config_buffers_info: ConfigBufferInfoMap) -> Self {
        Self {
            actions,
            config_buffers_info,
            edge_layers: Default::default(),
        }
    }

    /// Append an edge layer. The direction sub-list is chosen by the layer's
    /// own direction.
    pub fn add_edge_layer(&mut self, category: EdgeCategory, layer: LayerInfo) {
        self.edge_layers[edge_slot(category, layer.direction)].push(layer);
    }

    /// All actions, in hardware execution order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Actions whose type is in `action_types`, original relative order
    /// preserved.
    #[must_use]
    pub fn actions_of_type(&self, action_types: &[ActionType]) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|action| action_types.contains(&action.action_type()))
            .collect()
    }

    /// Config-buffer sizing for this context.
    #[must_use]
    pub const fn config_buffers_info(&self) -> &ConfigBufferInfoMap {
        &self.config_buffers_info
    }

    /// Edge layers of one (category, direction) slot, in insertion order.
    #[must_use]
    pub fn edge_layers(&self, category: EdgeCategory, direction: StreamDirection) -> &[LayerInfo] {
        &self.edge_layers[edge_slot(category, direction)]
    }

    /// Boundary layers fed by the host.
    #[must_use]
    pub fn boundary_input_layers(&self) -> &[LayerInfo] {
        self.edge_layers(EdgeCategory::Boundary, StreamDirection::HostToDevice)
    }

    /// Boundary layers read by the host.
    #[must_use]
    pub fn boundary_output_layers(&self) -> &[LayerInfo] {
        self.edge_layers(EdgeCategory::Boundary, StreamDirection::DeviceToHost)
    }

    /// Inter-context layers consumed by this context.
    #[must_use]
    pub fn inter_context_input_layers(&self) -> &[LayerInfo] {
        self.edge_layers(EdgeCategory::InterContext, StreamDirection::HostToDevice)
    }

    /// Inter-context layers produced by this context.
    #[must_use]
    pub fn inter_context_output_layers(&self) -> &[LayerInfo] {
        self.edge_layers(EdgeCategory::InterContext, StreamDirection::DeviceToHost)
    }

    /// DDR-staged layers consumed by this context.
    #[must_use]
    pub fn ddr_input_layers(&self) -> &[LayerInfo] {
        self.edge_layers(EdgeCategory::Ddr, StreamDirection::HostToDevice)
    }

    /// DDR-staged layers produced by this context.
    #[must_use]
    pub fn ddr_output_layers(&self) -> &[LayerInfo] {
        self.edge_layers(EdgeCategory::Ddr, StreamDirection::DeviceToHost)
    }

    /// Total bytes this context moves: all config-buffer writes plus the
    /// transfer size of every edge layer.
    ///
    /// # Errors
    ///
    /// Propagates the first sizing failure from `sizer`.
    pub fn transfer_size(&self, sizer: &impl TransferSizer) -> Result<usize> {
        let mut total: usize = self
            .config_buffers_info
            .values()
            .flat_map(|write_sizes| write_sizes.iter())
            .map(|&size| size as usize)
            .sum();

        for layers in &self.edge_layers {
            for layer in layers {
                total += sizer.transfer_size(layer)?;
            }
        }

        Ok(total)
    }
}
