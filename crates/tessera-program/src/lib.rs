#![deny(unsafe_code)]

//! Execution-plan metadata model for compiled Tessera NPU programs.
//!
//! The compiler partitions a network graph into hardware-scheduled
//! **contexts**, each carrying an action list and its edge layers, and
//! serializes the result into a program image. An external loader parses
//! that image and assembles the model in this crate; the runtime then
//! queries it for resolved layer, stream, virtual-stream and network views
//! and for DMA transfer sizing. Nothing here touches hardware.
//!
//! # Model shape
//!
//! | Type | Contents |
//! |------|----------|
//! | [`LayerInfo`] | One edge-layer data stream, possibly a mux tree or a defused detection-output fragment |
//! | [`ContextMetadata`] | One context: actions, categorized edge layers, config-buffer sizing |
//! | [`ProgramMetadata`] | One compiled variant: preliminary context plus the ordered dynamic contexts, and every query the runtime consumes |
//! | [`ProgramMetadataPerLayout`] | Variants of the same program keyed by partial-cluster-layout bitmap |
//!
//! # Lifecycle
//!
//! Assembly happens once, on a single loader thread, before the model is
//! published. Every query is `&self`, synchronous and allocation-bounded, so
//! concurrent readers need no synchronization.
//!
//! # Example
//!
//! ```
//! use tessera_program::{
//!     ContextMetadata, EdgeCategory, LayerInfo, ProgramMetadata, StreamDirection,
//!     SupportedFeatures,
//! };
//!
//! let mut context = ContextMetadata::default();
//! context.add_edge_layer(
//!     EdgeCategory::Boundary,
//!     LayerInfo::new("input0", StreamDirection::HostToDevice, "net0"),
//! );
//!
//! let program = ProgramMetadata::new(
//!     "resnet50",
//!     ContextMetadata::default(),
//!     vec![context],
//!     Vec::new(),
//!     Vec::new(),
//!     SupportedFeatures::default(),
//!     vec!["net0".to_string()],
//! );
//!
//! assert_eq!(program.contexts_count(), 2);
//! assert_eq!(program.input_layers().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod action;
mod context;
mod error;
mod layer;
mod per_layout;
mod program;
mod views;

pub use action::{Action, ActionType};
pub use context::{ConfigBufferInfoMap, ContextMetadata, EdgeCategory};
pub use error::{ErrorKind, ProgramError, Result};
pub use layer::{LayerInfo, StreamDirection};
pub use per_layout::ProgramMetadataPerLayout;
pub use program::{
    ConfigChannelInfo, ProgramMetadata, SupportedFeatures, DEFAULT_NETWORK_NAME,
};
pub use views::{NetworkInfo, StreamInfo, TransferSizer, ViewResolver, VstreamInfo};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        Action, ActionType, ContextMetadata, EdgeCategory, LayerInfo, ProgramError,
        ProgramMetadata, ProgramMetadataPerLayout, Result, StreamDirection, SupportedFeatures,
        TransferSizer, ViewResolver,
    };
}
