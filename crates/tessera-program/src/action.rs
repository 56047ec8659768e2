//! Context-switch actions.
//!
//! Every context carries an ordered list of low-level actions the control
//! channel replays on the device: config-channel activation, descriptor
//! writes, sequencer triggers, edge-channel management. This model treats
//! the payload as opaque; only the type tag is queryable.

use bytes::Bytes;

/// Type tag of a context-switch action.
///
/// Closed enumeration: the program-image loader and this model must agree on
/// the full set, so no variant is ever added without a format revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Open a config DMA channel for descriptor writes.
    ActivateConfigChannel,
    /// Close a config DMA channel.
    DeactivateConfigChannel,
    /// Push a burst of config descriptors over an open channel.
    WriteConfigDescriptors,
    /// Kick the cluster configuration sequencer.
    TriggerSequencer,
    /// Block until the sequencer reports completion.
    WaitForSequencerDone,
    /// Block until all in-flight DMA settles.
    WaitForDmaIdle,
    /// Block until a hardware module acknowledges its configuration.
    WaitForModuleConfigDone,
    /// Open a boundary (host-facing) stream channel.
    ActivateBoundaryChannel,
    /// Open an inter-context stream channel.
    ActivateInterContextChannel,
    /// Open a DDR staging stream channel.
    ActivateDdrChannel,
    /// Close a previously opened stream channel.
    DeactivateChannel,
    /// Begin DDR buffering for the upcoming context.
    DdrBufferingStart,
}

/// One opaque action descriptor, as produced by the program-image loader.
///
/// The payload is the raw blob the control channel will replay; `Bytes`
/// keeps clones of large action lists cheap.
#[derive(Debug, Clone)]
pub struct Action {
    action_type: ActionType,
    payload: Bytes,
}

impl Action {
    /// Create an action from its type tag and raw payload.
    pub fn new(action_type: ActionType, payload: impl Into<Bytes>) -> Self {
        Self {
            action_type,
            payload: payload.into(),
        }
    }

    /// Type tag of this action.
    #[must_use]
    pub const fn action_type(&self) -> ActionType {
        self.action_type
    }

    /// Raw action payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}
