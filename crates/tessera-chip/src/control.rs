//! Context accounting and fixed-record limits of the context-switch
//! control protocol.
//!
//! The firmware schedules one non-dynamic (preliminary) context ahead of the
//! dynamic context sequence; counts reported to callers include it. Name
//! records exchanged with the firmware are fixed-width and NUL-terminated.

/// Non-dynamic contexts scheduled before the dynamic sequence.
///
/// The preliminary context occupies exactly one scheduling slot.
pub const NON_DYNAMIC_CONTEXTS_COUNT: usize = 1;

/// Width in bytes of a fixed network-name record, terminator included.
pub const MAX_NETWORK_NAME_SIZE: usize = 64;

/// Physical config DMA channels available to a single program.
pub const MAX_CONFIG_CHANNELS: usize = 4;
