//! Unified error type for bt2mid.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! Only registration paths can fail. Runtime input never errors: text
//! over capacity is truncated and unrecognized codes are ignored, so
//! the controller stays live for the next tick or event.

/// Top-level error type used across the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The event registry has no free subscription slot.
    RegistryFull,

    /// The scheduler has no free task slot.
    SchedulerFull,
}
