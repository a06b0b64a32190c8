//! Application-wide constants and compile-time configuration.
//!
//! All display geometry, timing parameters and capacity limits live
//! here so they can be tuned in one place.

// Display geometry

/// Number of characters the MID text area can show at once.
pub const DISPLAY_WINDOW: usize = 11;

/// Capacity of a display text buffer (prefix + body, truncated beyond this).
pub const DISPLAY_TEXT_SIZE: usize = 48;

/// Capacity of the per-mode prefix label ("Bluetooth" in the main menu).
pub const PREFIX_TEXT_SIZE: usize = 12;

/// Width of one menu-button label slot (fixed 4-character cells).
pub const MENU_LABEL_WIDTH: usize = 4;

/// Maximum characters of a paired-device name shown in the Devices menu
/// (before the active-device marker is appended).
pub const DEVICE_NAME_WIDTH: usize = 15;

// Timing
//
// The scheduler base tick equals one display tick. All tick-counted
// timeouts below are derived from `DISPLAY_TICK_MS`.

/// Period of the display render task (ms).
pub const DISPLAY_TICK_MS: u32 = 64;

/// Interval of the display render task, in scheduler base ticks.
pub const DISPLAY_TASK_TICKS: u16 = 1;

/// Interval of the pending-mode commit task, in scheduler base ticks.
/// 8 ticks = 512 ms; menu-label bursts happen at most this often.
pub const MENU_COMMIT_TICKS: u16 = 8;

/// Ticks to hold the first window before scrolling begins.
pub const SCROLL_START_HOLD: i8 = 5;

/// Ticks to hold the last window before wrapping to the start.
pub const SCROLL_END_HOLD: i8 = 2;

/// Ticks to hold between reveals in chunked scrolling mode.
pub const SCROLL_CHUNK_HOLD: i8 = 2;

/// How long the "Pairing mode on/off" banner stays up (1500 ms in ticks).
pub const PAIRING_BANNER_TICKS: i8 = (1500 / DISPLAY_TICK_MS) as i8;

/// Hold applied to a fresh track title so it can be read before it
/// starts scrolling (3000 ms in ticks).
pub const METADATA_READ_TICKS: i8 = (3000 / DISPLAY_TICK_MS) as i8;

// Capacities

/// Maximum number of event-registry subscriptions.
pub const EVENT_REGISTRY_CAPACITY: usize = 16;

/// Maximum number of scheduled tasks.
pub const SCHEDULER_CAPACITY: usize = 4;

/// Maximum number of UI-raised events queued during one dispatch.
pub const OUTBOX_CAPACITY: usize = 4;
