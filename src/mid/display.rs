//! Dual-buffer scrolling text engine for the MID display.
//!
//! The controller keeps two text buffers: the persistent *main* text and
//! a transient *overlay* banner shown atop it. Once per display tick,
//! [`MidContext::render_tick`] decides which one owns the physical
//! display and pushes at most one window of text to the bus.
//!
//! Timeout semantics differ between the two:
//! - main: a positive timeout is a hold counter - ticks to wait before
//!   the scroll advances; it is not an expiry.
//! - overlay: positive counts down to auto-dismissal, 0 dismisses on the
//!   tick it is evaluated, [`OVERLAY_INDEFINITE`] persists until the
//!   overlay is replaced. Anything below the sentinel is invalid input
//!   and also dismisses.

use crate::config::{
    DISPLAY_TEXT_SIZE, DISPLAY_WINDOW, SCROLL_CHUNK_HOLD, SCROLL_END_HOLD, SCROLL_START_HOLD,
};
use crate::ibus::{IbusPort, Ignition};
use crate::settings::{MetadataMode, Settings};
use heapless::String;

use super::{MidContext, Mode};

/// Overlay timeout sentinel: show until explicitly replaced.
pub const OVERLAY_INDEFINITE: i8 = -1;

/// Lifecycle of the overlay buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverlayStatus {
    /// Not shown; the main buffer owns the display.
    #[default]
    Inactive,
    /// Fresh text waiting for its first render tick.
    PendingShow,
    /// On the display, aging toward dismissal.
    Showing,
}

/// One text buffer with its cursor and timeout state.
///
/// The scroll cursor wraps to 0 whenever it reaches the logical text
/// end, so a render never starts a window past the last character (the
/// fit-case reuses the cursor as an "already emitted" flag).
#[derive(Debug, Default)]
pub struct DisplayField {
    pub(crate) text: String<DISPLAY_TEXT_SIZE>,
    pub(crate) cursor: usize,
    pub(crate) timeout: i8,
    pub(crate) status: OverlayStatus,
}

impl DisplayField {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current text content.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Compose `prefix` and `suffix` into `out`, truncating at capacity.
///
/// An empty prefix yields the bare suffix; otherwise the two are joined
/// with a single space. The MID character set is ASCII - anything else
/// is replaced so the byte-indexed scroll window stays valid.
fn compose(out: &mut String<DISPLAY_TEXT_SIZE>, prefix: &str, suffix: &str) {
    out.clear();
    let parts = if prefix.is_empty() {
        [suffix, ""]
    } else {
        [prefix, suffix]
    };
    for (i, part) in parts.iter().enumerate() {
        if i > 0 && !part.is_empty() {
            let _ = out.push(' ');
        }
        for c in part.chars() {
            let c = if c.is_ascii() && !c.is_ascii_control() {
                c
            } else {
                '?'
            };
            if out.push(c).is_err() {
                return;
            }
        }
    }
}

impl MidContext {
    /// Replace the main display text with the mode prefix plus `suffix`.
    ///
    /// Resets the scroll cursor, applies `hold` ticks before scrolling
    /// starts and requests an out-of-band render so the text appears
    /// within one tick. Over-capacity text is silently truncated.
    pub fn set_main_text(&mut self, suffix: &str, hold: i8) {
        let prefix = self.prefix.clone();
        compose(&mut self.main.text, &prefix, suffix);
        self.main.cursor = 0;
        self.main.timeout = hold;
        self.refresh = true;
    }

    /// Show a transient overlay banner for `timeout` ticks.
    ///
    /// See the module docs for the timeout semantics; the main text is
    /// left untouched and resumes when the overlay dismisses.
    pub fn set_overlay_text(&mut self, suffix: &str, timeout: i8) {
        let prefix = self.prefix.clone();
        compose(&mut self.overlay.text, &prefix, suffix);
        self.overlay.cursor = 0;
        self.overlay.timeout = timeout;
        self.overlay.status = OverlayStatus::PendingShow;
        self.refresh = true;
    }

    /// Current overlay lifecycle state, for inspection.
    pub fn overlay_status(&self) -> OverlayStatus {
        self.overlay.status
    }

    /// Main display buffer, for inspection.
    pub fn main_display(&self) -> &DisplayField {
        &self.main
    }

    /// The fast scheduled task: age the overlay or advance the main
    /// scroll, emitting at most one display write.
    ///
    /// No-op while the UI is off or suspended, or with ignition off.
    pub fn render_tick<I: IbusPort, S: Settings>(&mut self, ibus: &mut I, settings: &S) {
        if self.mode == Mode::Off
            || self.mode == Mode::DisplaySuspended
            || ibus.ignition() == Ignition::Off
        {
            return;
        }

        if self.overlay.status > OverlayStatus::Inactive {
            match self.overlay.timeout {
                0 => self.overlay.status = OverlayStatus::Inactive,
                t if t > 0 => self.overlay.timeout -= 1,
                OVERLAY_INDEFINITE => {}
                // Below the sentinel: invalid caller input, dismiss.
                _ => self.overlay.status = OverlayStatus::Inactive,
            }
            if self.overlay.status == OverlayStatus::PendingShow {
                ibus.write_display(&self.overlay.text);
                self.overlay.status = OverlayStatus::Showing;
            }
            // Keep the main buffer ready to resume cleanly once the
            // overlay dismisses.
            if self.main.text.len() <= DISPLAY_WINDOW {
                self.main.cursor = 0;
            }
            return;
        }

        if self.main.timeout > 0 {
            self.main.timeout -= 1;
            return;
        }

        let length = self.main.text.len();
        if length > DISPLAY_WINDOW {
            // A window starting on a space would show a blank leading
            // column; skip it so the scroll reads smoothly.
            if self.main.cursor < length && self.main.text.as_bytes()[self.main.cursor] == b' ' {
                self.main.cursor += 1;
            }
            // The skip can land past the last character (trailing-space
            // text under chunked pacing); treat that as end-of-text.
            if self.main.cursor >= length {
                self.main.timeout = SCROLL_END_HOLD;
                self.main.cursor = 0;
                return;
            }
            let start = self.main.cursor;
            let mut end = start + DISPLAY_WINDOW;
            let reached_end = end >= length;
            if reached_end {
                end = length;
            }
            ibus.write_display(&self.main.text[start..end]);

            if start == 0 {
                self.main.timeout = SCROLL_START_HOLD;
            }
            if reached_end {
                self.main.timeout = SCROLL_END_HOLD;
                self.main.cursor = 0;
            } else if settings.metadata_mode() == MetadataMode::Chunked {
                self.main.timeout = SCROLL_CHUNK_HOLD;
                self.main.cursor = start + DISPLAY_WINDOW;
            } else {
                self.main.cursor = start + 1;
            }
        } else {
            // Fits in one window: emit once, then suppress identical
            // writes on idle ticks (cursor doubles as the emitted flag).
            if self.main.cursor == 0 {
                ibus.write_display(&self.main.text);
            }
            self.main.cursor = 1;
        }
    }
}
