//! Single-line settings submenu.
//!
//! The menu shows one `name: value` line at a time on the main display.
//! Browsing steps through the entries; pressing Edit stages the current
//! value for cycling and pressing Save writes it back to the store.

use heapless::String;

use crate::settings::{SettingKey, Settings};

use super::Direction;

/// Entries in browse order.
const MENU_ENTRIES: [SettingKey; 2] = [SettingKey::MetadataMode, SettingKey::SelfPlay];

/// One rendered menu line, `"Metadata: Smooth"` style.
pub type MenuLine = String<32>;

/// Browse/edit state of the settings submenu.
#[derive(Clone, Debug, Default)]
pub struct SettingsMenu {
    index: u8,
    editing: bool,
    /// Value being cycled while editing; committed on save.
    staged: u8,
}

impl SettingsMenu {
    pub const fn new() -> Self {
        Self {
            index: 0,
            editing: false,
            staged: 0,
        }
    }

    /// Whether an edit is in progress.
    pub fn editing(&self) -> bool {
        self.editing
    }

    /// Reset to the first entry in browse state and render its line.
    pub fn open<S: Settings>(&mut self, settings: &S) -> MenuLine {
        self.index = 0;
        self.editing = false;
        let key = MENU_ENTRIES[0];
        line(key, settings.get(key))
    }

    /// Step the browse selection, or cycle the staged value mid-edit.
    pub fn scroll<S: Settings>(&mut self, direction: Direction, settings: &S) -> MenuLine {
        let key = MENU_ENTRIES[self.index as usize];
        if self.editing {
            self.staged = step(self.staged, key.value_count(), direction);
            line(key, self.staged)
        } else {
            self.index = step(self.index, MENU_ENTRIES.len() as u8, direction);
            let key = MENU_ENTRIES[self.index as usize];
            line(key, settings.get(key))
        }
    }

    /// Toggle between browsing and editing. Entering an edit stages the
    /// stored value; leaving it persists the staged one.
    pub fn edit_save<S: Settings>(&mut self, settings: &mut S) -> MenuLine {
        let key = MENU_ENTRIES[self.index as usize];
        if self.editing {
            settings.set(key, self.staged);
            self.editing = false;
        } else {
            self.staged = settings.get(key);
            self.editing = true;
        }
        line(key, settings.get(key))
    }
}

fn step(value: u8, count: u8, direction: Direction) -> u8 {
    match direction {
        Direction::Next => {
            if value + 1 < count {
                value + 1
            } else {
                0
            }
        }
        Direction::Previous => {
            if value == 0 {
                count - 1
            } else {
                value - 1
            }
        }
    }
}

fn line(key: SettingKey, value: u8) -> MenuLine {
    let mut out = MenuLine::new();
    let _ = out.push_str(key.label());
    let _ = out.push_str(": ");
    let _ = out.push_str(key.value_label(value));
    out
}
