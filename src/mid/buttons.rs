//! Mode-scoped button dispatch.
//!
//! Raw button codes arrive off the bus as `MidButtonPress` events; what
//! a button does depends on the active mode, mirroring the labels the
//! menu setup routines wrote over the physical button row. Codes with
//! no meaning in the current mode are ignored - unexpected bus traffic
//! must never halt the controller.

use crate::bt::{Bluetooth, PlaybackStatus};
use crate::config::PAIRING_BANNER_TICKS;
use crate::event::Event;
use crate::ibus::{IbusPort, MenuButton, SourceFunction};
use crate::settings::Settings;

use super::{write_play_label, Direction, MidContext, Mode};

// Raw codes of the menu button row, matching the label slot layout.
pub const BTN_ONE_L: u8 = 0x01;
pub const BTN_ONE_R: u8 = 0x02;
pub const BTN_TWO_L: u8 = 0x03;
pub const BTN_TWO_R: u8 = 0x04;
pub const BTN_FOUR_L: u8 = 0x07;
pub const BTN_FOUR_R: u8 = 0x08;
pub const BTN_FIVE_L: u8 = 0x09;
pub const BTN_FIVE_R: u8 = 0x0A;
pub const BTN_SIX_L: u8 = 0x0B;
pub const BTN_SIX_R: u8 = 0x0C;
pub const BTN_PLAY_L: u8 = 0x0D;
pub const BTN_PLAY_R: u8 = 0x0E;

/// Steering-wheel / rocker transport buttons (release codes).
pub const BTN_TRACK_PREV_RELEASE: u8 = 0x45;
pub const BTN_TRACK_NEXT_RELEASE: u8 = 0x46;

impl MidContext {
    /// Interpret one button code against the active mode.
    pub(crate) fn on_button_press<B, I, S>(
        &mut self,
        code: u8,
        bt: &mut B,
        ibus: &mut I,
        settings: &mut S,
    ) where
        B: Bluetooth,
        I: IbusPort,
        S: Settings,
    {
        match self.mode {
            Mode::Active => match code {
                BTN_PLAY_L | BTN_PLAY_R => match bt.playback_status() {
                    PlaybackStatus::Playing => {
                        bt.pause();
                        write_play_label(ibus, PlaybackStatus::Paused);
                    }
                    PlaybackStatus::Paused => {
                        bt.play();
                        write_play_label(ibus, PlaybackStatus::Playing);
                    }
                },
                BTN_FIVE_L | BTN_FIVE_R => self.enter_mode(Mode::Settings),
                _ => {}
            },
            Mode::Settings => match code {
                BTN_SIX_L | BTN_SIX_R => self.enter_mode(Mode::Active),
                BTN_ONE_L => {
                    let line = self.menu.edit_save(settings);
                    let label = if self.menu.editing() { "Save" } else { "Edit" };
                    ibus.write_menu_label(MenuButton::OneL, label);
                    self.set_main_text(&line, 0);
                }
                BTN_TWO_L => {
                    let line = self.menu.scroll(Direction::Previous, settings);
                    self.set_main_text(&line, 0);
                }
                BTN_TWO_R => {
                    let line = self.menu.scroll(Direction::Next, settings);
                    self.set_main_text(&line, 0);
                }
                BTN_FOUR_L | BTN_FOUR_R => self.enter_mode(Mode::Devices),
                BTN_FIVE_L | BTN_FIVE_R => self.toggle_pairing(bt),
                _ => {}
            },
            Mode::Devices => match code {
                BTN_SIX_L | BTN_SIX_R => self.enter_mode(Mode::Settings),
                BTN_ONE_L | BTN_ONE_R => self.connect_selected(bt),
                BTN_TWO_L => self.show_device(Direction::Previous, bt),
                BTN_TWO_R => self.show_device(Direction::Next, bt),
                _ => {}
            },
            Mode::Off | Mode::DisplaySuspended => {}
        }

        // The transport pair works in every mode while the radio reports
        // an active playback-capable source.
        if ibus.source_function() != SourceFunction::NotPlaying {
            match code {
                BTN_TRACK_NEXT_RELEASE => bt.next_track(),
                BTN_TRACK_PREV_RELEASE => bt.previous_track(),
                _ => {}
            }
        }
    }

    /// Flip discoverability and show a transient pairing banner.
    ///
    /// Turning pairing on while a device is connected first asks for the
    /// active link to be closed so the slot is free for a new pairing.
    fn toggle_pairing<B: Bluetooth>(&mut self, bt: &mut B) {
        if bt.discoverable() {
            self.set_overlay_text("Pairing mode off", PAIRING_BANNER_TICKS);
            bt.set_discoverable(false);
        } else {
            self.set_overlay_text("Pairing mode on", PAIRING_BANNER_TICKS);
            if bt.active_mac().is_some() {
                self.raise(Event::CloseConnection);
            }
            bt.set_discoverable(true);
        }
    }

    /// Request a connection to the selected device, unless it is already
    /// the active one (compared by link address).
    fn connect_selected<B: Bluetooth>(&mut self, bt: &B) {
        let Some(index) = self.device_index else {
            return;
        };
        let Some(device) = bt.paired_devices().get(index as usize) else {
            return;
        };
        if bt.active_mac() != Some(device.mac) {
            self.raise(Event::InitiateConnection(index));
        }
    }
}
