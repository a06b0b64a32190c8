//! Bus and Bluetooth notification handlers.
//!
//! Each method here is the body of one event callback: CD-changer status
//! emulation, ignition safety reset, radio display interference guard,
//! panel open/close negotiation and the Bluetooth link notifications.

use crate::bt::Bluetooth;
use crate::config::{MENU_LABEL_WIDTH, METADATA_READ_TICKS};
use crate::ibus::{
    CdcCommand, DeviceId, IbusPort, Ignition, ARTIST_LABEL_ROW, MAIN_AREA_WATERMARK,
    MODE_PRESS_BUTTON, MODE_REQUEST_PHYSICAL, PANEL_MODE_CLAIM, PANEL_MODE_RELEASE, PANEL_NONE,
    PANEL_RADIO_OPEN, PANEL_TEL_CLOSE, PANEL_TEL_OPEN,
};
use crate::settings::{MetadataMode, Settings};

use super::{write_play_label, Handshake, MidContext, Mode};

impl MidContext {
    /// Banner on link up. Only visible while our panel is active.
    pub(crate) fn bt_device_connected(&mut self) {
        if self.mode == Mode::Active {
            self.set_prefix("");
            self.set_main_text("Bluetooth connected :)", 0);
        }
    }

    /// Banner on link down.
    pub(crate) fn bt_device_disconnected(&mut self) {
        if self.mode == Mode::Active {
            self.set_prefix("");
            self.set_main_text("Bluetooth disconnected", 0);
        }
    }

    /// Render fresh track metadata: the artist split across the menu
    /// label row, the title as scrolling main text with an initial hold
    /// long enough to read the start before it moves.
    pub(crate) fn bt_metadata_update<B, I, S>(&mut self, bt: &mut B, ibus: &mut I, settings: &mut S)
    where
        B: Bluetooth,
        I: IbusPort,
        S: Settings,
    {
        if self.mode != Mode::Active
            || bt.title().is_empty()
            || settings.metadata_mode() == MetadataMode::Off
        {
            return;
        }
        self.set_prefix("");

        let artist = bt.artist().as_bytes();
        let mut cell = [0u8; MENU_LABEL_WIDTH];
        for (slot, button) in ARTIST_LABEL_ROW.iter().enumerate() {
            for (j, byte) in cell.iter_mut().enumerate() {
                *byte = match artist.get(slot * MENU_LABEL_WIDTH + j) {
                    Some(&b) if b.is_ascii() && !b.is_ascii_control() => b,
                    _ => b' ',
                };
            }
            // Cells are built from ASCII bytes only.
            if let Ok(label) = core::str::from_utf8(&cell) {
                ibus.write_menu_label(*button, label);
            }
        }

        self.set_main_text(bt.title(), METADATA_READ_TICKS);
    }

    /// Refresh the play/pause label and pull metadata for the new track.
    pub(crate) fn bt_playback_status<B, I>(&mut self, bt: &mut B, ibus: &mut I)
    where
        B: Bluetooth,
        I: IbusPort,
    {
        if self.mode == Mode::Active {
            write_play_label(ibus, bt.playback_status());
            bt.request_metadata();
        }
    }

    /// CD-changer command emulation: the radio steers our claim on the
    /// display slot through start/stop/status/media-change requests.
    pub(crate) fn cdc_status_request<I: IbusPort>(&mut self, command: CdcCommand, ibus: &mut I) {
        match command {
            CdcCommand::StopPlaying => {
                if self.mode != Mode::DisplaySuspended && self.mode != Mode::Off {
                    ibus.set_panel_mode(DeviceId::Telephone, PANEL_MODE_RELEASE);
                }
                self.mode = Mode::Off;
                self.handshake = Handshake::Idle;
            }
            CdcCommand::StartPlaying => {
                self.handshake = Handshake::Idle;
                if self.mode == Mode::Off {
                    ibus.set_panel_mode(DeviceId::Telephone, PANEL_MODE_CLAIM);
                }
            }
            CdcCommand::CdChange => {
                if self.mode == Mode::DisplaySuspended {
                    ibus.set_panel_mode(DeviceId::Telephone, PANEL_MODE_CLAIM);
                }
            }
            CdcCommand::GetStatus => {
                // A status poll while we wait on the release handshake
                // means the user declined the hand-off; reclaim the slot.
                if self.mode == Mode::DisplaySuspended
                    && self.handshake == Handshake::AwaitingRelease
                {
                    self.handshake = Handshake::Idle;
                    ibus.set_panel_mode(DeviceId::Telephone, PANEL_MODE_CLAIM);
                }
            }
        }
    }

    /// Safety reset: drop the panel claim when the ignition goes off.
    pub(crate) fn ignition_status<I: IbusPort>(&mut self, ignition: Ignition, ibus: &mut I) {
        if ignition == Ignition::Off
            && self.mode != Mode::DisplaySuspended
            && self.mode != Mode::Off
        {
            ibus.set_panel_mode(DeviceId::Telephone, PANEL_MODE_RELEASE);
            self.mode = Mode::Off;
            self.handshake = Handshake::Idle;
        }
    }

    /// Blank radio writes that land outside the primary area while our
    /// panel is on screen, so the radio's text cannot bleed into it.
    pub(crate) fn rad_display_update<I: IbusPort>(&mut self, watermark: u8, ibus: &mut I) {
        if watermark != MAIN_AREA_WATERMARK
            && (self.mode == Mode::Active || self.mode == Mode::DisplaySuspended)
            && self.handshake == Handshake::Idle
        {
            ibus.write_radio_title("");
        }
    }

    /// Panel open/close negotiation from the radio.
    ///
    /// Opening our panel with a physical button press requests the
    /// Active transition; a programmatic open instead starts playback
    /// when self-play is enabled, without touching the mode. Any other
    /// panel taking the display suspends us, and a radio-panel open seen
    /// mid-handshake forwards the synthetic menu press and advances the
    /// handshake.
    pub(crate) fn mid_mode_change<I, S>(
        &mut self,
        panel: u8,
        request: u8,
        ibus: &mut I,
        settings: &mut S,
    ) where
        I: IbusPort,
        S: Settings,
    {
        if panel == PANEL_TEL_OPEN {
            if request == MODE_REQUEST_PHYSICAL {
                self.enter_mode(Mode::Active);
            } else if settings.self_play() {
                ibus.request_cdc_command(CdcCommand::StartPlaying);
            }
        } else if panel == PANEL_TEL_CLOSE {
            if settings.self_play() {
                ibus.request_cdc_command(CdcCommand::StopPlaying);
            }
        } else {
            if panel == PANEL_NONE {
                if self.mode != Mode::DisplaySuspended && self.mode != Mode::Off {
                    ibus.set_panel_mode(DeviceId::Telephone, PANEL_MODE_CLAIM);
                }
            } else if self.mode != Mode::Off {
                self.mode = Mode::DisplaySuspended;
            }
            if panel == PANEL_RADIO_OPEN && self.handshake == Handshake::PressSent {
                ibus.forward_button_press(DeviceId::Radio, MODE_PRESS_BUTTON);
                self.handshake = Handshake::AwaitingRelease;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ibus::MenuButton;
    use crate::testutil::{BtCommand, FakeBt, FakeBus, FakeSettings};

    fn active_context() -> MidContext {
        let mut mid = MidContext::new();
        mid.mode = Mode::Active;
        mid
    }

    #[test]
    fn connect_banner_only_in_active_mode() {
        let mut mid = active_context();
        mid.bt_device_connected();
        assert_eq!(mid.main_display().text(), "Bluetooth connected :)");

        let mut off = MidContext::new();
        off.bt_device_connected();
        assert_eq!(off.main_display().text(), "");
    }

    #[test]
    fn disconnect_banner_drops_the_mode_prefix() {
        let mut mid = active_context();
        mid.set_prefix("Bluetooth");
        mid.bt_device_disconnected();
        assert_eq!(mid.main_display().text(), "Bluetooth disconnected");
    }

    #[test]
    fn metadata_writes_artist_row_and_title_hold() {
        let mut mid = active_context();
        let mut bt = FakeBt::new();
        bt.title = "Song Title".into();
        bt.artist = "Artist".into();
        let mut bus = FakeBus::new();
        let mut settings = FakeSettings::default();

        mid.bt_metadata_update(&mut bt, &mut bus, &mut settings);

        assert_eq!(bus.label_writes.len(), 8);
        assert_eq!(bus.label_writes[0], (MenuButton::OneL, "Arti".to_string()));
        assert_eq!(bus.label_writes[1], (MenuButton::OneR, "st  ".to_string()));
        assert_eq!(bus.label_writes[7], (MenuButton::FourR, "    ".to_string()));
        assert_eq!(mid.main_display().text(), "Song Title");
        assert_eq!(mid.main_display().timeout, METADATA_READ_TICKS);
    }

    #[test]
    fn metadata_skipped_without_title_or_when_disabled() {
        let mut mid = active_context();
        let mut bt = FakeBt::new();
        let mut bus = FakeBus::new();
        let mut settings = FakeSettings::default();

        mid.bt_metadata_update(&mut bt, &mut bus, &mut settings);
        assert!(bus.label_writes.is_empty());

        bt.title = "Song".into();
        settings.metadata = crate::settings::METADATA_MODE_OFF;
        mid.bt_metadata_update(&mut bt, &mut bus, &mut settings);
        assert!(bus.label_writes.is_empty());
    }

    #[test]
    fn playback_change_refreshes_label_and_requests_metadata() {
        let mut mid = active_context();
        let mut bt = FakeBt::new();
        let mut bus = FakeBus::new();

        mid.bt_playback_status(&mut bt, &mut bus);
        assert_eq!(bus.label_writes.len(), 2);
        assert_eq!(bt.commands, [BtCommand::RequestMetadata]);
    }

    #[test]
    fn cdc_stop_releases_the_panel_and_turns_off() {
        let mut mid = active_context();
        let mut bus = FakeBus::new();

        mid.cdc_status_request(CdcCommand::StopPlaying, &mut bus);
        assert_eq!(mid.mode(), Mode::Off);
        assert_eq!(mid.handshake(), Handshake::Idle);
        assert_eq!(
            bus.panel_modes,
            [(DeviceId::Telephone, PANEL_MODE_RELEASE)]
        );

        // Already off: no second release write.
        mid.cdc_status_request(CdcCommand::StopPlaying, &mut bus);
        assert_eq!(bus.panel_modes.len(), 1);
    }

    #[test]
    fn cdc_start_claims_only_from_off() {
        let mut mid = MidContext::new();
        let mut bus = FakeBus::new();

        mid.cdc_status_request(CdcCommand::StartPlaying, &mut bus);
        assert_eq!(bus.panel_modes, [(DeviceId::Telephone, PANEL_MODE_CLAIM)]);

        let mut active = active_context();
        let mut bus = FakeBus::new();
        active.cdc_status_request(CdcCommand::StartPlaying, &mut bus);
        assert!(bus.panel_modes.is_empty());
    }

    #[test]
    fn cdc_status_poll_reclaims_after_declined_release() {
        let mut mid = MidContext::new();
        mid.mode = Mode::DisplaySuspended;
        mid.handshake = Handshake::AwaitingRelease;
        let mut bus = FakeBus::new();

        mid.cdc_status_request(CdcCommand::GetStatus, &mut bus);
        assert_eq!(mid.handshake(), Handshake::Idle);
        assert_eq!(bus.panel_modes, [(DeviceId::Telephone, PANEL_MODE_CLAIM)]);
    }

    #[test]
    fn cdc_media_change_reclaims_while_suspended() {
        let mut mid = MidContext::new();
        mid.mode = Mode::DisplaySuspended;
        let mut bus = FakeBus::new();

        mid.cdc_status_request(CdcCommand::CdChange, &mut bus);
        assert_eq!(bus.panel_modes, [(DeviceId::Telephone, PANEL_MODE_CLAIM)]);
    }

    #[test]
    fn ignition_off_resets_only_while_on_screen() {
        let mut mid = active_context();
        mid.handshake = Handshake::PressSent;
        let mut bus = FakeBus::new();

        mid.ignition_status(Ignition::Off, &mut bus);
        assert_eq!(mid.mode(), Mode::Off);
        assert_eq!(mid.handshake(), Handshake::Idle);
        assert_eq!(
            bus.panel_modes,
            [(DeviceId::Telephone, PANEL_MODE_RELEASE)]
        );

        let mut suspended = MidContext::new();
        suspended.mode = Mode::DisplaySuspended;
        let mut bus = FakeBus::new();
        suspended.ignition_status(Ignition::Off, &mut bus);
        assert!(bus.panel_modes.is_empty());
        assert_eq!(suspended.mode(), Mode::DisplaySuspended);
    }

    #[test]
    fn foreign_display_writes_are_blanked() {
        let mut mid = active_context();
        let mut bus = FakeBus::new();

        mid.rad_display_update(0x00, &mut bus);
        assert_eq!(bus.radio_title_writes, [String::new()]);

        // Our own watermark passes through untouched.
        mid.rad_display_update(MAIN_AREA_WATERMARK, &mut bus);
        assert_eq!(bus.radio_title_writes.len(), 1);

        // Mid-handshake the radio owns the display; leave it alone.
        mid.begin_release_handshake();
        mid.rad_display_update(0x00, &mut bus);
        assert_eq!(bus.radio_title_writes.len(), 1);
    }

    #[test]
    fn physical_panel_open_requests_active_mode() {
        let mut mid = MidContext::new();
        let mut bus = FakeBus::new();
        let mut settings = FakeSettings::default();

        mid.mid_mode_change(PANEL_TEL_OPEN, MODE_REQUEST_PHYSICAL, &mut bus, &mut settings);
        assert_eq!(mid.requested_mode(), Some(Mode::Active));
        assert!(bus.cdc_requests.is_empty());
    }

    #[test]
    fn programmatic_panel_open_starts_playback_when_self_play_on() {
        let mut mid = MidContext::new();
        let mut bus = FakeBus::new();
        let mut settings = FakeSettings::default();
        settings.self_play = crate::settings::SELF_PLAY_ON;

        mid.mid_mode_change(
            PANEL_TEL_OPEN,
            crate::ibus::MODE_REQUEST_PROGRAM,
            &mut bus,
            &mut settings,
        );
        assert_eq!(mid.requested_mode(), None);
        assert_eq!(bus.cdc_requests, [CdcCommand::StartPlaying]);
    }

    #[test]
    fn panel_close_stops_playback_when_self_play_on() {
        let mut mid = MidContext::new();
        let mut bus = FakeBus::new();
        let mut settings = FakeSettings::default();
        settings.self_play = crate::settings::SELF_PLAY_ON;

        mid.mid_mode_change(PANEL_TEL_CLOSE, MODE_REQUEST_PHYSICAL, &mut bus, &mut settings);
        assert_eq!(bus.cdc_requests, [CdcCommand::StopPlaying]);

        settings.self_play = crate::settings::SELF_PLAY_OFF;
        mid.mid_mode_change(PANEL_TEL_CLOSE, MODE_REQUEST_PHYSICAL, &mut bus, &mut settings);
        assert_eq!(bus.cdc_requests.len(), 1);
    }

    #[test]
    fn foreign_panel_suspends_and_empty_panel_reclaims() {
        let mut mid = active_context();
        let mut bus = FakeBus::new();
        let mut settings = FakeSettings::default();

        mid.mid_mode_change(0x40, MODE_REQUEST_PHYSICAL, &mut bus, &mut settings);
        assert_eq!(mid.mode(), Mode::DisplaySuspended);

        mid.mode = Mode::Active;
        mid.mid_mode_change(PANEL_NONE, MODE_REQUEST_PHYSICAL, &mut bus, &mut settings);
        assert_eq!(bus.panel_modes, [(DeviceId::Telephone, PANEL_MODE_CLAIM)]);
        assert_eq!(mid.mode(), Mode::Active);
    }

    #[test]
    fn radio_panel_open_advances_the_release_handshake() {
        let mut mid = active_context();
        mid.begin_release_handshake();
        let mut bus = FakeBus::new();
        let mut settings = FakeSettings::default();

        mid.mid_mode_change(PANEL_RADIO_OPEN, MODE_REQUEST_PHYSICAL, &mut bus, &mut settings);
        assert_eq!(mid.mode(), Mode::DisplaySuspended);
        assert_eq!(mid.handshake(), Handshake::AwaitingRelease);
        assert_eq!(bus.forwarded, [(DeviceId::Radio, MODE_PRESS_BUTTON)]);
    }
}
