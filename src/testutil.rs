//! Recording fakes for the collaborator traits, shared by the unit tests.

use crate::bt::{Bluetooth, MacAddr, PairedDevice, PlaybackStatus};
use crate::ibus::{CdcCommand, DeviceId, IbusPort, Ignition, MenuButton, SourceFunction};
use crate::settings::{
    SettingKey, Settings, METADATA_MODE_SMOOTH, SELF_PLAY_OFF,
};

/// Bus collaborator that records every command it is given.
pub struct FakeBus {
    pub ignition: Ignition,
    pub source: SourceFunction,
    pub display_writes: Vec<String>,
    pub label_writes: Vec<(MenuButton, String)>,
    pub radio_title_writes: Vec<String>,
    pub panel_modes: Vec<(DeviceId, u8)>,
    pub forwarded: Vec<(DeviceId, u8)>,
    pub cdc_requests: Vec<CdcCommand>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self {
            ignition: Ignition::On,
            source: SourceFunction::NotPlaying,
            display_writes: Vec::new(),
            label_writes: Vec::new(),
            radio_title_writes: Vec::new(),
            panel_modes: Vec::new(),
            forwarded: Vec::new(),
            cdc_requests: Vec::new(),
        }
    }
}

impl IbusPort for FakeBus {
    fn ignition(&self) -> Ignition {
        self.ignition
    }

    fn source_function(&self) -> SourceFunction {
        self.source
    }

    fn write_menu_label(&mut self, button: MenuButton, label: &str) {
        self.label_writes.push((button, label.to_string()));
    }

    fn write_display(&mut self, text: &str) {
        self.display_writes.push(text.to_string());
    }

    fn write_radio_title(&mut self, text: &str) {
        self.radio_title_writes.push(text.to_string());
    }

    fn set_panel_mode(&mut self, device: DeviceId, mode: u8) {
        self.panel_modes.push((device, mode));
    }

    fn forward_button_press(&mut self, device: DeviceId, code: u8) {
        self.forwarded.push((device, code));
    }

    fn request_cdc_command(&mut self, command: CdcCommand) {
        self.cdc_requests.push(command);
    }
}

/// Commands issued to the Bluetooth fake, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BtCommand {
    Play,
    Pause,
    NextTrack,
    PreviousTrack,
    SetDiscoverable(bool),
    RequestMetadata,
}

/// Bluetooth collaborator with settable state and a command log.
pub struct FakeBt {
    pub status: PlaybackStatus,
    pub discoverable: bool,
    pub active: Option<MacAddr>,
    pub devices: Vec<PairedDevice>,
    pub title: String,
    pub artist: String,
    pub commands: Vec<BtCommand>,
}

impl FakeBt {
    pub fn new() -> Self {
        Self {
            status: PlaybackStatus::Paused,
            discoverable: false,
            active: None,
            devices: Vec::new(),
            title: String::new(),
            artist: String::new(),
            commands: Vec::new(),
        }
    }
}

impl Bluetooth for FakeBt {
    fn playback_status(&self) -> PlaybackStatus {
        self.status
    }

    fn discoverable(&self) -> bool {
        self.discoverable
    }

    fn active_mac(&self) -> Option<MacAddr> {
        self.active
    }

    fn paired_devices(&self) -> &[PairedDevice] {
        &self.devices
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn artist(&self) -> &str {
        &self.artist
    }

    fn play(&mut self) {
        self.commands.push(BtCommand::Play);
    }

    fn pause(&mut self) {
        self.commands.push(BtCommand::Pause);
    }

    fn next_track(&mut self) {
        self.commands.push(BtCommand::NextTrack);
    }

    fn previous_track(&mut self) {
        self.commands.push(BtCommand::PreviousTrack);
    }

    fn set_discoverable(&mut self, on: bool) {
        self.commands.push(BtCommand::SetDiscoverable(on));
    }

    fn request_metadata(&mut self) {
        self.commands.push(BtCommand::RequestMetadata);
    }
}

/// In-memory configuration store.
pub struct FakeSettings {
    pub metadata: u8,
    pub self_play: u8,
}

impl FakeSettings {
    pub fn chunked() -> Self {
        Self {
            metadata: crate::settings::METADATA_MODE_CHUNKED,
            ..Self::default()
        }
    }
}

impl Default for FakeSettings {
    fn default() -> Self {
        Self {
            metadata: METADATA_MODE_SMOOTH,
            self_play: SELF_PLAY_OFF,
        }
    }
}

impl Settings for FakeSettings {
    fn get(&self, key: SettingKey) -> u8 {
        match key {
            SettingKey::MetadataMode => self.metadata,
            SettingKey::SelfPlay => self.self_play,
        }
    }

    fn set(&mut self, key: SettingKey, value: u8) {
        match key {
            SettingKey::MetadataMode => self.metadata = value,
            SettingKey::SelfPlay => self.self_play = value,
        }
    }
}
