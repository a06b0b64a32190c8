//! Configuration collaborator boundary.
//!
//! Persistent settings live in the firmware's config storage; the UI core
//! reads them through [`Settings`] and writes them back when the user
//! saves an edit in the settings menu.

/// Recognized setting keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingKey {
    /// Metadata display pacing: off / smooth / chunked.
    MetadataMode,
    /// Start playback automatically when our panel is opened.
    SelfPlay,
}

impl SettingKey {
    /// Short label shown in the settings menu.
    pub fn label(&self) -> &'static str {
        match self {
            SettingKey::MetadataMode => "Metadata",
            SettingKey::SelfPlay => "Self-play",
        }
    }

    /// Number of values this setting cycles through.
    pub fn value_count(&self) -> u8 {
        match self {
            SettingKey::MetadataMode => 3,
            SettingKey::SelfPlay => 2,
        }
    }

    /// Display label for one raw value.
    pub fn value_label(&self, value: u8) -> &'static str {
        match self {
            SettingKey::MetadataMode => match value {
                0 => "Off",
                2 => "Chunked",
                _ => "Smooth",
            },
            SettingKey::SelfPlay => match value {
                0 => "Off",
                _ => "On",
            },
        }
    }
}

/// Metadata display pacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MetadataMode {
    /// Never render metadata.
    Off,
    /// Scroll one character per tick.
    Smooth,
    /// Reveal a full window per step, with a pause between reveals.
    Chunked,
}

/// Raw setting values for [`SettingKey::MetadataMode`].
pub const METADATA_MODE_OFF: u8 = 0;
pub const METADATA_MODE_SMOOTH: u8 = 1;
pub const METADATA_MODE_CHUNKED: u8 = 2;

/// Raw setting values for [`SettingKey::SelfPlay`].
pub const SELF_PLAY_OFF: u8 = 0;
pub const SELF_PLAY_ON: u8 = 1;

/// Read/write surface of the configuration store.
pub trait Settings {
    /// Raw value of a setting.
    fn get(&self, key: SettingKey) -> u8;

    /// Persist a raw setting value.
    fn set(&mut self, key: SettingKey, value: u8);

    /// Decoded metadata pacing mode.
    fn metadata_mode(&self) -> MetadataMode {
        match self.get(SettingKey::MetadataMode) {
            METADATA_MODE_OFF => MetadataMode::Off,
            METADATA_MODE_CHUNKED => MetadataMode::Chunked,
            _ => MetadataMode::Smooth,
        }
    }

    /// Whether self-play is enabled.
    fn self_play(&self) -> bool {
        self.get(SettingKey::SelfPlay) != SELF_PLAY_OFF
    }
}
