//! Bluetooth collaborator boundary.
//!
//! The BT module's command protocol and link management are out of scope;
//! the UI core only reads the module's cached state and issues the
//! high-level commands below. [`Bluetooth`] is the trait seam the
//! firmware's BT layer implements.

use heapless::String;

/// Bluetooth link-level address.
pub type MacAddr = [u8; 6];

/// Maximum stored length of a device name.
pub const DEVICE_NAME_SIZE: usize = 32;

/// One entry of the BT module's paired-device list.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PairedDevice {
    /// Device name (truncated to fit).
    pub name: String<DEVICE_NAME_SIZE>,
    /// Link address, used for identity comparison against the active device.
    pub mac: MacAddr,
}

impl PairedDevice {
    /// Create a record, truncating the name to capacity.
    pub fn new(name: &str, mac: MacAddr) -> Self {
        let mut n: String<DEVICE_NAME_SIZE> = String::new();
        for c in name.chars().take(DEVICE_NAME_SIZE - 1) {
            let _ = n.push(c);
        }
        Self { name: n, mac }
    }
}

/// AVRCP playback status of the active device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackStatus {
    Paused,
    Playing,
}

/// Read and command surface of the Bluetooth module.
pub trait Bluetooth {
    /// Current AVRCP playback status.
    fn playback_status(&self) -> PlaybackStatus;

    /// Whether the module is currently discoverable (pairing mode).
    fn discoverable(&self) -> bool;

    /// Link address of the actively connected device, if any.
    fn active_mac(&self) -> Option<MacAddr>;

    /// The module's paired-device list.
    fn paired_devices(&self) -> &[PairedDevice];

    /// Current track title (empty when unknown).
    fn title(&self) -> &str;

    /// Current artist (empty when unknown).
    fn artist(&self) -> &str;

    /// Start playback on the active device.
    fn play(&mut self);

    /// Pause playback on the active device.
    fn pause(&mut self);

    /// Skip to the next track.
    fn next_track(&mut self);

    /// Skip to the previous track.
    fn previous_track(&mut self);

    /// Enable or disable pairing-mode discoverability.
    fn set_discoverable(&mut self, on: bool);

    /// Ask the module to refresh title/artist metadata.
    fn request_metadata(&mut self);
}
