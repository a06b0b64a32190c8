//! Vehicle-bus collaborator boundary.
//!
//! The IBus transport (UART framing, checksums, retransmits) lives in the
//! embedding firmware; this module defines the decoded values the UI core
//! reads and the command surface it writes through. [`IbusPort`] is the
//! trait seam the firmware's bus layer implements.

use crate::config::MENU_LABEL_WIDTH;

/// Well-known bus module addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DeviceId {
    /// Radio head unit.
    Radio = 0x68,
    /// Instrument cluster.
    Cluster = 0x80,
    /// Multi-information display.
    Mid = 0xC0,
    /// Telephone module - the identity this controller assumes.
    Telephone = 0xC8,
}

/// Ignition state as broadcast by the cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ignition {
    Off,
    On,
}

/// CD-changer function state reported by the bus layer.
///
/// The radio treats us as a CD changer; while the changer function is
/// anything but `NotPlaying`, the steering-wheel track buttons are live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceFunction {
    NotPlaying,
    Playing,
}

/// CD-changer commands the radio can issue to our emulated changer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CdcCommand {
    GetStatus = 0x00,
    StopPlaying = 0x01,
    StartPlaying = 0x03,
    CdChange = 0x06,
}

impl CdcCommand {
    /// Decode a raw command byte; unknown codes are ignored upstream.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(CdcCommand::GetStatus),
            0x01 => Some(CdcCommand::StopPlaying),
            0x03 => Some(CdcCommand::StartPlaying),
            0x06 => Some(CdcCommand::CdChange),
            _ => None,
        }
    }
}

/// The MID's writable menu-button label slots.
///
/// Twelve 4-character cells over the physical button row, plus the
/// dedicated play/pause pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MenuButton {
    OneL = 0x01,
    OneR = 0x02,
    TwoL = 0x03,
    TwoR = 0x04,
    ThreeL = 0x05,
    ThreeR = 0x06,
    FourL = 0x07,
    FourR = 0x08,
    FiveL = 0x09,
    FiveR = 0x0A,
    SixL = 0x0B,
    SixR = 0x0C,
    PlayL = 0x0D,
    PlayR = 0x0E,
}

/// The first eight label slots in row order, used by the metadata
/// renderer to spread the artist name across the button row.
pub const ARTIST_LABEL_ROW: [MenuButton; 8] = [
    MenuButton::OneL,
    MenuButton::OneR,
    MenuButton::TwoL,
    MenuButton::TwoR,
    MenuButton::ThreeL,
    MenuButton::ThreeR,
    MenuButton::FourL,
    MenuButton::FourR,
];

// MID panel codes carried in a mode-change packet (destination panel).

/// No panel owns the display.
pub const PANEL_NONE: u8 = 0x00;
/// The radio's own display panel opened.
pub const PANEL_RADIO_OPEN: u8 = 0x02;
/// Our telephone panel opened.
pub const PANEL_TEL_OPEN: u8 = 0x8C;
/// Our telephone panel was explicitly closed.
pub const PANEL_TEL_CLOSE: u8 = 0x8F;

// Mode-change request types (how the panel change was initiated).

/// A physical button press on the MID.
pub const MODE_REQUEST_PHYSICAL: u8 = 0x00;
/// A programmatic request from the radio.
pub const MODE_REQUEST_PROGRAM: u8 = 0x20;

/// Watermark byte the radio appends to writes targeting the main text
/// area. Writes carrying any other watermark target auxiliary areas.
pub const MAIN_AREA_WATERMARK: u8 = 0x10;

/// Synthetic button code forwarded to the radio to emulate a physical
/// menu-mode press during the display-release handshake.
pub const MODE_PRESS_BUTTON: u8 = 0x20;

/// Panel mode argument: release the display slot.
pub const PANEL_MODE_RELEASE: u8 = 0x00;
/// Panel mode argument: claim the display slot.
pub const PANEL_MODE_CLAIM: u8 = 0x02;

/// A 4-character blank label, used to clear unused menu cells.
pub const BLANK_LABEL: &str = "    ";
const _: () = assert!(BLANK_LABEL.len() == MENU_LABEL_WIDTH);

/// Command surface of the bus layer, as consumed by the UI core.
///
/// Implementations encode and transmit the corresponding IBus packets;
/// reads return the bus layer's cached view of vehicle state.
pub trait IbusPort {
    /// Last broadcast ignition state.
    fn ignition(&self) -> Ignition;

    /// Current CD-changer function state.
    fn source_function(&self) -> SourceFunction;

    /// Write one 4-character menu-button label.
    fn write_menu_label(&mut self, button: MenuButton, label: &str);

    /// Write text to the MID main display area.
    fn write_display(&mut self, text: &str);

    /// Write the radio display-title area (used to blank interference).
    fn write_radio_title(&mut self, text: &str);

    /// Claim or release the display slot on behalf of `device`.
    fn set_panel_mode(&mut self, device: DeviceId, mode: u8);

    /// Forward a synthetic button press to `device`.
    fn forward_button_press(&mut self, device: DeviceId, button: u8);

    /// Ask the radio to issue a CD-changer command back to us.
    fn request_cdc_command(&mut self, command: CdcCommand);
}
