//! MID display-controller core for a Bluetooth retrofit.
//!
//! This crate is the UI brain that sits between a Bluetooth audio module
//! and the vehicle's MID text display: it emulates a CD changer toward
//! the radio, negotiates ownership of the display slot, renders scrolling
//! track metadata, and maps the MID button row onto playback, settings
//! and device-selection menus.
//!
//! The core is transport-free. The embedding firmware implements the
//! [`ibus::IbusPort`], [`bt::Bluetooth`] and [`settings::Settings`]
//! traits, constructs a [`MidUi`], and feeds it decoded [`Event`]s plus
//! a fixed-rate base tick. Everything in between is deterministic and
//! heap-free, so the whole controller runs host-side under `cargo test`.

#![cfg_attr(not(test), no_std)]

pub mod bt;
pub mod config;
pub mod error;
pub mod event;
pub mod ibus;
pub mod mid;
pub mod scheduler;
pub mod settings;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::Error;
pub use event::{Event, EventKind, EventRegistry};
pub use mid::{Handshake, MidContext, MidUi, Mode, System};
pub use scheduler::{Scheduler, TaskHandle};
