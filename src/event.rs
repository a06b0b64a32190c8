//! Synchronous event registry.
//!
//! Events arriving off the vehicle bus and from the Bluetooth module are
//! fanned out to subscribers as plain function calls - nothing is queued
//! or deferred, matching the cooperative single-threaded model: every
//! callback runs to completion before the next event is dispatched.
//!
//! Subscriptions are an ordered list of `(EventKind, callback)` pairs.
//! The shared context value `C` is supplied at trigger time, so callbacks
//! need no captured state and the registry stays `'static`-free.

use crate::bt::PlaybackStatus;
use crate::error::Error;
use crate::ibus::{CdcCommand, Ignition};
use heapless::Vec;

/// A typed event, carrying its decoded payload.
///
/// The serial framing layer decodes raw packets into these; the UI core
/// never sees wire bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A Bluetooth device established an audio link.
    BtDeviceConnected,
    /// The active Bluetooth link dropped.
    BtDeviceDisconnected,
    /// Track title/artist changed on the active device.
    BtMetadataUpdate,
    /// AVRCP playback status changed.
    BtPlaybackStatus(PlaybackStatus),
    /// The radio issued a CD-changer command to our emulated changer.
    CdcStatusRequest(CdcCommand),
    /// Ignition state broadcast from the cluster.
    IgnitionStatus(Ignition),
    /// A physical MID button was pressed (raw button code).
    MidButtonPress(u8),
    /// The radio wrote to the MID display; the trailing watermark byte
    /// distinguishes main-area writes from others.
    RadDisplayUpdate { watermark: u8 },
    /// The MID announced a panel change: which panel now owns the
    /// display and whether the request was a physical button press.
    MidModeChange { panel: u8, request: u8 },
    /// UI request: drop the active Bluetooth connection (raised before
    /// entering pairing mode with a device still attached).
    CloseConnection,
    /// UI request: connect to the paired device at this index.
    InitiateConnection(u8),
}

/// Discriminant-only mirror of [`Event`], used as the subscription key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    BtDeviceConnected,
    BtDeviceDisconnected,
    BtMetadataUpdate,
    BtPlaybackStatus,
    CdcStatusRequest,
    IgnitionStatus,
    MidButtonPress,
    RadDisplayUpdate,
    MidModeChange,
    CloseConnection,
    InitiateConnection,
}

impl Event {
    /// The subscription key this event is dispatched under.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::BtDeviceConnected => EventKind::BtDeviceConnected,
            Event::BtDeviceDisconnected => EventKind::BtDeviceDisconnected,
            Event::BtMetadataUpdate => EventKind::BtMetadataUpdate,
            Event::BtPlaybackStatus(_) => EventKind::BtPlaybackStatus,
            Event::CdcStatusRequest(_) => EventKind::CdcStatusRequest,
            Event::IgnitionStatus(_) => EventKind::IgnitionStatus,
            Event::MidButtonPress(_) => EventKind::MidButtonPress,
            Event::RadDisplayUpdate { .. } => EventKind::RadDisplayUpdate,
            Event::MidModeChange { .. } => EventKind::MidModeChange,
            Event::CloseConnection => EventKind::CloseConnection,
            Event::InitiateConnection(_) => EventKind::InitiateConnection,
        }
    }
}

/// Subscriber callback: shared context plus the triggering event.
pub type Callback<C> = fn(&mut C, &Event);

struct Subscription<C> {
    kind: EventKind,
    callback: Callback<C>,
}

/// Fixed-capacity synchronous pub/sub registry.
pub struct EventRegistry<C, const N: usize> {
    subs: Vec<Subscription<C>, N>,
}

impl<C, const N: usize> EventRegistry<C, N> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self { subs: Vec::new() }
    }

    /// Subscribe `callback` to events of `kind`.
    ///
    /// Callbacks fire in registration order.
    pub fn register(&mut self, kind: EventKind, callback: Callback<C>) -> Result<(), Error> {
        self.subs
            .push(Subscription { kind, callback })
            .map_err(|_| Error::RegistryFull)
    }

    /// Remove a subscription by kind and callback identity.
    ///
    /// Unknown pairs are ignored.
    pub fn unregister(&mut self, kind: EventKind, callback: Callback<C>) {
        let addr = callback as usize;
        self.subs
            .retain(|s| !(s.kind == kind && s.callback as usize == addr));
    }

    /// Synchronously invoke every subscriber of `event`'s kind, in order.
    pub fn trigger(&self, ctx: &mut C, event: &Event) {
        let kind = event.kind();
        for sub in self.subs.iter().filter(|s| s.kind == kind) {
            (sub.callback)(ctx, event);
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// True when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}

impl<C, const N: usize> Default for EventRegistry<C, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        hits: u32,
        order: Vec<u8, 8>,
    }

    fn bump_a(c: &mut Counter, _: &Event) {
        c.hits += 1;
        c.order.push(b'a').unwrap();
    }

    fn bump_b(c: &mut Counter, _: &Event) {
        c.hits += 1;
        c.order.push(b'b').unwrap();
    }

    #[test]
    fn trigger_reaches_only_matching_kind() {
        let mut reg: EventRegistry<Counter, 4> = EventRegistry::new();
        reg.register(EventKind::BtDeviceConnected, bump_a).unwrap();

        let mut ctx = Counter {
            hits: 0,
            order: Vec::new(),
        };
        reg.trigger(&mut ctx, &Event::BtDeviceConnected);
        reg.trigger(&mut ctx, &Event::BtDeviceDisconnected);
        assert_eq!(ctx.hits, 1);
    }

    #[test]
    fn trigger_preserves_registration_order() {
        let mut reg: EventRegistry<Counter, 4> = EventRegistry::new();
        reg.register(EventKind::MidButtonPress, bump_a).unwrap();
        reg.register(EventKind::MidButtonPress, bump_b).unwrap();

        let mut ctx = Counter {
            hits: 0,
            order: Vec::new(),
        };
        reg.trigger(&mut ctx, &Event::MidButtonPress(0x01));
        assert_eq!(ctx.order.as_slice(), b"ab");
    }

    #[test]
    fn unregister_by_identity() {
        let mut reg: EventRegistry<Counter, 4> = EventRegistry::new();
        reg.register(EventKind::MidButtonPress, bump_a).unwrap();
        reg.register(EventKind::MidButtonPress, bump_b).unwrap();
        reg.unregister(EventKind::MidButtonPress, bump_a);

        let mut ctx = Counter {
            hits: 0,
            order: Vec::new(),
        };
        reg.trigger(&mut ctx, &Event::MidButtonPress(0x01));
        assert_eq!(ctx.order.as_slice(), b"b");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn register_over_capacity_fails() {
        let mut reg: EventRegistry<Counter, 1> = EventRegistry::new();
        reg.register(EventKind::MidButtonPress, bump_a).unwrap();
        assert_eq!(
            reg.register(EventKind::MidButtonPress, bump_b),
            Err(Error::RegistryFull)
        );
    }
}
