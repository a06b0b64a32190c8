//! MID UI controller - mode state machine, menus and event wiring.
//!
//! The controller mediates between the Bluetooth module, the vehicle bus
//! and the scheduler to decide what the MID text display shows, how its
//! button row is interpreted, and when we may claim or must release the
//! display slot from the radio.
//!
//! ## Components
//!
//! - **Display engine** ([`display`]): dual-buffer scrolling text renderer
//! - **Settings menu** ([`menu`]): single-line browse/edit submenu
//! - **Button dispatch** ([`buttons`]): mode-scoped button interpretation
//! - **Protocol handlers** ([`handlers`]): CDC emulation, ignition, panel
//!   negotiation and Bluetooth notifications
//!
//! Mode transitions are two-slot: handlers only *request* a mode, and the
//! slower scheduled task commits the request into menu-label writes. That
//! keeps label bursts off the bus during arbitrary event callbacks and
//! bounds them to one per commit interval.

pub mod display;
pub mod menu;

mod buttons;
mod handlers;

use crate::bt::{Bluetooth, PlaybackStatus};
use crate::config::{
    DEVICE_NAME_WIDTH, DISPLAY_TASK_TICKS, EVENT_REGISTRY_CAPACITY, MENU_COMMIT_TICKS,
    OUTBOX_CAPACITY, PREFIX_TEXT_SIZE, SCHEDULER_CAPACITY,
};
use crate::error::Error;
use crate::event::{Event, EventKind, EventRegistry};
use crate::ibus::{IbusPort, MenuButton, BLANK_LABEL};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::settings::Settings;
use display::DisplayField;
use heapless::{Deque, String};
use menu::SettingsMenu;

pub use buttons::*;

/// UI modes. `DisplaySuspended` means another panel currently owns the
/// display; we keep our state but stop rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    #[default]
    Off,
    DisplaySuspended,
    Active,
    Settings,
    Devices,
}

/// Display-release handshake with the radio.
///
/// When we take over the display slot we emulate a physical menu-button
/// press on the radio; `PressSent` means the press is pending forwarding,
/// `AwaitingRelease` means we forwarded it and are waiting for the radio
/// to poll us so we can reclaim the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handshake {
    #[default]
    Idle,
    PressSent,
    AwaitingRelease,
}

/// Scroll / selection direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Previous,
    Next,
}

/// All state owned by the controller. Created at init, reset at destroy;
/// nothing in here outlives the controller.
pub struct MidContext {
    mode: Mode,
    requested: Option<Mode>,
    handshake: Handshake,
    /// Selection into the paired-device list; `None` until the user
    /// navigates after entering the Devices menu.
    device_index: Option<u8>,
    /// Per-mode prefix prepended to main display text.
    prefix: String<PREFIX_TEXT_SIZE>,
    main: DisplayField,
    overlay: DisplayField,
    menu: SettingsMenu,
    /// Out-of-band render request, drained by the facade into a
    /// `trigger_now` on the display task.
    refresh: bool,
    /// UI-raised events, re-dispatched after the running callback returns.
    outbox: Deque<Event, OUTBOX_CAPACITY>,
}

impl MidContext {
    /// Fresh controller state: mode Off, empty displays, idle handshake.
    pub fn new() -> Self {
        Self {
            mode: Mode::Off,
            requested: None,
            handshake: Handshake::Idle,
            device_index: None,
            prefix: String::new(),
            main: DisplayField::new(),
            overlay: DisplayField::new(),
            menu: SettingsMenu::new(),
            refresh: false,
            outbox: Deque::new(),
        }
    }

    /// Current committed mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Mode requested but not yet committed by the slow task.
    pub fn requested_mode(&self) -> Option<Mode> {
        self.requested
    }

    /// Current display-release handshake state.
    pub fn handshake(&self) -> Handshake {
        self.handshake
    }

    /// Current paired-device selection.
    pub fn device_index(&self) -> Option<u8> {
        self.device_index
    }

    /// Request a mode transition. No bus traffic results until the next
    /// commit tick; always succeeds.
    pub fn enter_mode(&mut self, mode: Mode) {
        self.requested = Some(mode);
    }

    /// Arm the display-release handshake. Called by the embedding layer
    /// when it emulates the menu press that hands the slot to the radio.
    pub fn begin_release_handshake(&mut self) {
        self.handshake = Handshake::PressSent;
    }

    /// Commit a pending mode transition, if any. This is the slow-task
    /// body and the only path that writes menu-button labels.
    pub fn commit_pending<B, I, S>(&mut self, bt: &mut B, ibus: &mut I, settings: &mut S)
    where
        B: Bluetooth,
        I: IbusPort,
        S: Settings,
    {
        match self.requested.take() {
            Some(Mode::Active) => self.menu_main(bt, ibus, settings),
            Some(Mode::Settings) => self.menu_settings(ibus, settings),
            Some(Mode::Devices) => self.menu_devices(ibus, bt),
            _ => {}
        }
    }

    fn set_prefix(&mut self, prefix: &str) {
        self.prefix.clear();
        for c in prefix.chars().take(PREFIX_TEXT_SIZE) {
            let _ = self.prefix.push(c);
        }
    }

    /// Queue a UI-raised event for dispatch after the current callback.
    fn raise(&mut self, event: Event) {
        let _ = self.outbox.push_back(event);
    }

    /// Pop the next queued UI-raised event.
    pub fn take_outbound(&mut self) -> Option<Event> {
        self.outbox.pop_front()
    }

    /// Consume the out-of-band render request flag.
    pub fn take_refresh(&mut self) -> bool {
        core::mem::take(&mut self.refresh)
    }

    // Menu setup routines. Each commits the mode field, resets the main
    // display prefix and writes the full label set for that mode.

    fn menu_main<B, I, S>(&mut self, bt: &mut B, ibus: &mut I, settings: &mut S)
    where
        B: Bluetooth,
        I: IbusPort,
        S: Settings,
    {
        self.mode = Mode::Active;
        self.set_prefix("Bluetooth");
        self.set_main_text("", 0);
        // Re-render whatever track is current so the display is not
        // stale until the next metadata push.
        self.bt_metadata_update(bt, ibus, settings);

        for (button, label) in [
            (MenuButton::OneL, BLANK_LABEL),
            (MenuButton::OneR, BLANK_LABEL),
            (MenuButton::TwoL, BLANK_LABEL),
            (MenuButton::TwoR, BLANK_LABEL),
            (MenuButton::ThreeL, BLANK_LABEL),
            (MenuButton::ThreeR, BLANK_LABEL),
            (MenuButton::FourL, BLANK_LABEL),
            (MenuButton::FourR, BLANK_LABEL),
            (MenuButton::FiveL, "Sett"),
            (MenuButton::FiveR, "ings"),
            (MenuButton::SixL, BLANK_LABEL),
            (MenuButton::SixR, BLANK_LABEL),
        ] {
            ibus.write_menu_label(button, label);
        }
        write_play_label(ibus, bt.playback_status());
    }

    fn menu_settings<I, S>(&mut self, ibus: &mut I, settings: &mut S)
    where
        I: IbusPort,
        S: Settings,
    {
        self.mode = Mode::Settings;
        self.set_prefix("");
        let line = self.menu.open(settings);
        self.set_main_text(&line, 0);

        for (button, label) in [
            (MenuButton::OneL, "Edit"),
            (MenuButton::OneR, BLANK_LABEL),
            (MenuButton::TwoL, " <  "),
            (MenuButton::TwoR, "  > "),
            (MenuButton::ThreeL, BLANK_LABEL),
            (MenuButton::ThreeR, BLANK_LABEL),
            (MenuButton::FourL, "Devi"),
            (MenuButton::FourR, "ces "),
            (MenuButton::FiveL, "Pair"),
            (MenuButton::FiveR, "ing "),
            (MenuButton::SixL, " Ret"),
            (MenuButton::SixR, "urn "),
        ] {
            ibus.write_menu_label(button, label);
        }
    }

    fn menu_devices<I, B>(&mut self, ibus: &mut I, bt: &B)
    where
        I: IbusPort,
        B: Bluetooth,
    {
        self.mode = Mode::Devices;
        self.set_prefix("");
        self.device_index = None;
        self.show_device(Direction::Previous, bt);

        for (button, label) in [
            (MenuButton::OneL, "Conn"),
            (MenuButton::OneR, "ect "),
            (MenuButton::TwoL, " <  "),
            (MenuButton::TwoR, "  > "),
            (MenuButton::ThreeL, BLANK_LABEL),
            (MenuButton::ThreeR, BLANK_LABEL),
            (MenuButton::FourL, BLANK_LABEL),
            (MenuButton::FourR, BLANK_LABEL),
            (MenuButton::FiveL, BLANK_LABEL),
            (MenuButton::FiveR, BLANK_LABEL),
            (MenuButton::SixL, " Ret"),
            (MenuButton::SixR, "urn "),
        ] {
            ibus.write_menu_label(button, label);
        }
    }

    /// Step the paired-device selection and render the device name.
    ///
    /// Wraps at both ends. The active device's name carries a trailing
    /// `*` marker.
    fn show_device<B: Bluetooth>(&mut self, direction: Direction, bt: &B) {
        let devices = bt.paired_devices();
        if devices.is_empty() {
            self.set_main_text("No Devices Available", 0);
            return;
        }
        let count = devices.len() as u8;
        let index = match self.device_index {
            None => 0,
            Some(i) => {
                // The list is externally owned and can shrink between
                // presses; clamp a stale selection before stepping.
                let i = i.min(count - 1);
                match direction {
                    Direction::Next => {
                        if i + 1 < count {
                            i + 1
                        } else {
                            0
                        }
                    }
                    Direction::Previous => {
                        if i == 0 {
                            count - 1
                        } else {
                            i - 1
                        }
                    }
                }
            }
        };
        self.device_index = Some(index);

        let device = &devices[index as usize];
        // Name width plus room for the " *" active marker.
        let mut label: String<18> = String::new();
        for c in device.name.chars().take(DEVICE_NAME_WIDTH) {
            let _ = label.push(c);
        }
        if bt.active_mac() == Some(device.mac) {
            while label.len() > DEVICE_NAME_WIDTH - 2 {
                label.pop();
            }
            let _ = label.push_str(" *");
        }
        self.set_main_text(&label, 0);
    }
}

impl Default for MidContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the play/pause label pair reflecting `status`.
pub(crate) fn write_play_label(ibus: &mut impl IbusPort, status: PlaybackStatus) {
    let (left, right) = match status {
        PlaybackStatus::Playing => ("|| P", "ause"),
        PlaybackStatus::Paused => ("|> P", "lay "),
    };
    ibus.write_menu_label(MenuButton::PlayL, left);
    ibus.write_menu_label(MenuButton::PlayR, right);
}

/// The single shared context: controller state plus the collaborators it
/// reads and commands. Event callbacks and scheduled tasks receive this.
pub struct System<B, I, S> {
    pub mid: MidContext,
    pub bt: B,
    pub ibus: I,
    pub settings: S,
}

// Event-callback shims: destructure the system and hand the event payload
// to the matching handler.

fn on_bt_connected<B: Bluetooth, I: IbusPort, S: Settings>(
    sys: &mut System<B, I, S>,
    _event: &Event,
) {
    sys.mid.bt_device_connected();
}

fn on_bt_disconnected<B: Bluetooth, I: IbusPort, S: Settings>(
    sys: &mut System<B, I, S>,
    _event: &Event,
) {
    sys.mid.bt_device_disconnected();
}

fn on_bt_metadata<B: Bluetooth, I: IbusPort, S: Settings>(
    sys: &mut System<B, I, S>,
    _event: &Event,
) {
    let System {
        mid,
        bt,
        ibus,
        settings,
    } = sys;
    mid.bt_metadata_update(bt, ibus, settings);
}

fn on_bt_playback<B: Bluetooth, I: IbusPort, S: Settings>(
    sys: &mut System<B, I, S>,
    _event: &Event,
) {
    let System { mid, bt, ibus, .. } = sys;
    mid.bt_playback_status(bt, ibus);
}

fn on_cdc_request<B: Bluetooth, I: IbusPort, S: Settings>(
    sys: &mut System<B, I, S>,
    event: &Event,
) {
    if let Event::CdcStatusRequest(command) = event {
        sys.mid.cdc_status_request(*command, &mut sys.ibus);
    }
}

fn on_ignition<B: Bluetooth, I: IbusPort, S: Settings>(sys: &mut System<B, I, S>, event: &Event) {
    if let Event::IgnitionStatus(ignition) = event {
        sys.mid.ignition_status(*ignition, &mut sys.ibus);
    }
}

fn on_button_press<B: Bluetooth, I: IbusPort, S: Settings>(
    sys: &mut System<B, I, S>,
    event: &Event,
) {
    if let Event::MidButtonPress(code) = event {
        let System {
            mid,
            bt,
            ibus,
            settings,
        } = sys;
        mid.on_button_press(*code, bt, ibus, settings);
    }
}

fn on_rad_display<B: Bluetooth, I: IbusPort, S: Settings>(
    sys: &mut System<B, I, S>,
    event: &Event,
) {
    if let Event::RadDisplayUpdate { watermark } = event {
        sys.mid.rad_display_update(*watermark, &mut sys.ibus);
    }
}

fn on_mode_change<B: Bluetooth, I: IbusPort, S: Settings>(
    sys: &mut System<B, I, S>,
    event: &Event,
) {
    if let Event::MidModeChange { panel, request } = event {
        let System {
            mid,
            ibus,
            settings,
            ..
        } = sys;
        mid.mid_mode_change(*panel, *request, ibus, settings);
    }
}

// Scheduled-task bodies.

fn menu_commit_task<B: Bluetooth, I: IbusPort, S: Settings>(sys: &mut System<B, I, S>) {
    let System {
        mid,
        bt,
        ibus,
        settings,
    } = sys;
    mid.commit_pending(bt, ibus, settings);
}

fn display_render_task<B: Bluetooth, I: IbusPort, S: Settings>(sys: &mut System<B, I, S>) {
    let System {
        mid,
        ibus,
        settings,
        ..
    } = sys;
    mid.render_tick(ibus, settings);
}

/// Every inbound event kind the controller subscribes to, paired with
/// its callback. Kept as one table so init and destroy stay in sync.
fn subscriptions<B: Bluetooth, I: IbusPort, S: Settings>(
) -> [(EventKind, fn(&mut System<B, I, S>, &Event)); 9] {
    [
        (EventKind::BtDeviceConnected, on_bt_connected::<B, I, S>),
        (EventKind::BtDeviceDisconnected, on_bt_disconnected::<B, I, S>),
        (EventKind::BtMetadataUpdate, on_bt_metadata::<B, I, S>),
        (EventKind::BtPlaybackStatus, on_bt_playback::<B, I, S>),
        (EventKind::CdcStatusRequest, on_cdc_request::<B, I, S>),
        (EventKind::IgnitionStatus, on_ignition::<B, I, S>),
        (EventKind::MidButtonPress, on_button_press::<B, I, S>),
        (EventKind::RadDisplayUpdate, on_rad_display::<B, I, S>),
        (EventKind::MidModeChange, on_mode_change::<B, I, S>),
    ]
}

/// Owns the controller, its registry and its scheduler, and wires the
/// three together. The embedding firmware feeds it decoded [`Event`]s
/// via [`MidUi::dispatch`] and base ticks via [`MidUi::tick`].
pub struct MidUi<B, I, S> {
    system: System<B, I, S>,
    registry: EventRegistry<System<B, I, S>, EVENT_REGISTRY_CAPACITY>,
    scheduler: Scheduler<System<B, I, S>, SCHEDULER_CAPACITY>,
    menu_task: TaskHandle,
    display_task: TaskHandle,
}

impl<B: Bluetooth, I: IbusPort, S: Settings> MidUi<B, I, S> {
    /// Register all event callbacks and the two periodic tasks.
    pub fn new(bt: B, ibus: I, settings: S) -> Result<Self, Error> {
        let mut registry = EventRegistry::new();
        for (kind, callback) in subscriptions::<B, I, S>() {
            registry.register(kind, callback)?;
        }

        let mut scheduler = Scheduler::new();
        let menu_task = scheduler.register_periodic(menu_commit_task::<B, I, S>, MENU_COMMIT_TICKS)?;
        let display_task =
            scheduler.register_periodic(display_render_task::<B, I, S>, DISPLAY_TASK_TICKS)?;

        Ok(Self {
            system: System {
                mid: MidContext::new(),
                bt,
                ibus,
                settings,
            },
            registry,
            scheduler,
            menu_task,
            display_task,
        })
    }

    /// Dispatch one decoded event through the registry, then re-dispatch
    /// any events the UI raised and honor out-of-band render requests.
    pub fn dispatch(&mut self, event: Event) {
        self.registry.trigger(&mut self.system, &event);
        while let Some(raised) = self.system.mid.take_outbound() {
            self.registry.trigger(&mut self.system, &raised);
        }
        self.flush_refresh();
    }

    /// Advance one scheduler base tick (one display tick).
    pub fn tick(&mut self) {
        self.scheduler.tick(&mut self.system);
        self.flush_refresh();
    }

    fn flush_refresh(&mut self) {
        if self.system.mid.take_refresh() {
            self.scheduler.trigger_now(self.display_task, &mut self.system);
        }
    }

    /// Subscribe an external callback, e.g. for the UI-raised
    /// `CloseConnection` / `InitiateConnection` events.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        callback: fn(&mut System<B, I, S>, &Event),
    ) -> Result<(), Error> {
        self.registry.register(kind, callback)
    }

    /// Unregister every callback and task and reset the controller
    /// state. Safe to call more than once.
    pub fn destroy(&mut self) {
        for (kind, callback) in subscriptions::<B, I, S>() {
            self.registry.unregister(kind, callback);
        }
        self.scheduler.unregister(self.menu_task);
        self.scheduler.unregister(self.display_task);
        self.system.mid = MidContext::new();
    }

    /// Shared context, for inspection.
    pub fn system(&self) -> &System<B, I, S> {
        &self.system
    }

    /// Mutable shared context, for the embedding firmware's own updates.
    pub fn system_mut(&mut self) -> &mut System<B, I, S> {
        &mut self.system
    }
}
