// MIT License - Copyright (c) 2018 Nick Whyte
// Rust translation of src/alarm.ts

use crate::event::{ArmingStatus, ArmingUpdate, Event, EventType, SystemStatusEvent, ZoneUpdate, Zones};

/// The panel's interpreted security posture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmingState {
    Unknown,
    Disarmed,
    Arming,
    ExitDelay,
    ArmedHome,
    ArmedAway,
    ArmedNight,
    EntryDelay,
    Triggered,
}

/// One of the 16 tracked sensor inputs. `triggered` stays `None` until the
/// first observation of the zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlarmZone {
    pub triggered: Option<bool>,
}

type StateHandler = Box<dyn FnMut(ArmingState) + Send>;
type ZoneHandler = Box<dyn FnMut(u8, bool) + Send>;

/// Stateful interpretation of the panel event stream: arming state, the
/// arming state expected after an exit delay or alarm restore, and the 16
/// zone states.
///
/// Handlers registered via [`on_state_change`](Alarm::on_state_change) and
/// [`on_zone_change`](Alarm::on_zone_change) are invoked synchronously
/// inside [`handle_event`](Alarm::handle_event), in registration order,
/// and only when the tracked value actually changes.
pub struct Alarm {
    infer_arming_state: bool,
    arming_state: ArmingState,
    expected_arming_state: ArmingState,
    zones: [AlarmZone; 16],
    state_handlers: Vec<StateHandler>,
    zone_handlers: Vec<ZoneHandler>,
}

impl Alarm {
    pub const ZONE_COUNT: u8 = 16;

    pub fn new(infer_arming_state: bool) -> Self {
        Self {
            infer_arming_state,
            arming_state: ArmingState::Unknown,
            expected_arming_state: ArmingState::Unknown,
            zones: [AlarmZone::default(); 16],
            state_handlers: Vec::new(),
            zone_handlers: Vec::new(),
        }
    }

    pub fn arming_state(&self) -> ArmingState {
        self.arming_state
    }

    /// The arming state expected after an exit delay or alarm restore.
    pub fn expected_arming_state(&self) -> ArmingState {
        self.expected_arming_state
    }

    pub fn zones(&self) -> &[AlarmZone] {
        &self.zones
    }

    pub fn on_state_change(&mut self, handler: impl FnMut(ArmingState) + Send + 'static) {
        self.state_handlers.push(Box::new(handler));
    }

    pub fn on_zone_change(&mut self, handler: impl FnMut(u8, bool) + Send + 'static) {
        self.zone_handlers.push(Box::new(handler));
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Arming(update) => self.handle_arming_update(update),
            Event::ZoneUpdate(update) => self.handle_zone_input_update(update),
            Event::SystemStatus(event) => self.handle_system_status_event(event),
            // The remaining variants carry no state for this machine; they
            // pass through to event subscribers untouched.
            _ => {}
        }
    }

    fn handle_arming_update(&mut self, update: &ArmingUpdate) {
        let status = update.status;
        if !status.is_empty() && status == ArmingStatus::AREA_1_ARMED {
            self.update_arming_state(ArmingState::ExitDelay);
        } else if status.contains(ArmingStatus::AREA_1_ARMED | ArmingStatus::AREA_1_FULLY_ARMED) {
            self.update_arming_state(ArmingState::ArmedAway);
        } else if status.contains(ArmingStatus::HOME_ARMED) {
            self.update_arming_state(ArmingState::ArmedHome);
        } else if self.infer_arming_state {
            // State inference is enabled, so the arming state can only be
            // reverted to disarmed via a system status event. This works
            // around a bug with some panels (<v5.8) which emit an empty
            // status while they are armed.
            if self.arming_state == ArmingState::Unknown {
                self.update_arming_state(ArmingState::Disarmed);
            }
        } else {
            // State inference is disabled, so assume the panel is disarmed
            // as it did not set any arming flags. This may not correctly
            // represent arming modes other than ARMED_AWAY.
            self.update_arming_state(ArmingState::Disarmed);
        }
    }

    fn handle_zone_input_update(&mut self, update: &ZoneUpdate) {
        for zone in 1..=Self::ZONE_COUNT {
            let triggered = Zones::for_zone(zone)
                .is_some_and(|flag| update.included_zones.contains(flag));
            self.update_zone(zone, triggered);
        }
    }

    fn handle_system_status_event(&mut self, event: &SystemStatusEvent) {
        // DISARMED -> ARMED_AWAY -> EXIT_DELAY_START -> EXIT_DELAY_END
        // (trip): -> ALARM -> OUTPUT_ON -> ALARM_RESTORE
        // (disarm): -> DISARMED -> OUTPUT_OFF
        // (disarm): -> DISARMED
        // (disarm before EXIT_DELAY_END): -> DISARMED -> EXIT_DELAY_END
        match event.event_type {
            EventType::Unsealed => self.update_zone(event.zone, true),
            EventType::Sealed => self.update_zone(event.zone, false),
            EventType::Alarm => self.update_arming_state(ArmingState::Triggered),
            EventType::AlarmRestore => {
                if self.arming_state != ArmingState::Disarmed {
                    self.update_arming_state(self.expected_arming_state);
                }
            }
            EventType::EntryDelayStart => self.update_arming_state(ArmingState::EntryDelay),
            EventType::EntryDelayEnd => {
                // Explicitly ignored: the panel follows up with an arm or
                // disarm event which is handled instead
            }
            EventType::ExitDelayStart => self.update_arming_state(ArmingState::ExitDelay),
            EventType::ExitDelayEnd => {
                // Exit delay finished. If we were in the process of arming,
                // settle into the expected arming state.
                if self.arming_state == ArmingState::ExitDelay {
                    self.update_arming_state(self.expected_arming_state);
                }
            }
            event_type if event_type.is_arm_event() => {
                self.update_arming_state(ArmingState::Arming);
                self.expected_arming_state = match event_type {
                    EventType::ArmedHome => ArmingState::ArmedHome,
                    EventType::ArmedNight => ArmingState::ArmedNight,
                    _ => ArmingState::ArmedAway,
                };
            }
            EventType::Disarmed => self.update_arming_state(ArmingState::Disarmed),
            EventType::ArmingDelayed => {}
            _ => {}
        }
    }

    fn update_arming_state(&mut self, state: ArmingState) {
        if self.arming_state != state {
            self.arming_state = state;
            for handler in &mut self.state_handlers {
                handler(state);
            }
        }
    }

    fn update_zone(&mut self, zone: u8, triggered: bool) {
        // Zone 0 appears in system-wide status events; out-of-range zone
        // numbers are not tracked
        let Some(slot) = zone
            .checked_sub(1)
            .and_then(|index| self.zones.get_mut(index as usize))
        else {
            return;
        };
        if slot.triggered != Some(triggered) {
            slot.triggered = Some(triggered);
            for handler in &mut self.zone_handlers {
                handler(zone, triggered);
            }
        }
    }
}
