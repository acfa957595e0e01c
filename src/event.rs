// MIT License - Copyright (c) 2018 Nick Whyte
// Rust translation of src/event.ts and src/event-types.ts

use bitflags::{bitflags, Flags};
use chrono::NaiveDateTime;

use crate::error::{NessError, Result};
use crate::packet::{CommandType, Packet};

/// Payload-level sub-type discriminator used within user-interface frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestId {
    ZoneInputUnsealed = 0x00,
    ZoneRadioUnsealed = 0x01,
    ZoneCbusUnsealed = 0x02,
    ZoneInDelay = 0x03,
    ZoneInDoubleTrigger = 0x04,
    ZoneInAlarm = 0x05,
    ZoneExcluded = 0x06,
    ZoneAutoExcluded = 0x07,
    ZoneSupervisionFailPending = 0x08,
    ZoneSupervisionFail = 0x09,
    ZoneDoorsOpen = 0x10,
    ZoneDetectorLowBattery = 0x11,
    ZoneDetectorTamper = 0x12,
    MiscellaneousAlarms = 0x13,
    Arming = 0x14,
    Outputs = 0x15,
    ViewState = 0x16,
    PanelVersion = 0x17,
    AuxiliaryOutputs = 0x18,
}

impl RequestId {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::ZoneInputUnsealed),
            0x01 => Some(Self::ZoneRadioUnsealed),
            0x02 => Some(Self::ZoneCbusUnsealed),
            0x03 => Some(Self::ZoneInDelay),
            0x04 => Some(Self::ZoneInDoubleTrigger),
            0x05 => Some(Self::ZoneInAlarm),
            0x06 => Some(Self::ZoneExcluded),
            0x07 => Some(Self::ZoneAutoExcluded),
            0x08 => Some(Self::ZoneSupervisionFailPending),
            0x09 => Some(Self::ZoneSupervisionFail),
            0x10 => Some(Self::ZoneDoorsOpen),
            0x11 => Some(Self::ZoneDetectorLowBattery),
            0x12 => Some(Self::ZoneDetectorTamper),
            0x13 => Some(Self::MiscellaneousAlarms),
            0x14 => Some(Self::Arming),
            0x15 => Some(Self::Outputs),
            0x16 => Some(Self::ViewState),
            0x17 => Some(Self::PanelVersion),
            0x18 => Some(Self::AuxiliaryOutputs),
            _ => None,
        }
    }

    /// Whether this request id reports a per-zone status bitmask.
    pub fn is_zone(self) -> bool {
        matches!(self as u8, 0x00..=0x09 | 0x10..=0x12)
    }
}

/// System status event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventType {
    /* Zone/User Events */
    Unsealed = 0x00,
    Sealed = 0x01,
    Alarm = 0x02,
    AlarmRestore = 0x03,
    ManualExclude = 0x04,
    ManualInclude = 0x05,
    AutoExclude = 0x06,
    AutoInclude = 0x07,
    TamperUnsealed = 0x08,
    TamperNormal = 0x09,

    /* System Events */
    PowerFailure = 0x10,
    PowerNormal = 0x11,
    BatteryFailure = 0x12,
    BatteryNormal = 0x13,
    ReportFailure = 0x14,
    ReportNormal = 0x15,
    SupervisionFailure = 0x16,
    SupervisionNormal = 0x17,
    RealTimeClock = 0x19,

    /* Area Events */
    EntryDelayStart = 0x20,
    EntryDelayEnd = 0x21,
    ExitDelayStart = 0x22,
    ExitDelayEnd = 0x23,
    ArmedAway = 0x24,
    ArmedHome = 0x25,
    ArmedDay = 0x26,
    ArmedNight = 0x27,
    ArmedVacation = 0x28,
    ArmedHighest = 0x2e,
    Disarmed = 0x2f,
    ArmingDelayed = 0x30,

    /* Result Events */
    OutputOn = 0x31,
    OutputOff = 0x32,
}

impl EventType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Unsealed),
            0x01 => Some(Self::Sealed),
            0x02 => Some(Self::Alarm),
            0x03 => Some(Self::AlarmRestore),
            0x04 => Some(Self::ManualExclude),
            0x05 => Some(Self::ManualInclude),
            0x06 => Some(Self::AutoExclude),
            0x07 => Some(Self::AutoInclude),
            0x08 => Some(Self::TamperUnsealed),
            0x09 => Some(Self::TamperNormal),
            0x10 => Some(Self::PowerFailure),
            0x11 => Some(Self::PowerNormal),
            0x12 => Some(Self::BatteryFailure),
            0x13 => Some(Self::BatteryNormal),
            0x14 => Some(Self::ReportFailure),
            0x15 => Some(Self::ReportNormal),
            0x16 => Some(Self::SupervisionFailure),
            0x17 => Some(Self::SupervisionNormal),
            0x19 => Some(Self::RealTimeClock),
            0x20 => Some(Self::EntryDelayStart),
            0x21 => Some(Self::EntryDelayEnd),
            0x22 => Some(Self::ExitDelayStart),
            0x23 => Some(Self::ExitDelayEnd),
            0x24 => Some(Self::ArmedAway),
            0x25 => Some(Self::ArmedHome),
            0x26 => Some(Self::ArmedDay),
            0x27 => Some(Self::ArmedNight),
            0x28 => Some(Self::ArmedVacation),
            0x2e => Some(Self::ArmedHighest),
            0x2f => Some(Self::Disarmed),
            0x30 => Some(Self::ArmingDelayed),
            0x31 => Some(Self::OutputOn),
            0x32 => Some(Self::OutputOff),
            _ => None,
        }
    }

    /// Event types that announce the start of an arming sequence.
    pub fn is_arm_event(self) -> bool {
        matches!(
            self,
            Self::ArmedAway
                | Self::ArmedHome
                | Self::ArmedDay
                | Self::ArmedNight
                | Self::ArmedVacation
                | Self::ArmedHighest
        )
    }
}

bitflags! {
    /// Zones included in a zone status bitmask.
    ///
    /// The wire field is big-endian: zones 1-8 live in the high byte and
    /// zones 9-16 in the low byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Zones: u16 {
        const ZONE_1 = 0x0100;
        const ZONE_2 = 0x0200;
        const ZONE_3 = 0x0400;
        const ZONE_4 = 0x0800;
        const ZONE_5 = 0x1000;
        const ZONE_6 = 0x2000;
        const ZONE_7 = 0x4000;
        const ZONE_8 = 0x8000;
        const ZONE_9 = 0x0001;
        const ZONE_10 = 0x0002;
        const ZONE_11 = 0x0004;
        const ZONE_12 = 0x0008;
        const ZONE_13 = 0x0010;
        const ZONE_14 = 0x0020;
        const ZONE_15 = 0x0040;
        const ZONE_16 = 0x0080;
    }
}

impl Zones {
    /// The flag for a 1-based zone number. Zone numbers outside 1-16 have
    /// no flag.
    pub fn for_zone(zone: u8) -> Option<Zones> {
        match zone {
            1..=8 => Zones::from_bits(0x0100 << (zone - 1)),
            9..=16 => Zones::from_bits(0x0001 << (zone - 9)),
            _ => None,
        }
    }
}

bitflags! {
    /// Miscellaneous alarm bits.
    ///
    /// **Note:** the Ness provided documentation has the byte endianness
    /// incorrectly documented. For this reason, these values have reversed
    /// byte ordering compared to the Ness provided documentation. This
    /// only applies to some enumerations, and thus must be applied on a
    /// case-by-case basis.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MiscellaneousAlarms: u16 {
        const DURESS = 0x0100;
        const PANIC = 0x0200;
        const MEDICAL = 0x0400;
        const FIRE = 0x0800;
        const INSTALL_END = 0x1000;
        const EXT_TAMPER = 0x2000;
        const PANEL_TAMPER = 0x4000;
        const KEYPAD_TAMPER = 0x8000;
        const PENDANT_PANIC = 0x0001;
        const PANEL_BATTERY_LOW = 0x0002;
        const PANEL_BATTERY_LOW2 = 0x0004;
        const MAINS_FAIL = 0x0008;
        const CBUS_FAIL = 0x0010;
    }
}

bitflags! {
    /// Arming status bits.
    ///
    /// Byte ordering reversed relative to the Ness documentation, as for
    /// [`MiscellaneousAlarms`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ArmingStatus: u16 {
        const AREA_1_ARMED = 0x0100;
        const AREA_2_ARMED = 0x0200;
        const AREA_1_FULLY_ARMED = 0x0400;
        const AREA_2_FULLY_ARMED = 0x0800;
        const HOME_ARMED = 0x1000;
        const DAY_MODE_ARMED = 0x2000;
        const ENTRY_DELAY_1_ON = 0x4000;
        const ENTRY_DELAY_2_ON = 0x8000;
        const MANUAL_EXCLUDE_MODE = 0x0001;
        const MEMORY_MODE = 0x0002;
        const DAY_ZONE_SELECT = 0x0004;
    }
}

bitflags! {
    /// Output states.
    ///
    /// Byte ordering reversed relative to the Ness documentation, as for
    /// [`MiscellaneousAlarms`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Outputs: u16 {
        const SIREN_LOUD = 0x0100;
        const SIREN_SOFT = 0x0200;
        const SIREN_SOFT_MONITOR = 0x0400;
        const SIREN_SOFT_FIRE = 0x0800;
        const STROBE = 0x1000;
        const RESET = 0x2000;
        const SONALART = 0x4000;
        const KEYPAD_DISPLAY_ENABLE = 0x8000;
        const AUX1 = 0x0001;
        const AUX2 = 0x0002;
        const AUX3 = 0x0004;
        const AUX4 = 0x0008;
        const MONITOR_OUT = 0x0010;
        const POWER_FAIL = 0x0020;
        const PANEL_BATT_FAIL = 0x0040;
        const TAMPER_XPAND = 0x0080;
    }
}

bitflags! {
    /// Auxiliary output states.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AuxiliaryOutputs: u16 {
        const AUX_1 = 0x0001;
        const AUX_2 = 0x0002;
        const AUX_3 = 0x0004;
        const AUX_4 = 0x0008;
        const AUX_5 = 0x0010;
        const AUX_6 = 0x0020;
        const AUX_7 = 0x0040;
        const AUX_8 = 0x0080;
    }
}

/// Keypad view state reported by a VIEW_STATE status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum State {
    Normal = 0xf000,
    BriefDayChime = 0xe000,
    Home = 0xd000,
    Memory = 0xc000,
    BriefDayZoneSelect = 0xb000,
    ExcludeSelect = 0xa000,
    UserProgram = 0x9000,
    InstallerProgram = 0x8000,
}

impl State {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0xf000 => Some(Self::Normal),
            0xe000 => Some(Self::BriefDayChime),
            0xd000 => Some(Self::Home),
            0xc000 => Some(Self::Memory),
            0xb000 => Some(Self::BriefDayZoneSelect),
            0xa000 => Some(Self::ExcludeSelect),
            0x9000 => Some(Self::UserProgram),
            0x8000 => Some(Self::InstallerProgram),
            _ => None,
        }
    }
}

/// Panel model reported by a PANEL_VERSION status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Model {
    D16x = 0x00,
    D16x3g = 0x04,
}

impl Model {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::D16x),
            0x04 => Some(Self::D16x3g),
            _ => None,
        }
    }
}

/// A decoded panel event.
///
/// One case per event kind; dispatch is exhaustive pattern matching.
/// Every case carries the source address and timestamp inherited from the
/// originating packet.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SystemStatus(SystemStatusEvent),
    ZoneUpdate(ZoneUpdate),
    MiscellaneousAlarms(MiscellaneousAlarmsUpdate),
    Arming(ArmingUpdate),
    Outputs(OutputsUpdate),
    ViewState(ViewStateUpdate),
    PanelVersion(PanelVersionUpdate),
    AuxiliaryOutputs(AuxiliaryOutputsUpdate),
}

impl Event {
    /// Interpret a packet's payload according to its command byte (and,
    /// for user-interface frames, the request id).
    pub fn decode(packet: &Packet) -> Result<Event> {
        match packet.command {
            CommandType::SystemStatus => {
                SystemStatusEvent::decode(packet).map(Event::SystemStatus)
            }
            CommandType::UserInterface => decode_status_update(packet),
            CommandType::Other(byte) => Err(NessError::UnknownCommand(byte)),
        }
    }

    /// Source address inherited from the originating packet.
    pub fn address(&self) -> Option<u8> {
        match self {
            Event::SystemStatus(e) => e.address,
            Event::ZoneUpdate(e) => e.address,
            Event::MiscellaneousAlarms(e) => e.address,
            Event::Arming(e) => e.address,
            Event::Outputs(e) => e.address,
            Event::ViewState(e) => e.address,
            Event::PanelVersion(e) => e.address,
            Event::AuxiliaryOutputs(e) => e.address,
        }
    }

    /// Timestamp inherited from the originating packet.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Event::SystemStatus(e) => e.timestamp,
            Event::ZoneUpdate(e) => e.timestamp,
            Event::MiscellaneousAlarms(e) => e.timestamp,
            Event::Arming(e) => e.timestamp,
            Event::Outputs(e) => e.timestamp,
            Event::ViewState(e) => e.timestamp,
            Event::PanelVersion(e) => e.timestamp,
            Event::AuxiliaryOutputs(e) => e.timestamp,
        }
    }
}

fn decode_status_update(packet: &Packet) -> Result<Event> {
    let request_byte = hex_field(packet, 0, 2)? as u8;
    let request_id =
        RequestId::from_byte(request_byte).ok_or(NessError::UnknownRequest(request_byte))?;

    if request_id.is_zone() {
        return ZoneUpdate::decode(packet, request_id).map(Event::ZoneUpdate);
    }

    match request_id {
        RequestId::MiscellaneousAlarms => {
            MiscellaneousAlarmsUpdate::decode(packet).map(Event::MiscellaneousAlarms)
        }
        RequestId::Arming => ArmingUpdate::decode(packet).map(Event::Arming),
        RequestId::Outputs => OutputsUpdate::decode(packet).map(Event::Outputs),
        RequestId::ViewState => ViewStateUpdate::decode(packet).map(Event::ViewState),
        RequestId::PanelVersion => PanelVersionUpdate::decode(packet).map(Event::PanelVersion),
        RequestId::AuxiliaryOutputs => {
            AuxiliaryOutputsUpdate::decode(packet).map(Event::AuxiliaryOutputs)
        }
        // Zone ids were routed above
        _ => Err(NessError::UnknownRequest(request_byte)),
    }
}

/// Slice a hex field out of the packet payload.
fn hex_field(packet: &Packet, start: usize, end: usize) -> Result<u16> {
    let raw = packet
        .data
        .get(start..end)
        .ok_or_else(|| NessError::MalformedPacket("status update payload too short".into()))?;
    u16::from_str_radix(raw, 16)
        .map_err(|_| NessError::MalformedPacket(format!("non-hex payload field '{raw}'")))
}

/// Decompose the big-endian 16-bit field following the request id into the
/// declared flags of `F`. Undefined bits are dropped; flag order follows
/// the declaration order of `F`.
fn unpack_flags<F: Flags<Bits = u16>>(packet: &Packet) -> Result<F> {
    Ok(F::from_bits_truncate(hex_field(packet, 2, 6)?))
}

/// Inverse of [`unpack_flags`]: OR the members together and render the
/// field as four upper-case hex digits.
fn pack_flags<F: Flags<Bits = u16>>(flags: F) -> String {
    format!("{:04X}", flags.bits())
}

/// An unsolicited zone/system/area event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemStatusEvent {
    pub event_type: EventType,
    /// 1-based zone number, or 0 for system-wide events
    pub zone: u8,
    pub area: u8,
    pub address: Option<u8>,
    pub timestamp: Option<NaiveDateTime>,
}

impl SystemStatusEvent {
    fn decode(packet: &Packet) -> Result<Self> {
        let type_byte = hex_field(packet, 0, 2)? as u8;
        let event_type =
            EventType::from_byte(type_byte).ok_or(NessError::UnknownEventType(type_byte))?;

        // The zone field is two decimal digits, unlike its hex neighbours
        let zone_raw = packet
            .data
            .get(2..4)
            .ok_or_else(|| NessError::MalformedPacket("status update payload too short".into()))?;
        let zone = zone_raw
            .parse::<u8>()
            .map_err(|_| NessError::MalformedPacket(format!("non-decimal zone '{zone_raw}'")))?;

        let area = hex_field(packet, 4, 6)? as u8;

        Ok(Self {
            event_type,
            zone,
            area,
            address: packet.address,
            timestamp: packet.timestamp,
        })
    }
}

/// A zone status bitmask response (request ids `ZONE_*`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneUpdate {
    pub request_id: RequestId,
    pub included_zones: Zones,
    pub address: Option<u8>,
    pub timestamp: Option<NaiveDateTime>,
}

impl ZoneUpdate {
    fn decode(packet: &Packet, request_id: RequestId) -> Result<Self> {
        Ok(Self {
            request_id,
            included_zones: unpack_flags(packet)?,
            address: packet.address,
            timestamp: packet.timestamp,
        })
    }

    /// Encode as a user-interface response packet, as the panel would emit
    /// it.
    pub fn encode(&self) -> Packet {
        let data = format!("{:02X}{}", self.request_id as u8, pack_flags(self.included_zones));
        Packet {
            address: self.address,
            seq: 0x00,
            command: CommandType::UserInterface,
            data,
            timestamp: None,
            is_user_interface_response: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiscellaneousAlarmsUpdate {
    pub included_alarms: MiscellaneousAlarms,
    pub address: Option<u8>,
    pub timestamp: Option<NaiveDateTime>,
}

impl MiscellaneousAlarmsUpdate {
    fn decode(packet: &Packet) -> Result<Self> {
        Ok(Self {
            included_alarms: unpack_flags(packet)?,
            address: packet.address,
            timestamp: packet.timestamp,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmingUpdate {
    pub status: ArmingStatus,
    pub address: Option<u8>,
    pub timestamp: Option<NaiveDateTime>,
}

impl ArmingUpdate {
    fn decode(packet: &Packet) -> Result<Self> {
        Ok(Self {
            status: unpack_flags(packet)?,
            address: packet.address,
            timestamp: packet.timestamp,
        })
    }

    /// Encode as a user-interface response packet, as the panel would emit
    /// it.
    pub fn encode(&self) -> Packet {
        let data = format!("{:02X}{}", RequestId::Arming as u8, pack_flags(self.status));
        Packet {
            address: self.address,
            seq: 0x00,
            command: CommandType::UserInterface,
            data,
            timestamp: None,
            is_user_interface_response: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputsUpdate {
    pub outputs: Outputs,
    pub address: Option<u8>,
    pub timestamp: Option<NaiveDateTime>,
}

impl OutputsUpdate {
    fn decode(packet: &Packet) -> Result<Self> {
        Ok(Self {
            outputs: unpack_flags(packet)?,
            address: packet.address,
            timestamp: packet.timestamp,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewStateUpdate {
    pub state: State,
    pub address: Option<u8>,
    pub timestamp: Option<NaiveDateTime>,
}

impl ViewStateUpdate {
    fn decode(packet: &Packet) -> Result<Self> {
        // Raw 16-bit state value, not flag-decomposed
        let raw = hex_field(packet, 2, 6)?;
        let state = State::from_u16(raw)
            .ok_or_else(|| NessError::MalformedPacket(format!("unknown view state 0x{raw:04x}")))?;
        Ok(Self {
            state,
            address: packet.address,
            timestamp: packet.timestamp,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelVersionUpdate {
    pub model: Model,
    pub major_version: u8,
    pub minor_version: u8,
    pub address: Option<u8>,
    pub timestamp: Option<NaiveDateTime>,
}

impl PanelVersionUpdate {
    fn decode(packet: &Packet) -> Result<Self> {
        let model_byte = hex_field(packet, 2, 4)? as u8;
        let model = Model::from_byte(model_byte).ok_or_else(|| {
            NessError::MalformedPacket(format!("unknown panel model 0x{model_byte:02x}"))
        })?;
        let major_version = hex_field(packet, 4, 5)? as u8;
        let minor_version = hex_field(packet, 5, 6)? as u8;
        Ok(Self {
            model,
            major_version,
            minor_version,
            address: packet.address,
            timestamp: packet.timestamp,
        })
    }

    /// The software version as `major.minor`.
    pub fn version(&self) -> String {
        format!("{}.{}", self.major_version, self.minor_version)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxiliaryOutputsUpdate {
    pub outputs: AuxiliaryOutputs,
    pub address: Option<u8>,
    pub timestamp: Option<NaiveDateTime>,
}

impl AuxiliaryOutputsUpdate {
    fn decode(packet: &Packet) -> Result<Self> {
        Ok(Self {
            outputs: unpack_flags(packet)?,
            address: packet.address,
            timestamp: packet.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_packet(command: CommandType, data: &str) -> Packet {
        Packet {
            address: Some(0x00),
            seq: 0x00,
            command,
            data: data.to_string(),
            timestamp: None,
            is_user_interface_response: true,
        }
    }

    #[test]
    fn test_decode_system_status_event() {
        let packet = make_packet(CommandType::SystemStatus, "000000");
        let event = Event::decode(&packet).unwrap();
        assert!(matches!(event, Event::SystemStatus(_)));
    }

    #[test]
    fn test_decode_system_status_event_fields() {
        let packet = make_packet(CommandType::SystemStatus, "011600");
        let event = Event::decode(&packet).unwrap();
        let Event::SystemStatus(event) = event else {
            panic!("expected a system status event");
        };
        assert_eq!(event.event_type, EventType::Sealed);
        // Decimal, not hex: "16" means zone 16
        assert_eq!(event.zone, 16);
        assert_eq!(event.area, 0);
        assert_eq!(event.address, Some(0x00));
    }

    #[test]
    fn test_decode_unknown_command() {
        let packet = make_packet(CommandType::Other(0x01), "000000");
        let result = Event::decode(&packet);
        assert!(matches!(result, Err(NessError::UnknownCommand(0x01))));
    }

    #[test]
    fn test_decode_unknown_event_type() {
        let packet = make_packet(CommandType::SystemStatus, "ff0000");
        let result = Event::decode(&packet);
        assert!(matches!(result, Err(NessError::UnknownEventType(0xff))));
    }

    #[test]
    fn test_decode_zone_update() {
        let packet = make_packet(CommandType::UserInterface, "000000");
        let event = Event::decode(&packet).unwrap();
        assert!(matches!(event, Event::ZoneUpdate(_)));
    }

    #[test]
    fn test_decode_zone_update_includes_the_correct_zones() {
        let packet = make_packet(CommandType::UserInterface, "000500");
        let Event::ZoneUpdate(update) = Event::decode(&packet).unwrap() else {
            panic!("expected a zone update");
        };
        assert_eq!(update.request_id, RequestId::ZoneInputUnsealed);
        assert!(update.included_zones.contains(Zones::ZONE_1));
        assert!(update.included_zones.contains(Zones::ZONE_3));
        assert_eq!(update.included_zones, Zones::ZONE_1 | Zones::ZONE_3);
    }

    #[test]
    fn test_decode_misc_alarms_update() {
        let packet = make_packet(CommandType::UserInterface, "130000");
        let event = Event::decode(&packet).unwrap();
        assert!(matches!(event, Event::MiscellaneousAlarms(_)));
    }

    #[test]
    fn test_decode_arming_update() {
        let packet = make_packet(CommandType::UserInterface, "140000");
        let event = Event::decode(&packet).unwrap();
        assert!(matches!(event, Event::Arming(_)));
    }

    #[test]
    fn test_decode_outputs_update() {
        let packet = make_packet(CommandType::UserInterface, "150000");
        let event = Event::decode(&packet).unwrap();
        assert!(matches!(event, Event::Outputs(_)));
    }

    #[test]
    fn test_decode_view_state_update() {
        let packet = make_packet(CommandType::UserInterface, "16f000");
        let Event::ViewState(update) = Event::decode(&packet).unwrap() else {
            panic!("expected a view state update");
        };
        assert_eq!(update.state, State::Normal);
    }

    #[test]
    fn test_decode_view_state_update_rejects_unknown_state() {
        let packet = make_packet(CommandType::UserInterface, "161234");
        let result = Event::decode(&packet);
        assert!(matches!(result, Err(NessError::MalformedPacket(_))));
    }

    #[test]
    fn test_decode_panel_version_update() {
        let packet = make_packet(CommandType::UserInterface, "170000");
        let Event::PanelVersion(update) = Event::decode(&packet).unwrap() else {
            panic!("expected a panel version update");
        };
        assert_eq!(update.model, Model::D16x);
    }

    #[test]
    fn test_decode_panel_version_3g_model() {
        let packet = make_packet(CommandType::UserInterface, "170400");
        let Event::PanelVersion(update) = Event::decode(&packet).unwrap() else {
            panic!("expected a panel version update");
        };
        assert_eq!(update.model, Model::D16x3g);
    }

    #[test]
    fn test_decode_panel_version_sw_version() {
        let packet = make_packet(CommandType::UserInterface, "170086");
        let Event::PanelVersion(update) = Event::decode(&packet).unwrap() else {
            panic!("expected a panel version update");
        };
        assert_eq!(update.major_version, 8);
        assert_eq!(update.minor_version, 6);
        assert_eq!(update.version(), "8.6");
    }

    #[test]
    fn test_decode_auxiliary_outputs_update() {
        let packet = make_packet(CommandType::UserInterface, "180000");
        let event = Event::decode(&packet).unwrap();
        assert!(matches!(event, Event::AuxiliaryOutputs(_)));
    }

    #[test]
    fn test_decode_unknown_request() {
        let packet = make_packet(CommandType::UserInterface, "550000");
        let result = Event::decode(&packet);
        assert!(matches!(result, Err(NessError::UnknownRequest(0x55))));
    }

    #[test]
    fn test_decode_short_payload() {
        let packet = make_packet(CommandType::UserInterface, "1400");
        let result = Event::decode(&packet);
        assert!(matches!(result, Err(NessError::MalformedPacket(_))));
    }

    #[test]
    fn test_arming_update_decompose_order() {
        // 0x0500 decomposes to exactly AREA_1_ARMED, AREA_1_FULLY_ARMED,
        // in declaration order
        let packet = make_packet(CommandType::UserInterface, "140500");
        let Event::Arming(update) = Event::decode(&packet).unwrap() else {
            panic!("expected an arming update");
        };
        let flags: Vec<ArmingStatus> = update.status.iter().collect();
        assert_eq!(
            flags,
            vec![ArmingStatus::AREA_1_ARMED, ArmingStatus::AREA_1_FULLY_ARMED]
        );
    }

    #[test]
    fn test_arming_update_undefined_bits_are_dropped() {
        // 0x0008 is not a defined arming flag
        let packet = make_packet(CommandType::UserInterface, "140008");
        let Event::Arming(update) = Event::decode(&packet).unwrap() else {
            panic!("expected an arming update");
        };
        assert!(update.status.is_empty());
    }

    #[test]
    fn test_arming_update_encode() {
        let update = ArmingUpdate {
            status: ArmingStatus::AREA_1_FULLY_ARMED,
            address: Some(0x00),
            timestamp: None,
        };
        let packet = update.encode();
        assert_eq!(packet.command, CommandType::UserInterface);
        assert_eq!(packet.data, "140400");
        assert!(packet.is_user_interface_response);
    }

    #[test]
    fn test_zone_update_encode() {
        let update = ZoneUpdate {
            request_id: RequestId::ZoneInputUnsealed,
            included_zones: Zones::ZONE_1 | Zones::ZONE_3,
            address: Some(0x00),
            timestamp: None,
        };
        let packet = update.encode();
        assert_eq!(packet.command, CommandType::UserInterface);
        assert_eq!(packet.data, "000500");
        assert!(packet.is_user_interface_response);
    }

    #[test]
    fn test_zone_flag_lookup() {
        assert_eq!(Zones::for_zone(1), Some(Zones::ZONE_1));
        assert_eq!(Zones::for_zone(8), Some(Zones::ZONE_8));
        assert_eq!(Zones::for_zone(9), Some(Zones::ZONE_9));
        assert_eq!(Zones::for_zone(16), Some(Zones::ZONE_16));
        assert_eq!(Zones::for_zone(0), None);
        assert_eq!(Zones::for_zone(17), None);
    }

    #[test]
    fn test_event_inherits_address_and_timestamp() {
        let packet = Packet::decode("8709036101050018122709413536", true).unwrap();
        let event = Event::decode(&packet).unwrap();
        assert_eq!(event.address(), Some(0x09));
        assert_eq!(event.timestamp(), packet.timestamp);
    }
}
