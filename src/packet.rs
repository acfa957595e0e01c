// MIT License - Copyright (c) 2018 Nick Whyte
// Rust translation of src/packet.ts

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{NessError, Result};

/// Command byte carried in every frame.
///
/// The frame codec has no knowledge of payload semantics, so unrecognized
/// command bytes are carried through untouched; the event decoder is where
/// they are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    /// 0x60 - keypad strings and status update responses
    UserInterface,
    /// 0x61 - unsolicited system status events
    SystemStatus,
    /// Any other command byte
    Other(u8),
}

impl CommandType {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x60 => Self::UserInterface,
            0x61 => Self::SystemStatus,
            other => Self::Other(other),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::UserInterface => 0x60,
            Self::SystemStatus => 0x61,
            Self::Other(byte) => byte,
        }
    }
}

/// Whether the START byte marks a user-interface request (a keypad string
/// sent by the client). These frames encode the address and payload as
/// single hex characters rather than byte pairs.
fn is_user_interface_req(start: u8) -> bool {
    start == 0x83
}

/// Whether the START byte marks a user-interface response from the panel.
fn is_user_interface_resp(start: u8) -> bool {
    start == 0x82
}

/// Determine whether the packet has an address encoded into it.
///
/// There exists an undocumented bug/edge case in the protocol - some
/// packets with 0x82 as start still encode the address into the packet,
/// and thus throw off decoding. This edge case is handled explicitly via
/// the total line length.
fn has_address(start: u8, line_len: usize) -> bool {
    (0x01 & start) != 0 || (start == 0x82 && line_len == 16)
}

/// Whether the packet has a timestamp encoded into it.
fn has_timestamp(start: u8) -> bool {
    (0x04 & start) != 0
}

/// Compute the checksum byte closing an encoded frame body (everything up
/// to but excluding the checksum itself).
///
/// Panel-emitted frames sum the decoded hex byte pairs; user-interface
/// request frames sum the raw ASCII characters, since the keypad alphabet
/// includes non-hex characters such as `*` and `#`. Either way the frame
/// is intact when body-sum plus checksum-byte is 0 mod 256.
fn checksum(body: &str, keypad: bool) -> Result<u8> {
    let total: u32 = if keypad {
        body.bytes().map(u32::from).sum()
    } else {
        let mut sum = 0u32;
        for i in (0..body.len()).step_by(2) {
            let pair = body
                .get(i..i + 2)
                .ok_or_else(|| NessError::MalformedPacket("odd-length frame body".into()))?;
            let value = u8::from_str_radix(pair, 16).map_err(|_| {
                NessError::MalformedPacket(format!("non-hex byte pair '{pair}'"))
            })?;
            sum += u32::from(value);
        }
        sum
    };
    Ok(((256 - (total % 256)) % 256) as u8)
}

/// Helper for iterating through the characters of a raw frame.
struct DataIterator<'a> {
    data: &'a str,
    position: usize,
}

impl<'a> DataIterator<'a> {
    fn new(data: &'a str) -> Self {
        Self { data, position: 0 }
    }

    /// Take `units` fields of two hex characters each, or single characters
    /// when `half` is set.
    fn take_str(&mut self, units: usize, half: bool) -> Result<&'a str> {
        let width = if half { 1 } else { 2 };
        let end = self.position + units * width;
        if end > self.data.len() {
            return Err(NessError::Truncation);
        }
        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn take_hex(&mut self, half: bool) -> Result<u8> {
        let field = self.take_str(1, half)?;
        u8::from_str_radix(field, 16)
            .map_err(|_| NessError::MalformedPacket(format!("non-hex field '{field}'")))
    }

    fn is_consumed(&self) -> bool {
        self.position >= self.data.len()
    }
}

/// Decode a `YYMMDDHHMMSS` timestamp trailer.
///
/// The Ness panel contains a bug where zone and state updates emitted on
/// the hour carry a minute value of 60. Such timestamps are normalized by
/// rolling into the next hour (which may roll the date over too).
fn decode_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let field = |i: usize| -> Result<u32> {
        raw[i..i + 2]
            .parse::<u32>()
            .map_err(|_| NessError::MalformedPacket(format!("non-decimal timestamp '{raw}'")))
    };

    let year = 2000 + field(0)? as i32;
    let month = field(2)?;
    let day = field(4)?;
    let hour = field(6)?;
    let mut minute = field(8)?;
    let second = field(10)?;

    let mut extra_hour = false;
    if minute == 60 {
        minute = 0;
        extra_hour = true;
    }

    let timestamp = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(|| NessError::MalformedPacket(format!("impossible timestamp '{raw}'")))?;

    if extra_hour {
        timestamp
            .checked_add_signed(Duration::hours(1))
            .ok_or_else(|| NessError::MalformedPacket(format!("impossible timestamp '{raw}'")))
    } else {
        Ok(timestamp)
    }
}

/// Encode a timestamp as the `YYMMDDHHMMSS` wire trailer.
fn encode_timestamp(timestamp: &NaiveDateTime) -> String {
    format!(
        "{:02}{:02}{:02}{:02}{:02}{:02}",
        timestamp.year() % 100,
        timestamp.month(),
        timestamp.day(),
        timestamp.hour(),
        timestamp.minute(),
        timestamp.second()
    )
}

/// One decoded unit of the wire protocol.
///
/// The START byte is not stored; it is re-derived from the fields on
/// encode. Packets are immutable value objects: created by [`decode`]
/// (`Packet::decode`) or explicit construction, consumed by the event
/// decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub address: Option<u8>,
    /// Sequence number (0 or 1), packed into bit 7 of the length field
    pub seq: u8,
    pub command: CommandType,
    /// Payload as it appears on the wire: hex byte pairs, or raw keypad
    /// characters for user-interface requests
    pub data: String,
    pub timestamp: Option<NaiveDateTime>,
    /// Whether this packet is a USER_INTERFACE response
    pub is_user_interface_response: bool,
}

impl Packet {
    pub fn new(
        address: Option<u8>,
        seq: u8,
        command: CommandType,
        data: impl Into<String>,
        timestamp: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            address,
            seq,
            command,
            data: data.into(),
            timestamp,
            is_user_interface_response: false,
        }
    }

    /// The START byte derived from the packet fields.
    pub fn start(&self) -> u8 {
        let mut rv = 0x02 | 0x80;
        if self.address.is_some() && !self.is_user_interface_response {
            rv |= 0x01;
        }
        if self.timestamp.is_some() {
            rv |= 0x04;
        }
        rv
    }

    /// Payload unit count: characters for user-interface requests, byte
    /// pairs for everything else.
    pub fn length(&self) -> u8 {
        if is_user_interface_req(self.start()) {
            self.data.len() as u8
        } else {
            (self.data.len() / 2) as u8
        }
    }

    /// The length field with the sequence number packed into bit 7.
    pub fn length_field(&self) -> u8 {
        self.length() | (self.seq << 7)
    }

    /// Encode the packet as an upper-case ASCII-hex line (without line
    /// terminator), checksum included.
    ///
    /// Fails only if a non-hex payload was smuggled into a frame kind that
    /// requires hex byte pairs.
    pub fn encode(&self) -> Result<String> {
        let start = self.start();
        let keypad = is_user_interface_req(start);

        let mut out = format!("{start:02X}");
        if let Some(address) = self.address {
            if keypad {
                out.push_str(&format!("{address:X}"));
            } else {
                out.push_str(&format!("{address:02X}"));
            }
        }
        out.push_str(&format!("{:02X}", self.length_field()));
        out.push_str(&format!("{:02X}", self.command.as_byte()));
        out.push_str(&self.data);
        if let Some(ref timestamp) = self.timestamp {
            out.push_str(&encode_timestamp(timestamp));
        }

        let checksum = checksum(&out, keypad)?;
        out.push_str(&format!("{checksum:02X}"));
        Ok(out)
    }

    /// Decode a raw ASCII-hex line (case-insensitive, no line terminator)
    /// into a packet.
    ///
    /// With `validate_checksum` unset the trailing checksum byte is still
    /// consumed but not checked; callers use this for test fixtures or
    /// trusted sources.
    pub fn decode(line: &str, validate_checksum: bool) -> Result<Packet> {
        if !line.is_ascii() {
            return Err(NessError::MalformedPacket("non-ASCII input".into()));
        }

        let mut iterator = DataIterator::new(line);

        let start = iterator.take_hex(false)?;
        let keypad = is_user_interface_req(start);

        let mut address = None;
        if has_address(start, line.len()) {
            address = Some(iterator.take_hex(keypad)?);
        }

        let length_field = iterator.take_hex(false)?;
        let data_length = (length_field & 0x7f) as usize;
        let seq = length_field >> 7;
        let command = CommandType::from_byte(iterator.take_hex(false)?);

        let data = iterator.take_str(data_length, keypad)?.to_string();

        let mut timestamp = None;
        if has_timestamp(start) {
            timestamp = Some(decode_timestamp(iterator.take_str(6, false)?)?);
        }

        // The checksum byte is the last field; its value folds the running
        // sum to zero when the frame is intact.
        let checksum_byte = iterator.take_hex(false)?;

        if !iterator.is_consumed() {
            return Err(NessError::Truncation);
        }

        if validate_checksum {
            let body = &line[..line.len() - 2];
            if checksum(body, keypad)? != checksum_byte {
                return Err(NessError::Checksum);
            }
        }

        Ok(Packet {
            address,
            seq,
            command,
            data,
            timestamp,
            is_user_interface_response: is_user_interface_resp(start)
                && command == CommandType::UserInterface,
        })
    }
}
