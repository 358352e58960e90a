//! 802.11 management frames carried in `NL80211_ATTR_FRAME`.

use std::fmt;

use super::ieee80211::{mac_address_string, reason_string, status_string};

/// Frames shorter than this are not decoded.
pub const MINIMUM_FRAME_BYTES: usize = 26;
/// Mask selecting type and subtype from the first frame-control byte.
pub const FRAME_TYPE_MASK: u8 = 0xfc;

const DESTINATION_OFFSET: usize = 4;
const SOURCE_OFFSET: usize = 10;
const REASON_OFFSET: usize = 24;
const ASSOC_STATUS_OFFSET: usize = 26;
const AUTH_STATUS_OFFSET: usize = 28;

/// Management frame subtypes this decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    AssocResponse,
    ReassocResponse,
    Disassoc,
    Auth,
    Deauth,
    Other(u8),
}

impl FrameType {
    pub fn from_u8(value: u8) -> Self {
        match value & FRAME_TYPE_MASK {
            0x10 => FrameType::AssocResponse,
            0x30 => FrameType::ReassocResponse,
            0xa0 => FrameType::Disassoc,
            0xb0 => FrameType::Auth,
            0xc0 => FrameType::Deauth,
            other => FrameType::Other(other),
        }
    }
}

/// A decoded management frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nl80211Frame {
    frame_type: Option<FrameType>,
    destination: Option<String>,
    source: Option<String>,
    reason: Option<u16>,
    status: Option<u16>,
    data: Vec<u8>,
}

fn le16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

impl Nl80211Frame {
    /// Decode the header fields of `data`. Short frames keep only the bytes.
    pub fn new(data: &[u8]) -> Self {
        let mut frame = Self {
            frame_type: None,
            destination: None,
            source: None,
            reason: None,
            status: None,
            data: data.to_vec(),
        };
        if data.len() < MINIMUM_FRAME_BYTES {
            return frame;
        }

        let frame_type = FrameType::from_u8(data[0]);
        frame.frame_type = Some(frame_type);
        frame.destination = Some(mac_address_string(&data[DESTINATION_OFFSET..]));
        frame.source = Some(mac_address_string(&data[SOURCE_OFFSET..]));
        match frame_type {
            FrameType::AssocResponse | FrameType::ReassocResponse => {
                frame.status = le16(data, ASSOC_STATUS_OFFSET);
            }
            FrameType::Auth => frame.status = le16(data, AUTH_STATUS_OFFSET),
            FrameType::Disassoc | FrameType::Deauth => frame.reason = le16(data, REASON_OFFSET),
            FrameType::Other(_) => {}
        }
        frame
    }

    /// `None` for frames too short to decode.
    pub fn frame_type(&self) -> Option<FrameType> {
        self.frame_type
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Reason code of a deauth or disassoc frame.
    pub fn reason(&self) -> Option<u16> {
        self.reason
    }

    /// Status code of an auth or (re)assoc response frame.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for Nl80211Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data.is_empty() {
            return f.write_str(" [no frame]");
        }
        match (&self.frame_type, &self.destination, &self.source) {
            (Some(frame_type), Some(destination), Some(source)) => {
                write!(f, " {destination} -> {source}")?;
                let status = self.status.unwrap_or(u16::MAX);
                let reason = self.reason.unwrap_or(u16::MAX);
                match frame_type {
                    FrameType::AssocResponse => {
                        write!(f, "; AssocResponse status: {status}: {}", status_string(status))?
                    }
                    FrameType::ReassocResponse => write!(
                        f,
                        "; ReassocResponse status: {status}: {}",
                        status_string(status)
                    )?,
                    FrameType::Auth => {
                        write!(f, "; Auth status: {status}: {}", status_string(status))?
                    }
                    FrameType::Disassoc => {
                        write!(f, "; Disassoc reason {reason}: {}", reason_string(reason))?
                    }
                    FrameType::Deauth => {
                        write!(f, "; Deauth reason {reason}: {}", reason_string(reason))?
                    }
                    FrameType::Other(_) => {}
                }
                f.write_str(" [frame: ")?;
            }
            _ => f.write_str(" [invalid frame: ")?,
        }
        for byte in &self.data {
            write!(f, "{byte:02x}, ")?;
        }
        f.write_str("]")
    }
}
