use std::fmt;
use std::ops::{Deref, DerefMut};

use super::attrs::Nl80211Attr;
use super::frame::Nl80211Frame;
use super::ieee80211::{BOGUS_MAC_ADDRESS, mac_address_string, ssid_string};
use super::Nl80211Command;
use crate::netlink::attribute::AttributeValue;
use crate::netlink::message::{GenericNetlinkMessage, ILLEGAL_MESSAGE_TYPE};

/// A message of the nl80211 family.
///
/// New requests carry [`ILLEGAL_MESSAGE_TYPE`] until they are sent through a
/// manager that has resolved the family id.
#[derive(Debug, Clone, PartialEq)]
pub struct Nl80211Message(GenericNetlinkMessage);

impl Nl80211Message {
    /// An empty request for `command`.
    pub fn new(command: Nl80211Command) -> Self {
        Self(GenericNetlinkMessage::new(ILLEGAL_MESSAGE_TYPE, command.as_u8()))
    }

    pub(crate) fn from_parts(inner: GenericNetlinkMessage) -> Self {
        Self(inner)
    }

    pub fn nl80211_command(&self) -> Nl80211Command {
        Nl80211Command::from_u8(self.command)
    }

    /// A raw attribute rendered as a MAC address.
    ///
    /// Returns `XX:XX:XX:XX:XX:XX` if the attribute is missing or short.
    pub fn mac_string(&self, id: u16) -> String {
        match self.attributes().get_raw(id) {
            Some(data) => mac_address_string(data),
            None => BOGUS_MAC_ADDRESS.to_string(),
        }
    }

    /// The frequencies listed in `NL80211_ATTR_SCAN_FREQUENCIES`.
    pub fn scan_frequencies(&self) -> Vec<u32> {
        self.attributes()
            .get_nested(Nl80211Attr::ScanFrequencies as u16)
            .map(|list| {
                list.iter()
                    .filter_map(|entry| match entry.value() {
                        Some(AttributeValue::U32(freq)) => Some(*freq),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The SSIDs listed in `NL80211_ATTR_SCAN_SSIDS`, with non-printable
    /// bytes escaped.
    pub fn scan_ssids(&self) -> Vec<String> {
        self.attributes()
            .get_nested(Nl80211Attr::ScanSsids as u16)
            .map(|list| {
                list.iter()
                    .filter_map(|entry| match entry.value() {
                        Some(AttributeValue::String(ssid)) => Some(ssid_string(ssid.as_bytes())),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The management frame in `NL80211_ATTR_FRAME`, if present.
    pub fn frame(&self) -> Option<Nl80211Frame> {
        self.attributes()
            .get_raw(Nl80211Attr::Frame as u16)
            .map(Nl80211Frame::new)
    }
}

impl Deref for Nl80211Message {
    type Target = GenericNetlinkMessage;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Nl80211Message {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl fmt::Display for Nl80211Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Message type: {} ({}){}",
            self.nl80211_command().name(),
            self.command,
            self.attributes()
        )
    }
}
