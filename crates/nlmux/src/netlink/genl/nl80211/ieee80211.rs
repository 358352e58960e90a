//! IEEE 802.11 codes and their human-readable descriptions.

use std::fmt::Write as _;

/// One past the highest reason code defined by 802.11-2012.
pub const REASON_CODE_MAX: u16 = 46;
/// One past the highest status code defined by 802.11-2012.
pub const STATUS_CODE_MAX: u16 = 52;
/// Sentinel for "no reason/status present".
pub const CODE_INVALID: u16 = 0xffff;

/// Bytes in a MAC address.
pub const ETHERNET_ADDRESS_BYTES: usize = 6;

/// Placeholder for a MAC address that could not be read.
pub const BOGUS_MAC_ADDRESS: &str = "XX:XX:XX:XX:XX:XX";

fn reason_text(reason: u16) -> Option<&'static str> {
    Some(match reason {
        1 => "Unspecified reason",
        2 => "Previous authentication no longer valid",
        3 => "Deauthentcated because sending STA is leaving (or has left) IBSS or ESS",
        4 => "Disassociated due to inactivity",
        5 => "Disassociated because AP is unable to handle all currently associated STAs",
        6 => "Class 2 frame received from nonauthenticated STA",
        7 => "Class 3 frame received from nonassociated STA",
        8 => "Disassociated because sending STA is leaving (or has left) BSS",
        9 => "STA requesting (re)association is not authenticated with responding STA",
        10 => {
            "Disassociated because the information in the Power Capability element is \
             unacceptable"
        }
        11 => {
            "Disassociated because the information in the Supported Channels element is \
             unacceptable"
        }
        13 => {
            "Invalid information element, i.e., an information element defined in this \
             standard for which the content does not meet the specifications in Clause 7"
        }
        14 => "Message integrity code (MIC) failure",
        15 => "4-Way Handshake timeout",
        16 => "Group Key Handshake timeout",
        17 => {
            "Information element in 4-Way Handshake different from (Re)Association \
             Request/Probe Response/Beacon frame"
        }
        18 => "Invalid group cipher",
        19 => "Invalid pairwise cipher",
        20 => "Invalid AKMP",
        21 => "Unsupported RSN information element version",
        22 => "Invalid RSN information element capabilities",
        23 => "IEEE 802.1X authentication failed",
        24 => "Cipher suite rejected because of the security policy",
        32 => "Disassociated for unspecified, QoS-related reason",
        33 => "Disassociated because QoS AP lacks sufficient bandwidth for this QoS STA",
        34 => {
            "Disassociated because excessive number of frames need to be acknowledged, but \
             are not acknowledged due to AP transmissions and/or poor channel conditions"
        }
        35 => "Disassociated because STA is transmitting outside the limits of its TXOPs",
        36 => "Requested from peer STA as the STA is leaving the BSS (or resetting)",
        37 => "Requested from peer STA as it does not want to use the mechanism",
        38 => {
            "Requested from peer STA as the STA received frames using the mechanism for \
             which a setup is required"
        }
        39 => "Requested from peer STA due to timeout",
        45 => "Peer STA does not support the requested cipher suite",
        CODE_INVALID => "<INVALID REASON>",
        _ => return None,
    })
}

fn status_text(status: u16) -> Option<&'static str> {
    Some(match status {
        0 => "Successful",
        1 => "Unspecified failure",
        10 => "Cannot support all requested capabilities in the capability information field",
        11 => "Reassociation denied due to inability to confirm that association exists",
        12 => "Association denied due to reason outside the scope of this standard",
        13 => "Responding station does not support the specified authentication algorithm",
        14 => {
            "Received an authentication frame with authentication transaction sequence number \
             out of expected sequence"
        }
        15 => "Authentication rejected because of challenge failure",
        16 => "Authentication rejected due to timeout waiting for next frame in sequence",
        17 => "Association denied because AP is unable to handle additional associated STA",
        18 => {
            "Association denied due to requesting station not supporting all of the data \
             rates in the BSSBasicRateSet parameter"
        }
        19 => {
            "Association denied due to requesting station not supporting the short preamble \
             option"
        }
        20 => {
            "Association denied due to requesting station not supporting the PBCC modulation \
             option"
        }
        21 => {
            "Association denied due to requesting station not supporting the channel agility \
             option"
        }
        22 => "Association request rejected because Spectrum Management capability is required",
        23 => {
            "Association request rejected because the information in the Power Capability \
             element is unacceptable"
        }
        24 => {
            "Association request rejected because the information in the Supported Channels \
             element is unacceptable"
        }
        25 => {
            "Association request rejected due to requesting station not supporting the Short \
             Slot Time option"
        }
        26 => {
            "Association request rejected due to requesting station not supporting the \
             DSSS-OFDM option"
        }
        32 => "Unspecified, QoS related failure",
        33 => "Association denied due to QAP having insufficient bandwidth to handle another QSTA",
        34 => "Association denied due to poor channel conditions",
        35 => {
            "Association (with QoS BSS) denied due to requesting station not supporting the \
             QoS facility"
        }
        37 => "The request has been declined",
        38 => "The request has not been successful as one or more parameters have invalid values",
        39 => {
            "The TS has not been created because the request cannot be honored. However, a \
             suggested Tspec is provided so that the initiating QSTA may attempt to send \
             another TS with the suggested changes to the TSpec"
        }
        40 => "Invalid Information Element",
        41 => "Invalid Group Cipher",
        42 => "Invalid Pairwise Cipher",
        43 => "Invalid AKMP",
        44 => "Unsupported RSN Information Element version",
        45 => "Invalid RSN Information Element Capabilities",
        46 => "Cipher suite is rejected per security policy",
        47 => {
            "The TS has not been created. However, the HC may be capable of creating a TS, in \
             response to a request, after the time indicated in the TS Delay element"
        }
        48 => "Direct link is not allowed in the BSS by policy",
        49 => "Destination STA is not present within this BSS",
        50 => "The destination STA is not a QoS STA",
        51 => "Association denied because Listen Interval is too large",
        CODE_INVALID => "<INVALID STATUS>",
        _ => return None,
    })
}

/// Describe an 802.11 reason code.
pub fn reason_string(reason: u16) -> String {
    match reason_text(reason) {
        Some(text) => text.to_string(),
        None if reason < REASON_CODE_MAX => format!("<Reserved Reason:{reason}>"),
        None => format!("<Unknown Reason:{reason}>"),
    }
}

/// Describe an 802.11 status code.
pub fn status_string(status: u16) -> String {
    match status_text(status) {
        Some(text) => text.to_string(),
        None if status < STATUS_CODE_MAX => format!("<Reserved Status:{status}>"),
        None => format!("<Unknown Status:{status}>"),
    }
}

/// Format the first six bytes as `aa:bb:cc:dd:ee:ff`.
///
/// Returns [`BOGUS_MAC_ADDRESS`] if fewer than six bytes are given.
pub fn mac_address_string(bytes: &[u8]) -> String {
    let Some(mac) = bytes.get(..ETHERNET_ADDRESS_BYTES) else {
        return BOGUS_MAC_ADDRESS.to_string();
    };
    let mut out = String::with_capacity(17);
    for (i, byte) in mac.iter().enumerate() {
        if i > 0 {
            out.push(':');
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Render an SSID, escaping non-printable bytes as `\xNN`.
pub fn ssid_string(ssid: &[u8]) -> String {
    let mut out = String::with_capacity(ssid.len());
    for &byte in ssid {
        if byte == b' ' || byte.is_ascii_graphic() {
            out.push(byte as char);
        } else {
            let _ = write!(out, "\\x{byte:02x}");
        }
    }
    out
}

/// Describe `NL80211_ATTR_REG_INITIATOR`.
pub fn reg_initiator_string(initiator: u8) -> &'static str {
    match initiator {
        0 => "the wireless core upon initialization",
        1 => "a user",
        2 => "a driver",
        3 => "a country IE",
        _ => "<Unknown Reg Initiator>",
    }
}

/// Describe `NL80211_ATTR_KEY_TYPE`.
pub fn key_type_string(key_type: u32) -> &'static str {
    match key_type {
        0 => "Group",
        1 => "Pairwise",
        2 => "PeerKey",
        _ => "<Unknown Key Type>",
    }
}
