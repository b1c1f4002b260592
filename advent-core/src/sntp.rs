//! SNTP Client-Codec (RFC 4330)
//!
//! Baut Anfrage-Pakete und wertet Server-Antworten aus.
//! Kein Netzwerk-Zugriff, nur Byte-Verarbeitung.

use core::fmt;

/// Größe eines SNTP-Pakets ohne Erweiterungen
pub const SNTP_PACKET_SIZE: usize = 48;

/// Standard-Port für NTP/SNTP
pub const SNTP_PORT: u16 = 123;

/// Sekunden zwischen NTP-Epoche (1900) und Unix-Epoche (1970)
pub const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

const VERSION: u8 = 4;
const MODE_CLIENT: u8 = 3;
const MODE_SERVER: u8 = 4;
const MODE_BROADCAST: u8 = 5;
const LEAP_ALARM: u8 = 3;
const MAX_STRATUM: u8 = 15;
const TRANSMIT_TIMESTAMP_OFFSET: usize = 40;

/// Fehler beim Auswerten einer SNTP-Antwort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SntpError {
    /// Paket kürzer als 48 Bytes
    TooShort(usize),
    /// Kein Server-Paket (Mode != 4/5)
    UnexpectedMode(u8),
    /// Server nicht synchronisiert (Leap Indicator = 3)
    Unsynchronized,
    /// Kiss-of-Death (Stratum 0) oder ungültiger Stratum
    InvalidStratum(u8),
    /// Transmit-Timestamp ist 0
    MissingTimestamp,
}

impl fmt::Display for SntpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(len) => write!(f, "SNTP packet too short ({len} bytes)"),
            Self::UnexpectedMode(mode) => write!(f, "unexpected SNTP mode {mode}"),
            Self::Unsynchronized => f.write_str("SNTP server is not synchronized"),
            Self::InvalidStratum(stratum) => write!(f, "invalid SNTP stratum {stratum}"),
            Self::MissingTimestamp => f.write_str("SNTP transmit timestamp missing"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SntpError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            SntpError::TooShort(len) => defmt::write!(fmt, "Packet too short ({=usize})", *len),
            SntpError::UnexpectedMode(mode) => defmt::write!(fmt, "Unexpected mode {=u8}", *mode),
            SntpError::Unsynchronized => defmt::write!(fmt, "Server unsynchronized"),
            SntpError::InvalidStratum(stratum) => {
                defmt::write!(fmt, "Invalid stratum {=u8}", *stratum)
            }
            SntpError::MissingTimestamp => defmt::write!(fmt, "Missing timestamp"),
        }
    }
}

/// Baut eine Client-Anfrage (LI = 0, VN = 4, Mode = 3)
pub fn build_request() -> [u8; SNTP_PACKET_SIZE] {
    let mut packet = [0u8; SNTP_PACKET_SIZE];
    packet[0] = (VERSION << 3) | MODE_CLIENT;
    packet
}

/// Wertet eine Server-Antwort aus und liefert Unix-Sekunden (UTC)
///
/// Nutzt den Transmit-Timestamp (Sekundenanteil). Für ein Datum reicht
/// Sekundenauflösung.
pub fn parse_response(packet: &[u8]) -> Result<u64, SntpError> {
    if packet.len() < SNTP_PACKET_SIZE {
        return Err(SntpError::TooShort(packet.len()));
    }

    let leap = packet[0] >> 6;
    let mode = packet[0] & 0b111;
    let stratum = packet[1];

    if mode != MODE_SERVER && mode != MODE_BROADCAST {
        return Err(SntpError::UnexpectedMode(mode));
    }
    if leap == LEAP_ALARM {
        return Err(SntpError::Unsynchronized);
    }
    if stratum == 0 || stratum > MAX_STRATUM {
        return Err(SntpError::InvalidStratum(stratum));
    }

    let mut secs = [0u8; 4];
    secs.copy_from_slice(&packet[TRANSMIT_TIMESTAMP_OFFSET..TRANSMIT_TIMESTAMP_OFFSET + 4]);
    let ntp_secs = u64::from(u32::from_be_bytes(secs));
    if ntp_secs == 0 {
        return Err(SntpError::MissingTimestamp);
    }

    // Era 0 endet 2036: kleinere Werte gehören zu Era 1
    let ntp_secs = if ntp_secs < NTP_UNIX_OFFSET {
        ntp_secs + (1u64 << 32)
    } else {
        ntp_secs
    };

    Ok(ntp_secs - NTP_UNIX_OFFSET)
}
