//! Validated device address.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a string is not a strict IPv4 dotted quad.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ip address format incorrect: {0:?}")]
pub struct AddressError(pub String);

/// IPv4 address of a television, validated before any session is built.
///
/// Accepts exactly four decimal octets in `0..=255`, without signs,
/// whitespace or leading zeros (`"010.0.0.1"` is rejected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceAddress(Ipv4Addr);

impl DeviceAddress {
    /// Parses and validates a dotted-quad string.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let mut octets = [0u8; 4];
        let mut parts = raw.split('.');

        for octet in &mut octets {
            *octet = parts
                .next()
                .and_then(parse_octet)
                .ok_or_else(|| AddressError(raw.to_string()))?;
        }

        if parts.next().is_some() {
            return Err(AddressError(raw.to_string()));
        }

        Ok(Self(Ipv4Addr::from(octets)))
    }

    /// Builds the `http://` URL for an endpoint path on this device.
    ///
    /// The port is omitted when it is the HTTP default.
    #[must_use]
    pub fn endpoint_url(&self, port: u16, path: &str) -> String {
        if port == 80 {
            format!("http://{}{}", self.0, path)
        } else {
            format!("http://{}:{}{}", self.0, port, path)
        }
    }
}

/// Parses one octet: 1-3 ASCII digits, no leading zero, at most 255.
fn parse_octet(part: &str) -> Option<u8> {
    let bytes = part.as_bytes();
    if bytes.is_empty() || bytes.len() > 3 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    part.parse::<u8>().ok()
}

impl FromStr for DeviceAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for DeviceAddress {
    type Error = AddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Ipv4Addr> for DeviceAddress {
    fn from(ip: Ipv4Addr) -> Self {
        Self(ip)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_dotted_quads() {
        for raw in [
            "0.0.0.0",
            "192.168.1.114",
            "10.0.0.1",
            "255.255.255.255",
            "1.22.199.250",
        ] {
            let addr = DeviceAddress::parse(raw).expect("should be valid");
            assert_eq!(addr.to_string(), raw);
        }
    }

    #[test]
    fn rejects_out_of_range_octets() {
        assert!(DeviceAddress::parse("256.1.1.1").is_err());
        assert!(DeviceAddress::parse("1.1.1.300").is_err());
        assert!(DeviceAddress::parse("1.1.1.1000").is_err());
    }

    #[test]
    fn rejects_malformed_strings() {
        for raw in [
            "",
            "1.1.1",
            "1.1.1.1.1",
            "1.1.1.",
            ".1.1.1",
            "01.1.1.1",
            "1.1.1.00",
            "a.b.c.d",
            " 1.1.1.1",
            "1.1.1.1 ",
            "+1.1.1.1",
            "::1",
            "tv.local",
        ] {
            let err = DeviceAddress::parse(raw).expect_err(raw);
            assert_eq!(err, AddressError(raw.to_string()));
        }
    }

    #[test]
    fn builds_endpoint_urls() {
        let addr: DeviceAddress = "192.168.1.114".parse().unwrap();
        assert_eq!(
            addr.endpoint_url(80, "/sony/system"),
            "http://192.168.1.114/sony/system"
        );
        assert_eq!(
            addr.endpoint_url(8080, "/sony/IRCC"),
            "http://192.168.1.114:8080/sony/IRCC"
        );
    }
}
