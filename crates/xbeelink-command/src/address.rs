//! Radio addresses.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// 64-bit extended (IEEE) address, e.g. `0013A200.4062AC98`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address64(pub u64);

impl Address64 {
    /// The coordinator.
    pub const COORDINATOR: Address64 = Address64(0);

    /// Broadcast to every node.
    pub const BROADCAST: Address64 = Address64(0x0000_0000_0000_FFFF);

    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }
}

impl fmt::Display for Address64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}.{:08X}", self.0 >> 32, self.0 & 0xFFFF_FFFF)
    }
}

/// The address string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {bits}-bit address {input:?}")]
pub struct ParseAddressError {
    bits: u32,
    input: String,
}

fn parse_hex(s: &str, digits: usize) -> Option<u64> {
    let hex: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.' && *c != ':')
        .collect();
    let hex = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(&hex);
    if hex.len() != digits || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(hex, 16).ok()
}

/// Accepts `0013A200.4062AC98`, `00 13 a2 00 40 62 ac 98`,
/// `0013a200 4062ac98` and `0013a2004062ac98`.
impl FromStr for Address64 {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s, 16).map(Address64).ok_or_else(|| ParseAddressError {
            bits: 64,
            input: s.to_string(),
        })
    }
}

impl Serialize for Address64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 16-bit network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address16(pub u16);

impl Address16 {
    /// The coordinator.
    pub const COORDINATOR: Address16 = Address16(0);

    /// Broadcast on the 16-bit address space.
    pub const BROADCAST: Address16 = Address16(0xFFFF);

    /// Address not known; route by the 64-bit address instead.
    pub const UNKNOWN: Address16 = Address16(0xFFFE);

    pub fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }
}

impl fmt::Display for Address16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

impl FromStr for Address16 {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s, 4)
            .map(|v| Address16(v as u16))
            .ok_or_else(|| ParseAddressError {
                bits: 16,
                input: s.to_string(),
            })
    }
}

impl Serialize for Address16 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_64() {
        assert_eq!(
            Address64(0x0013_A200_405D_8027).to_string(),
            "0013A200.405D8027"
        );
        assert_eq!(Address64::BROADCAST.to_string(), "00000000.0000FFFF");
    }

    #[test]
    fn test_parse_64_forms() {
        let expected = Address64(0x48FE_0013_A200_405D);
        for input in [
            "48 fe 00 13 a2 00 40 5d",
            "48fe0013 a200405d",
            "48fe0013a200405d",
            "48FE0013.A200405D",
        ] {
            assert_eq!(input.parse::<Address64>().unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_parse_64_rejects_bad_input() {
        assert!("0013A200".parse::<Address64>().is_err());
        assert!("0013A200.4062AC9G".parse::<Address64>().is_err());
        assert!("0013A200.4062AC9800".parse::<Address64>().is_err());
    }

    #[test]
    fn test_display_parse_roundtrip() {
        let addr = Address64(0x0013_A200_4062_AC98);
        assert_eq!(addr.to_string().parse::<Address64>().unwrap(), addr);
    }

    #[test]
    fn test_bytes_64() {
        let addr = Address64::from_be_bytes([0x00, 0x13, 0xA2, 0x00, 0x40, 0x62, 0xAC, 0x98]);
        assert_eq!(addr, Address64(0x0013_A200_4062_AC98));
        assert_eq!(addr.to_be_bytes()[1], 0x13);
    }

    #[test]
    fn test_address16() {
        assert_eq!(Address16::UNKNOWN.to_string(), "FFFE");
        assert_eq!("fffe".parse::<Address16>().unwrap(), Address16::UNKNOWN);
        assert_eq!(Address16::from_be_bytes([0xAE, 0x38]), Address16(0xAE38));
        assert!("FFFFF".parse::<Address16>().is_err());
    }

    #[test]
    fn test_serialize_as_string() {
        let json = serde_json::to_string(&Address64(0x0013_A200_4062_AC98)).unwrap();
        assert_eq!(json, "\"0013A200.4062AC98\"");
        let json = serde_json::to_string(&Address16(0x4634)).unwrap();
        assert_eq!(json, "\"4634\"");
    }
}
