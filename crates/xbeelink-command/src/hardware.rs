//! Hardware version (`HV`) interpretation.

use std::fmt;

use serde::Serialize;

/// Radio family, from the high byte of `HV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RadioType {
    Series1,
    Series1Pro,
    Series2,
    Series2Pro,
    Series2BPro,
}

impl RadioType {
    pub fn description(self) -> &'static str {
        match self {
            RadioType::Series1 => "Series 1",
            RadioType::Series1Pro => "Series 1 Pro",
            RadioType::Series2 => "Series 2",
            RadioType::Series2Pro => "Series 2 Pro",
            RadioType::Series2BPro => "Series 2B Pro",
        }
    }
}

/// Raw `HV` register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct HardwareVersion(pub u16);

impl HardwareVersion {
    /// The radio family, if the high byte is a known one.
    pub fn radio_type(self) -> Option<RadioType> {
        match self.0 >> 8 {
            0x17 => Some(RadioType::Series1),
            0x18 => Some(RadioType::Series1Pro),
            0x19 => Some(RadioType::Series2),
            0x1A => Some(RadioType::Series2Pro),
            0x1E => Some(RadioType::Series2BPro),
            _ => None,
        }
    }

    /// Board revision, the low byte.
    pub fn revision(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl fmt::Display for HardwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.radio_type() {
            Some(radio) => write!(f, "0x{:04X} ({})", self.0, radio.description()),
            None => write!(f, "0x{:04X}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radio_type() {
        assert_eq!(
            HardwareVersion(0x1A46).radio_type(),
            Some(RadioType::Series2Pro)
        );
        assert_eq!(HardwareVersion(0x1A46).revision(), 0x46);
        assert_eq!(
            HardwareVersion(0x1E41).radio_type(),
            Some(RadioType::Series2BPro)
        );
        assert_eq!(HardwareVersion(0x2200).radio_type(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(HardwareVersion(0x1946).to_string(), "0x1946 (Series 2)");
        assert_eq!(HardwareVersion(0x0001).to_string(), "0x0001");
    }
}
