//! The AT command catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// A two-character AT command mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AtCommand {
    /// Association Status.
    Ai,
    /// API Options.
    Ao,
    /// API Enable.
    Ap,
    /// Interface Data Rate.
    Bd,
    /// Operating Channel.
    Ch,
    /// AD0/DIO0 Configuration.
    D0,
    /// AD1/DIO1 Configuration.
    D1,
    /// AD2/DIO2 Configuration.
    D2,
    /// AD3/DIO3 Configuration.
    D3,
    /// DIO4 Configuration.
    D4,
    /// DIO5 Configuration.
    D5,
    /// DIO6 Configuration.
    D6,
    /// DIO7 Configuration.
    D7,
    /// DIO8 Configuration.
    D8,
    /// Received Signal Strength.
    Db,
    /// Device Type Identifier.
    Dd,
    /// Encryption Enable.
    Ee,
    /// Software Reset.
    Fr,
    /// Hardware Version.
    Hv,
    /// Extended PAN ID.
    Id,
    /// IO Sample Rate.
    Ir,
    /// Force Sample.
    Is,
    /// 16-bit Network Address.
    My,
    /// Number of Remaining Children.
    Nc,
    /// Node Discover.
    Nd,
    /// Node Identifier.
    Ni,
    /// Node Join Time.
    Nj,
    /// Network Discovery Options.
    No,
    /// Maximum RF Payload Bytes.
    Np,
    /// Node Discovery Timeout.
    Nt,
    /// Operating 16-bit PAN ID.
    Oi,
    /// Operating Extended PAN ID.
    Op,
    /// PWM0 Configuration.
    P0,
    /// DIO11 Configuration.
    P1,
    /// DIO12 Configuration.
    P2,
    /// DIO13 Configuration.
    P3,
    /// Restore Defaults.
    Re,
    /// RSSI PWM Timer.
    Rp,
    /// Scan Duration.
    Sd,
    /// Serial Number High.
    Sh,
    /// Serial Number Low.
    Sl,
    /// Supply Voltage.
    SupplyVoltage,
    /// Firmware Version.
    Vr,
    /// Write.
    Wr,
}

impl AtCommand {
    /// Every command in the catalog.
    pub const ALL: [AtCommand; 44] = [
        AtCommand::Ai,
        AtCommand::Ao,
        AtCommand::Ap,
        AtCommand::Bd,
        AtCommand::Ch,
        AtCommand::D0,
        AtCommand::D1,
        AtCommand::D2,
        AtCommand::D3,
        AtCommand::D4,
        AtCommand::D5,
        AtCommand::D6,
        AtCommand::D7,
        AtCommand::D8,
        AtCommand::Db,
        AtCommand::Dd,
        AtCommand::Ee,
        AtCommand::Fr,
        AtCommand::Hv,
        AtCommand::Id,
        AtCommand::Ir,
        AtCommand::Is,
        AtCommand::My,
        AtCommand::Nc,
        AtCommand::Nd,
        AtCommand::Ni,
        AtCommand::Nj,
        AtCommand::No,
        AtCommand::Np,
        AtCommand::Nt,
        AtCommand::Oi,
        AtCommand::Op,
        AtCommand::P0,
        AtCommand::P1,
        AtCommand::P2,
        AtCommand::P3,
        AtCommand::Re,
        AtCommand::Rp,
        AtCommand::Sd,
        AtCommand::Sh,
        AtCommand::Sl,
        AtCommand::SupplyVoltage,
        AtCommand::Vr,
        AtCommand::Wr,
    ];

    /// Look up a command by its two wire bytes.
    pub fn from_code(code: [u8; 2]) -> Option<Self> {
        Self::ALL.iter().copied().find(|cmd| cmd.code() == code)
    }

    /// The two ASCII bytes sent on the wire.
    pub fn code(self) -> [u8; 2] {
        let bytes = self.as_str().as_bytes();
        [bytes[0], bytes[1]]
    }

    /// The mnemonic, e.g. `"ND"`.
    pub fn as_str(self) -> &'static str {
        match self {
            AtCommand::Ai => "AI",
            AtCommand::Ao => "AO",
            AtCommand::Ap => "AP",
            AtCommand::Bd => "BD",
            AtCommand::Ch => "CH",
            AtCommand::D0 => "D0",
            AtCommand::D1 => "D1",
            AtCommand::D2 => "D2",
            AtCommand::D3 => "D3",
            AtCommand::D4 => "D4",
            AtCommand::D5 => "D5",
            AtCommand::D6 => "D6",
            AtCommand::D7 => "D7",
            AtCommand::D8 => "D8",
            AtCommand::Db => "DB",
            AtCommand::Dd => "DD",
            AtCommand::Ee => "EE",
            AtCommand::Fr => "FR",
            AtCommand::Hv => "HV",
            AtCommand::Id => "ID",
            AtCommand::Ir => "IR",
            AtCommand::Is => "IS",
            AtCommand::My => "MY",
            AtCommand::Nc => "NC",
            AtCommand::Nd => "ND",
            AtCommand::Ni => "NI",
            AtCommand::Nj => "NJ",
            AtCommand::No => "NO",
            AtCommand::Np => "NP",
            AtCommand::Nt => "NT",
            AtCommand::Oi => "OI",
            AtCommand::Op => "OP",
            AtCommand::P0 => "P0",
            AtCommand::P1 => "P1",
            AtCommand::P2 => "P2",
            AtCommand::P3 => "P3",
            AtCommand::Re => "RE",
            AtCommand::Rp => "RP",
            AtCommand::Sd => "SD",
            AtCommand::Sh => "SH",
            AtCommand::Sl => "SL",
            AtCommand::SupplyVoltage => "%V",
            AtCommand::Vr => "VR",
            AtCommand::Wr => "WR",
        }
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            AtCommand::Ai => "Association Status",
            AtCommand::Ao => "API Options",
            AtCommand::Ap => "API Enable",
            AtCommand::Bd => "Interface Data Rate",
            AtCommand::Ch => "Operating Channel",
            AtCommand::D0 => "AD0/DIO0 Configuration",
            AtCommand::D1 => "AD1/DIO1 Configuration",
            AtCommand::D2 => "AD2/DIO2 Configuration",
            AtCommand::D3 => "AD3/DIO3 Configuration",
            AtCommand::D4 => "DIO4 Configuration",
            AtCommand::D5 => "DIO5 Configuration",
            AtCommand::D6 => "DIO6 Configuration",
            AtCommand::D7 => "DIO7 Configuration",
            AtCommand::D8 => "DIO8 Configuration",
            AtCommand::Db => "Received Signal Strength",
            AtCommand::Dd => "Device Type Identifier",
            AtCommand::Ee => "Encryption Enable",
            AtCommand::Fr => "Software Reset",
            AtCommand::Hv => "Hardware Version",
            AtCommand::Id => "Extended PAN ID",
            AtCommand::Ir => "IO Sample Rate",
            AtCommand::Is => "Force Sample",
            AtCommand::My => "16-bit Network Address",
            AtCommand::Nc => "Number of Remaining Children",
            AtCommand::Nd => "Node Discover",
            AtCommand::Ni => "Node Identifier",
            AtCommand::Nj => "Node Join Time",
            AtCommand::No => "Network Discovery Options",
            AtCommand::Np => "Maximum RF Payload Bytes",
            AtCommand::Nt => "Node Discovery Timeout",
            AtCommand::Oi => "Operating 16-bit PAN ID",
            AtCommand::Op => "Operating Extended PAN ID",
            AtCommand::P0 => "PWM0 Configuration",
            AtCommand::P1 => "DIO11 Configuration",
            AtCommand::P2 => "DIO12 Configuration",
            AtCommand::P3 => "DIO13 Configuration",
            AtCommand::Re => "Restore Defaults",
            AtCommand::Rp => "RSSI PWM Timer",
            AtCommand::Sd => "Scan Duration",
            AtCommand::Sh => "Serial Number High",
            AtCommand::Sl => "Serial Number Low",
            AtCommand::SupplyVoltage => "Supply Voltage",
            AtCommand::Vr => "Firmware Version",
            AtCommand::Wr => "Write",
        }
    }
}

impl fmt::Display for AtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The mnemonic is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown AT command {0:?}")]
pub struct UnknownCommand(String);

/// Parses a mnemonic, case-insensitively.
impl FromStr for AtCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let found = match upper.as_bytes() {
            [a, b] => Self::from_code([*a, *b]),
            _ => None,
        };
        found.ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

impl Serialize for AtCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_codes_are_unique() {
        let mut codes: Vec<[u8; 2]> = AtCommand::ALL.iter().map(|c| c.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), AtCommand::ALL.len());
    }

    #[test]
    fn test_from_code() {
        assert_eq!(AtCommand::from_code(*b"ND"), Some(AtCommand::Nd));
        assert_eq!(AtCommand::from_code(*b"%V"), Some(AtCommand::SupplyVoltage));
        assert_eq!(AtCommand::from_code(*b"D0"), Some(AtCommand::D0));
        assert_eq!(AtCommand::from_code(*b"ZZ"), None);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("hv".parse::<AtCommand>().unwrap(), AtCommand::Hv);
        assert_eq!(" P0 ".parse::<AtCommand>().unwrap(), AtCommand::P0);
        assert!("NDX".parse::<AtCommand>().is_err());
        assert!("".parse::<AtCommand>().is_err());
    }

    #[test]
    fn test_display_and_description() {
        assert_eq!(AtCommand::Nt.to_string(), "NT");
        assert_eq!(AtCommand::Nt.description(), "Node Discovery Timeout");
        assert_eq!(AtCommand::SupplyVoltage.to_string(), "%V");
    }
}
