use std::net::TcpStream;
use std::time::Duration;

use clap::{ArgGroup, Args, Subcommand};
use tracing::info;
use xbeelink_command::{Address64, AtCommand};
use xbeelink_radio::{Radio, RadioConfig};
use xbeelink_transport::XbeeStream;

use crate::exit::{io_error, radio_error, serial_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod at;
pub mod discover;
pub mod listen;
pub mod remote_at;
pub mod version;

/// How often the reader checks for shutdown on an idle link.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every frame the radio sends until interrupted.
    Listen(ListenArgs),
    /// Query or set a parameter on the attached radio.
    At(AtArgs),
    /// Query or set a parameter on another radio in the network.
    RemoteAt(RemoteAtArgs),
    /// List the nodes that answer a network discovery.
    Discover(DiscoverArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format),
        Command::At(args) => at::run(args, format),
        Command::RemoteAt(args) => remote_at::run(args, format),
        Command::Discover(args) => discover::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where the radio is attached.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("link").required(true).args(["port", "tcp"])))]
pub struct LinkArgs {
    /// Serial port the radio is attached to (e.g. /dev/ttyUSB0).
    #[arg(long, short = 'p')]
    pub port: Option<String>,
    /// Serial line speed.
    #[arg(long, short = 'b', default_value_t = 9600)]
    pub baud: u32,
    /// TCP serial bridge instead of a local port (e.g. 192.168.1.20:2000).
    #[arg(long, conflicts_with = "port")]
    pub tcp: Option<String>,
    /// Response timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

/// Parameter value for a set; omit for a query.
#[derive(Args, Debug, Default)]
pub struct ValueArgs {
    /// Value as hex bytes (e.g. 0x1A46, "1a 46", 3).
    #[arg(long, conflicts_with = "text")]
    pub value: Option<String>,
    /// Value as ASCII text (for NI).
    #[arg(long)]
    pub text: Option<String>,
}

impl ValueArgs {
    pub fn bytes(&self) -> CliResult<Option<Vec<u8>>> {
        if let Some(value) = &self.value {
            return parse_hex_value(value).map(Some);
        }
        Ok(self.text.as_ref().map(|text| text.as_bytes().to_vec()))
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Only print these frame types (comma-separated hex, e.g. 0x92,0x95).
    #[arg(long, value_delimiter = ',')]
    pub frame_types: Option<Vec<String>>,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct AtArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Two-letter command (e.g. HV, NI, D0).
    pub command: AtCommand,
    #[command(flatten)]
    pub value: ValueArgs,
    /// Queue the change until AC or WR instead of applying it.
    #[arg(long)]
    pub queued: bool,
}

#[derive(Args, Debug)]
pub struct RemoteAtArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// 64-bit address of the target radio (e.g. 0013A200.4062AC98).
    pub address: Address64,
    /// Two-letter command (e.g. D0).
    pub command: AtCommand,
    #[command(flatten)]
    pub value: ValueArgs,
    /// Leave the change pending on the remote radio.
    #[arg(long)]
    pub no_apply: bool,
}

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// How long to collect answers. Default: the radio's NT setting.
    #[arg(long)]
    pub wait: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open the link named on the command line and start the reader.
pub fn open_radio(link: &LinkArgs) -> CliResult<Radio> {
    let stream = match (&link.port, &link.tcp) {
        (_, Some(addr)) => {
            let stream = TcpStream::connect(addr)
                .map_err(|err| io_error(&format!("connect to {addr} failed"), err))?;
            XbeeStream::from_tcp(stream)
        }
        (Some(port), None) => {
            let port_handle = serialport::new(port, link.baud)
                .timeout(POLL_INTERVAL)
                .open()
                .map_err(|err| serial_error(&format!("open {port} failed"), err))?;
            XbeeStream::from_serial(port_handle)
        }
        (None, None) => return Err(CliError::usage("either --port or --tcp is required")),
    };
    info!(transport = stream.kind(), "link open");

    let config = RadioConfig::default()
        .with_reader_poll_interval(POLL_INTERVAL)
        .with_default_timeout(parse_duration(&link.timeout)?);
    Radio::open(stream, config).map_err(|err| radio_error("radio start failed", err))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

/// Hex digits with optional `0x` prefix and spaces; an odd digit count
/// gets a leading zero.
pub fn parse_hex_value(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CliError::usage(format!("invalid hex value: {input}")));
    }

    let padded = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    padded
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| CliError::usage(format!("invalid hex value: {input}")))
        })
        .collect()
}

/// Parse `0x92`-style frame type codes.
pub fn parse_frame_type(input: &str) -> CliResult<u8> {
    let digits = input
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    u8::from_str_radix(digits, 16)
        .map_err(|_| CliError::usage(format!("invalid frame type: {input}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn parse_hex_value_forms() {
        assert_eq!(parse_hex_value("0x1A46").unwrap(), vec![0x1A, 0x46]);
        assert_eq!(parse_hex_value("1a 46").unwrap(), vec![0x1A, 0x46]);
        assert_eq!(parse_hex_value("3").unwrap(), vec![0x03]);
        assert_eq!(parse_hex_value("FFF").unwrap(), vec![0x0F, 0xFF]);
        assert!(parse_hex_value("0x").is_err());
        assert!(parse_hex_value("zz").is_err());
    }

    #[test]
    fn parse_frame_type_codes() {
        assert_eq!(parse_frame_type("0x92").unwrap(), 0x92);
        assert_eq!(parse_frame_type("95").unwrap(), 0x95);
        assert!(parse_frame_type("0x192").is_err());
    }
}
