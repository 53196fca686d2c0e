mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "xbeelink", version, about = "XBee API-mode radio CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use xbeelink_command::{Address64, AtCommand};

    use super::*;

    #[test]
    fn parses_at_query() {
        let cli = Cli::try_parse_from(["xbeelink", "at", "--port", "/dev/ttyUSB0", "HV"])
            .expect("at args should parse");

        match cli.command {
            Command::At(args) => {
                assert_eq!(args.command, AtCommand::Hv);
                assert_eq!(args.link.port.as_deref(), Some("/dev/ttyUSB0"));
                assert_eq!(args.link.baud, 9600);
                assert!(args.value.value.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_value_args() {
        let err = Cli::try_parse_from([
            "xbeelink", "at", "--tcp", "127.0.0.1:2000", "NI", "--value", "41", "--text", "A",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn requires_a_link() {
        let err = Cli::try_parse_from(["xbeelink", "at", "HV"]).expect_err("link is required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_port_and_tcp_together() {
        let err = Cli::try_parse_from([
            "xbeelink", "listen", "--port", "/dev/ttyUSB0", "--tcp", "127.0.0.1:2000",
        ])
        .expect_err("port and tcp conflict");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_remote_at_with_address() {
        let cli = Cli::try_parse_from([
            "xbeelink",
            "remote-at",
            "-p",
            "/dev/ttyUSB0",
            "0013A200.4055730D",
            "D0",
            "--value",
            "5",
            "--no-apply",
        ])
        .expect("remote-at args should parse");

        match cli.command {
            Command::RemoteAt(args) => {
                assert_eq!(args.address, Address64(0x0013_A200_4055_730D));
                assert_eq!(args.command, AtCommand::D0);
                assert!(args.no_apply);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_at_command() {
        let err = Cli::try_parse_from(["xbeelink", "at", "-p", "/dev/ttyUSB0", "QQ"])
            .expect_err("unknown command should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_version_without_link() {
        let cli = Cli::try_parse_from(["xbeelink", "version", "--extended"])
            .expect("version args should parse");
        assert!(matches!(cli.command, Command::Version(args) if args.extended));
    }
}
