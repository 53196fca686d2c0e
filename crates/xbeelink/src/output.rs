use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use xbeelink_command::{CommandResponse, FrameId, NodeDiscovery, ResponseFrame};
use xbeelink_frame::FrameType;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    frame_type: String,
    frame_type_name: &'static str,
    frame_id: Option<FrameId>,
    timestamp: String,
    response: &'a ResponseFrame,
}

pub fn print_frame(frame: &ResponseFrame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                frame_type: format!("0x{:02X}", frame.frame_type()),
                frame_type_name: frame_type_name(frame.frame_type()),
                frame_id: frame.frame_id(),
                timestamp: now_unix_seconds(),
                response: frame,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "FRAME ID", "DETAIL"])
                .add_row(vec![
                    frame_type_name(frame.frame_type()).to_string(),
                    frame_id_text(frame.frame_id()),
                    detail(frame),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "type=0x{:02X} ({}) id={} {}",
                frame.frame_type(),
                frame_type_name(frame.frame_type()),
                frame_id_text(frame.frame_id()),
                detail(frame)
            );
        }
    }
}

pub fn print_nodes(nodes: &[NodeDiscovery], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(nodes).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ADDRESS64", "ADDRESS16", "IDENTIFIER", "TYPE", "PARENT"]);
            for node in nodes {
                table.add_row(vec![
                    node.address64.to_string(),
                    node.address16.to_string(),
                    node.identifier.clone(),
                    format!("{:?}", node.device_type),
                    node.parent.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for node in nodes {
                println!(
                    "{} {} NI={:?} {:?}",
                    node.address64, node.address16, node.identifier, node.device_type
                );
            }
        }
    }
}

pub fn frame_type_name(code: u8) -> &'static str {
    FrameType::from_code(code).map_or("unknown", FrameType::description)
}

fn frame_id_text(frame_id: Option<FrameId>) -> String {
    frame_id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

/// One-line human summary of a frame.
pub fn detail(frame: &ResponseFrame) -> String {
    match frame {
        ResponseFrame::LocalAt(r) => {
            format!("{} {:?} {}", r.command, r.status, response_text(&r.response))
        }
        ResponseFrame::RemoteAt(r) => format!(
            "{} from {} {:?} {}",
            r.command,
            r.source64,
            r.status,
            response_text(&r.response)
        ),
        ResponseFrame::ModemStatus { status } => format!("{status:?}"),
        ResponseFrame::TransmitStatus(s) => format!(
            "to {} retries={} delivery=0x{:02X} discovery=0x{:02X}",
            s.destination16, s.retry_count, s.delivery_status, s.discovery_status
        ),
        ResponseFrame::Receive(p) => format!(
            "from {} ({}) {} bytes: {}",
            p.source64,
            p.source16,
            p.data.len(),
            hex(&p.data)
        ),
        ResponseFrame::IoSample(s) => {
            let digital: Vec<String> = s
                .digital_pins()
                .filter_map(|pin| s.digital(pin).map(|high| format!("DIO{pin}={}", u8::from(high))))
                .collect();
            let analog: Vec<String> = s
                .analog_samples
                .iter()
                .map(|a| format!("AD{}={}", a.channel, a.value))
                .collect();
            format!("from {} {} {}", s.source64, digital.join(" "), analog.join(" "))
        }
        ResponseFrame::NodeIdentification(n) => format!(
            "{} {} NI={:?} {:?}",
            n.remote64, n.remote16, n.identifier, n.device_type
        ),
        ResponseFrame::Undecoded { data, error, .. } => {
            format!("{error}: {}", hex(data))
        }
    }
}

fn response_text(response: &Option<CommandResponse>) -> String {
    match response {
        None => String::new(),
        Some(CommandResponse::HardwareVersion(v)) => v.to_string(),
        Some(CommandResponse::NetworkAddress(a)) => a.to_string(),
        Some(CommandResponse::NodeIdentifier(ni)) => format!("{ni:?}"),
        Some(CommandResponse::NodeDiscovery(n)) => {
            format!("{} {} NI={:?}", n.address64, n.address16, n.identifier)
        }
        Some(CommandResponse::Raw(bytes)) => hex(bytes),
        Some(other) => serde_json::to_value(other)
            .ok()
            .and_then(|v| v.get("value").map(ToString::to_string))
            .unwrap_or_default(),
    }
}

pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use xbeelink_command::{AtCommand, CommandStatus, HardwareVersion, LocalAtResponse};

    use super::*;

    #[test]
    fn detail_for_local_response() {
        let frame = ResponseFrame::LocalAt(LocalAtResponse {
            frame_id: FrameId(2),
            command: AtCommand::Hv,
            status: CommandStatus::Ok,
            response: Some(CommandResponse::HardwareVersion(HardwareVersion(0x1A46))),
        });
        let text = detail(&frame);
        assert!(text.starts_with("HV Ok 0x1A46"), "{text}");
    }

    #[test]
    fn detail_for_numeric_response_uses_value() {
        let frame = ResponseFrame::LocalAt(LocalAtResponse {
            frame_id: FrameId(2),
            command: AtCommand::Ch,
            status: CommandStatus::Ok,
            response: Some(CommandResponse::Channel(0x14)),
        });
        assert_eq!(detail(&frame), "CH Ok 20");
    }

    #[test]
    fn frame_type_names() {
        assert_eq!(frame_type_name(0x03), "unknown");
        assert_ne!(frame_type_name(0x88), "unknown");
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(hex(&[0x1A, 0x46, 0x00]), "1A 46 00");
        assert_eq!(hex(&[]), "");
    }
}
