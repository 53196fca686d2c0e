use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use xbeelink_command::{
    AtCommand, AtRequest, CommandResponse, FrameId, LocalAtResponse, NodeDiscovery, Request,
    ResponseFrame,
};
use xbeelink_radio::Radio;

use crate::cmd::{open_radio, parse_duration, DiscoverArgs};
use crate::exit::{radio_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{detail, print_nodes, OutputFormat};

pub fn run(args: DiscoverArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.link.timeout)?;
    let radio = open_radio(&args.link)?;

    let wait = match &args.wait {
        Some(wait) => parse_duration(wait)?,
        None => discovery_timeout(&radio, timeout)?,
    };
    info!(wait_ms = wait.as_millis() as u64, "discovering nodes");

    // Subscribe first so no answer slips past.
    let frames = radio.subscribe();
    let frame_id = radio.next_frame_id();
    let request = Request::from(AtRequest::query(AtCommand::Nd).with_frame_id(frame_id));
    radio
        .send(&request)
        .map_err(|err| radio_error("ND failed", err))?;

    let nodes = collect_nodes(&frames, frame_id, wait);
    info!(count = nodes.len(), "discovery finished");
    if nodes.is_empty() {
        warn!("no nodes answered; raise NT if nodes are missing");
    }

    print_nodes(&nodes, format);
    Ok(SUCCESS)
}

/// The radio's own NT setting.
fn discovery_timeout(radio: &Radio, timeout: Duration) -> CliResult<Duration> {
    let response = radio
        .call(AtRequest::query(AtCommand::Nt), timeout)
        .map_err(|err| radio_error("NT query failed", err))?;
    match response {
        ResponseFrame::LocalAt(LocalAtResponse {
            response: Some(CommandResponse::DiscoveryTimeout(nt)),
            ..
        }) => Ok(nt),
        other => Err(CliError::new(
            DATA_INVALID,
            format!("unexpected NT response: {}", detail(&other)),
        )),
    }
}

/// ND answers for `frame_id` until `wait` runs out or the link closes.
fn collect_nodes(
    frames: &Receiver<ResponseFrame>,
    frame_id: FrameId,
    wait: Duration,
) -> Vec<NodeDiscovery> {
    let deadline = Instant::now().checked_add(wait);
    let mut nodes = Vec::new();
    loop {
        let next = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return nodes;
                }
                frames.recv_timeout(remaining).map_err(drop)
            }
            None => frames.recv().map_err(drop),
        };
        match next {
            Ok(ResponseFrame::LocalAt(r)) if r.frame_id == frame_id => {
                if let Some(CommandResponse::NodeDiscovery(node)) = r.response {
                    nodes.push(node);
                }
            }
            Ok(_) => {}
            Err(_) => return nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use xbeelink_command::{Address16, Address64, CommandStatus, DeviceType};

    use super::*;

    fn nd_answer(frame_id: u8, identifier: &str) -> ResponseFrame {
        ResponseFrame::LocalAt(LocalAtResponse {
            frame_id: FrameId(frame_id),
            command: AtCommand::Nd,
            status: CommandStatus::Ok,
            response: Some(CommandResponse::NodeDiscovery(NodeDiscovery {
                address16: Address16(0x4634),
                address64: Address64(0x0013_A200_402D_52DD),
                identifier: identifier.to_string(),
                parent: Address16::UNKNOWN,
                device_type: DeviceType::Router,
                status: 0,
                profile_id: 0xC105,
                manufacturer_id: 0x101E,
            })),
        })
    }

    #[test]
    fn collects_only_matching_answers() {
        let (tx, rx) = mpsc::channel();
        tx.send(nd_answer(7, "PROBE")).unwrap();
        tx.send(nd_answer(9, "OTHER")).unwrap();
        tx.send(nd_answer(7, "HVAC-TRANE")).unwrap();
        drop(tx);

        let nodes = collect_nodes(&rx, FrameId(7), Duration::from_secs(5));
        let names: Vec<_> = nodes.iter().map(|n| n.identifier.as_str()).collect();
        assert_eq!(names, ["PROBE", "HVAC-TRANE"]);
    }

    #[test]
    fn stops_at_deadline() {
        let (tx, rx) = mpsc::channel();
        tx.send(nd_answer(7, "PROBE")).unwrap();

        let start = Instant::now();
        let nodes = collect_nodes(&rx, FrameId(7), Duration::from_millis(50));
        assert_eq!(nodes.len(), 1);
        assert!(start.elapsed() >= Duration::from_millis(50));
        drop(tx);
    }

    #[test]
    fn unbounded_wait_ends_when_link_closes() {
        let (tx, rx) = mpsc::channel();
        tx.send(nd_answer(7, "PROBE")).unwrap();
        drop(tx);

        let nodes = collect_nodes(&rx, FrameId(7), Duration::MAX);
        assert_eq!(nodes.len(), 1);
    }
}
