//! Discover the nodes in range of a radio on a serial port.
//!
//! Reads the radio's discovery timeout (`NT`), sends `ND`, and prints each
//! node that answers before the timeout runs out.
//!
//! Run with:
//!   cargo run --example node-discover --features serial -- /dev/ttyUSB0 9600

use std::time::Duration;

use xbeelink::command::{
    AtCommand, AtRequest, CommandResponse, LocalAtResponse, Request, ResponseFrame,
};
use xbeelink::radio::{Radio, RadioConfig};
use xbeelink::transport::XbeeStream;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let port = args.next().ok_or("usage: node-discover <port> [baud]")?;
    let baud: u32 = match args.next() {
        Some(baud) => baud.parse()?,
        None => 9600,
    };

    let serial = serialport::new(&port, baud)
        .timeout(Duration::from_millis(100))
        .open()?;
    let radio = Radio::open(XbeeStream::from_serial(serial), RadioConfig::default())?;

    let wait = match radio.call(AtRequest::query(AtCommand::Nt), Duration::from_secs(5))? {
        ResponseFrame::LocalAt(LocalAtResponse {
            response: Some(CommandResponse::DiscoveryTimeout(nt)),
            ..
        }) => nt,
        _ => Duration::from_secs(6),
    };
    eprintln!("Discovering for {wait:?} on {port}");

    let frame_id = radio.next_frame_id();
    radio.send(&Request::from(
        AtRequest::query(AtCommand::Nd).with_frame_id(frame_id),
    ))?;

    let answers = radio.collect(wait, |_| false);
    let mut found = 0;
    for frame in answers {
        if let ResponseFrame::LocalAt(LocalAtResponse {
            frame_id: id,
            response: Some(CommandResponse::NodeDiscovery(node)),
            ..
        }) = frame
        {
            if id == frame_id {
                found += 1;
                println!(
                    "{} {} {:?} \"{}\"",
                    node.address64, node.address16, node.device_type, node.identifier
                );
            }
        }
    }
    eprintln!("{found} node(s) answered");

    radio.close()?;
    Ok(())
}
