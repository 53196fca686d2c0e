//! Talk to a simulated radio over a socket pair.
//!
//! A thread plays the radio: it answers `HV` and `NI` queries and announces
//! itself with a modem status frame. The client side is a normal [`Radio`].
//!
//! Run with:
//!   cargo run --example fake-radio

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::net::UnixStream;
    use std::thread;
    use std::time::Duration;

    use xbeelink::command::{AtCommand, AtRequest, ResponseFrame};
    use xbeelink::frame::{FrameReader, FrameWriter};
    use xbeelink::radio::{Radio, RadioConfig};
    use xbeelink::transport::XbeeStream;

    let (host, device) = UnixStream::pair()?;
    let device = XbeeStream::from_unix(device);
    let mut reader = FrameReader::new(device.try_clone()?);
    let mut writer = FrameWriter::new(device);

    let simulator = thread::spawn(move || -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Coordinator started.
        writer.send(0x8A, &[0x06])?;
        loop {
            let request = match reader.read_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    eprintln!("[radio] link closed: {e}");
                    return Ok(());
                }
            };
            let frame_id = request.data[0];
            let command = [request.data[1], request.data[2]];
            eprintln!(
                "[radio] {} (frame id {frame_id})",
                String::from_utf8_lossy(&command)
            );

            let mut reply = vec![frame_id, command[0], command[1]];
            match &command {
                b"HV" => reply.extend_from_slice(&[0x00, 0x1A, 0x46]),
                b"NI" => {
                    reply.push(0x00);
                    reply.extend_from_slice(b"SIMULATED");
                }
                _ => reply.push(0x02),
            }
            writer.send(0x88, &reply)?;
        }
    });

    let radio = Radio::open(
        XbeeStream::from_unix(host),
        RadioConfig::default().with_reader_poll_interval(Duration::from_millis(50)),
    )?;

    for command in [AtCommand::Hv, AtCommand::Ni, AtCommand::Ch] {
        let response = radio.call(AtRequest::query(command), Duration::from_secs(2))?;
        match response {
            ResponseFrame::LocalAt(r) => {
                eprintln!("[client] {} -> {:?} {:?}", r.command, r.status, r.response);
            }
            other => eprintln!("[client] unexpected frame: {other:?}"),
        }
    }

    // Everything the radio sent, including the startup announcement.
    while let Some(frame) = radio.try_recv() {
        eprintln!("[client] backlog: {}", summary(&frame));
    }
    eprintln!("[client] stats: {:?}", radio.stats());

    radio.close()?;
    drop(radio);
    let _ = simulator.join();
    Ok(())
}

#[cfg(unix)]
fn summary(frame: &xbeelink::command::ResponseFrame) -> String {
    match frame.frame_id() {
        Some(id) => format!("type 0x{:02X} id {}", frame.frame_type(), id.0),
        None => format!("type 0x{:02X}", frame.frame_type()),
    }
}

#[cfg(not(unix))]
fn main() {
    eprintln!("fake-radio needs Unix socket pairs");
}
