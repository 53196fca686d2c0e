use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cmd::{open_radio, parse_frame_type, ListenArgs};
use crate::exit::{CliError, CliResult, SUCCESS, TRANSPORT_ERROR};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let frame_types = args
        .frame_types
        .as_ref()
        .map(|types| {
            types
                .iter()
                .map(|t| parse_frame_type(t))
                .collect::<CliResult<Vec<u8>>>()
        })
        .transpose()?;

    let radio = open_radio(&args.link)?;
    let frames = radio.subscribe();

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        let frame = match frames.recv_timeout(Duration::from_millis(200)) {
            Ok(frame) => frame,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                return Err(CliError::new(TRANSPORT_ERROR, "link closed"));
            }
        };

        if let Some(types) = &frame_types {
            if !types.contains(&frame.frame_type()) {
                continue;
            }
        }

        print_frame(&frame, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    let stats = radio.stats();
    info!(
        received = stats.frames_received,
        checksum_errors = stats.checksum_errors,
        decode_errors = stats.decode_errors,
        skipped_bytes = stats.skipped_bytes,
        "listen finished"
    );
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
