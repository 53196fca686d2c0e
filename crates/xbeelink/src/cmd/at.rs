use xbeelink_command::{AtRequest, ResponseFrame};

use crate::cmd::{open_radio, parse_duration, AtArgs};
use crate::exit::{encode_error, radio_error, CliResult, DATA_INVALID, FAILURE, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: AtArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.link.timeout)?;
    let mut request = match args.value.bytes()? {
        Some(value) => AtRequest::set(args.command, value)
            .map_err(|err| encode_error("invalid value", err))?,
        None => AtRequest::query(args.command),
    };
    if args.queued {
        request = request.queued();
    }

    let radio = open_radio(&args.link)?;
    let response = radio
        .call(request, timeout)
        .map_err(|err| radio_error(&format!("{} failed", args.command), err))?;

    print_frame(&response, format);
    Ok(response_exit_code(&response))
}

/// Non-OK command status exits 1; a response that could not be decoded
/// exits 60.
pub fn response_exit_code(response: &ResponseFrame) -> i32 {
    match response {
        ResponseFrame::LocalAt(r) if !r.status.is_ok() => FAILURE,
        ResponseFrame::RemoteAt(r) if !r.status.is_ok() => FAILURE,
        ResponseFrame::Undecoded { .. } => DATA_INVALID,
        _ => SUCCESS,
    }
}
