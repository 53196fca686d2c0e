use xbeelink_command::RemoteAtRequest;

use crate::cmd::at::response_exit_code;
use crate::cmd::{open_radio, parse_duration, RemoteAtArgs};
use crate::exit::{encode_error, radio_error, CliResult};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: RemoteAtArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.link.timeout)?;
    let mut request = match args.value.bytes()? {
        Some(value) => RemoteAtRequest::set(args.address, args.command, value)
            .map_err(|err| encode_error("invalid value", err))?,
        None => RemoteAtRequest::query(args.address, args.command),
    };
    if args.no_apply {
        request = request.deferred();
    }

    let radio = open_radio(&args.link)?;
    let response = radio.call(request, timeout).map_err(|err| {
        radio_error(&format!("{} on {} failed", args.command, args.address), err)
    })?;

    print_frame(&response, format);
    Ok(response_exit_code(&response))
}
