use std::io::BufRead;

use pymprims_wire::{decode, validate_channel_id};

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, wire_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_messages, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    validate_channel_id(&args.id).map_err(|err| wire_error("decode", err))?;

    if let Some(wire) = args.wire {
        let message = decode(&wire, &args.id).ok_or_else(|| {
            CliError::new(
                DATA_INVALID,
                format!("decode: not a message for channel {:?}", args.id),
            )
        })?;
        print_messages(&args.id, &[message], format);
        return Ok(SUCCESS);
    }

    let stdin = std::io::stdin();
    let mut messages = Vec::new();
    let mut skipped = 0usize;
    for line in stdin.lock().lines() {
        let line = line.map_err(|err| io_error("decode: read stdin", err))?;
        match decode(&line, &args.id) {
            Some(message) => messages.push(message),
            None => skipped += 1,
        }
    }
    tracing::debug!(matched = messages.len(), skipped, "decoded stdin");
    print_messages(&args.id, &messages, format);
    Ok(SUCCESS)
}
