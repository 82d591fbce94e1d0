use pymprims_host::MessageData;
use pymprims_wire::{is_safe_message, OriginPattern};

use crate::cmd::CheckOriginArgs;
use crate::exit::{wire_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_checks, Check, OutputFormat};

pub fn run(args: CheckOriginArgs, format: OutputFormat) -> CliResult<i32> {
    let pattern =
        OriginPattern::new(&args.pattern).map_err(|err| wire_error("check-origin", err))?;
    let data = MessageData::Text(String::new());
    let safe = is_safe_message(&args.origin, &pattern, &data);

    print_checks(
        "origin",
        &[Check {
            subject: args.origin,
            safe,
        }],
        format,
    );
    Ok(if safe { SUCCESS } else { DATA_INVALID })
}
