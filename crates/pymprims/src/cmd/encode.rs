use pymprims_wire::try_encode;

use crate::cmd::EncodeArgs;
use crate::exit::{wire_error, CliResult, SUCCESS};
use crate::output::{print_value, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = try_encode(&args.id, &args.message_type, &args.payload)
        .map_err(|err| wire_error("encode", err))?;
    print_value("wire", &wire, format);
    Ok(SUCCESS)
}
