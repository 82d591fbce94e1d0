use pymprims_wire::{build_frame_src, validate_channel_id, FrameSrc, ParentParams};

use crate::cmd::FrameSrcArgs;
use crate::exit::{wire_error, CliResult, SUCCESS};
use crate::output::{print_value, OutputFormat};

pub fn run(args: FrameSrcArgs, format: OutputFormat) -> CliResult<i32> {
    validate_channel_id(&args.child_id).map_err(|err| wire_error("frame-src", err))?;

    let parent = (!args.no_optional_params).then(|| ParentParams {
        title: args.title,
        url_param: args.parent_url_param,
        url_value: args.parent_url,
    });
    let src = build_frame_src(&FrameSrc {
        base_url: args.url,
        initial_width: args.width,
        child_id: args.child_id,
        parent,
    });

    print_value("src", &src, format);
    Ok(SUCCESS)
}
