use pymprims_endpoint::{ChildConfig, Harness, HarnessConfig, ParentConfig};

use crate::cmd::SimulateArgs;
use crate::exit::{endpoint_error, CliResult, SUCCESS};
use crate::output::{print_exchanges, OutputFormat};

pub fn run(args: SimulateArgs, format: OutputFormat) -> CliResult<i32> {
    let config = HarnessConfig {
        container_width: args.container_width,
        content_height: args.content_height,
        parent: ParentConfig {
            track_scroll: Some(args.track_scroll),
            scroll_wait: Some(args.scroll_wait),
            ..ParentConfig::default()
        },
        child: ChildConfig {
            polling: Some(args.polling),
            ..ChildConfig::default()
        },
        ..HarnessConfig::default()
    };
    let mut harness = Harness::new(config).map_err(|err| endpoint_error("simulate", err))?;
    tracing::debug!(src = harness.parent.frame_src(), "child booted");

    for width in args.resizes {
        harness.resize(width);
        harness.advance(args.step);
    }
    for y in args.scrolls {
        harness.scroll(y);
        harness.advance(args.step);
    }
    harness.advance(args.settle);

    // Stop the polling interval so nothing fires after the report.
    harness.child.remove();

    tracing::info!(
        exchanges = harness.exchanges().len(),
        height = harness
            .page
            .frame_attribute(harness.parent.id(), "height")
            .as_deref()
            .unwrap_or("unset"),
        "simulation finished"
    );
    print_exchanges(harness.exchanges(), format);
    Ok(SUCCESS)
}
