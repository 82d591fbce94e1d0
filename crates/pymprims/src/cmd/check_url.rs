use pymprims_wire::is_safe_url;

use crate::cmd::CheckUrlArgs;
use crate::exit::{CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_checks, Check, OutputFormat};

pub fn run(args: CheckUrlArgs, format: OutputFormat) -> CliResult<i32> {
    let checks: Vec<Check> = args
        .urls
        .into_iter()
        .map(|url| Check {
            safe: is_safe_url(&url),
            subject: url,
        })
        .collect();

    print_checks("url", &checks, format);
    if checks.iter().all(|check| check.safe) {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}
