use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("pymprims {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: pymprims");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", target_triple());
    println!(
        "profile: {}",
        option_env!("PYMPRIMS_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "rustc: {}",
        option_env!("PYMPRIMS_RUSTC_VERSION").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "features: endpoint={}, cli=true",
        cfg!(feature = "endpoint")
    );
    println!(
        "protocol: tag={} delimiter={}",
        pymprims_wire::PROTOCOL_TAG,
        pymprims_wire::DELIMITER
    );

    Ok(SUCCESS)
}

fn target_triple() -> &'static str {
    option_env!("PYMPRIMS_BUILD_TARGET").unwrap_or("unknown")
}
