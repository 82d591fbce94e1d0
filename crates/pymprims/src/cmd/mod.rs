use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod check_origin;
pub mod check_url;
pub mod decode;
pub mod encode;
pub mod frame_src;
pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a wire string.
    Encode(EncodeArgs),
    /// Decode wire strings for one channel.
    Decode(DecodeArgs),
    /// Check URLs against the navigation guard.
    CheckUrl(CheckUrlArgs),
    /// Check a sender origin against an origin pattern.
    CheckOrigin(CheckOriginArgs),
    /// Print the frame URL a parent would build.
    FrameSrc(FrameSrcArgs),
    /// Run a parent and child over in-memory documents and print what they exchange.
    Simulate(SimulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::CheckUrl(args) => check_url::run(args, format),
        Command::CheckOrigin(args) => check_origin::run(args, format),
        Command::FrameSrc(args) => frame_src::run(args, format),
        Command::Simulate(args) => simulate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Channel id.
    #[arg(long)]
    pub id: String,
    /// Message type.
    #[arg(long = "type", value_name = "TYPE")]
    pub message_type: String,
    /// Message payload.
    #[arg(long, default_value = "")]
    pub payload: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Channel id to match.
    #[arg(long)]
    pub id: String,
    /// Wire string to decode.
    #[arg(conflicts_with = "stdin", required_unless_present = "stdin")]
    pub wire: Option<String>,
    /// Decode one wire string per stdin line.
    #[arg(long)]
    pub stdin: bool,
}

#[derive(Args, Debug)]
pub struct CheckUrlArgs {
    /// URLs to check.
    #[arg(required = true)]
    pub urls: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CheckOriginArgs {
    /// Origin pattern (`*` accepts any origin).
    #[arg(long, default_value = "*")]
    pub pattern: String,
    /// Sender origin.
    pub origin: String,
}

#[derive(Args, Debug)]
pub struct FrameSrcArgs {
    /// Child document URL.
    pub url: String,
    /// Channel id passed to the child.
    #[arg(long)]
    pub child_id: String,
    /// Container width in pixels.
    #[arg(long, allow_negative_numbers = true)]
    pub width: i64,
    /// Parent document title.
    #[arg(long, default_value = "")]
    pub title: String,
    /// Parent document URL.
    #[arg(long, default_value = "")]
    pub parent_url: String,
    /// Name of the parent URL parameter.
    #[arg(long, default_value = pymprims_wire::DEFAULT_PARENT_URL_PARAM)]
    pub parent_url_param: String,
    /// Leave out the parent title and URL parameters.
    #[arg(long)]
    pub no_optional_params: bool,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Container width in pixels.
    #[arg(long, default_value = "800")]
    pub container_width: f64,
    /// Height of the child's content in pixels.
    #[arg(long, default_value = "400")]
    pub content_height: i64,
    /// Report viewport and frame position to the child while the parent scrolls.
    #[arg(long)]
    pub track_scroll: bool,
    /// Minimum interval between scroll reports in milliseconds.
    #[arg(long, default_value = "100")]
    pub scroll_wait: u64,
    /// Child height polling interval in milliseconds (0 disables polling).
    #[arg(long, default_value = "0")]
    pub polling: u64,
    /// Resize the container to this width after boot (repeatable).
    #[arg(long = "resize", value_name = "WIDTH")]
    pub resizes: Vec<f64>,
    /// Scroll the parent window to this offset after boot (repeatable).
    #[arg(long = "scroll", value_name = "Y")]
    pub scrolls: Vec<f64>,
    /// Milliseconds between scripted steps.
    #[arg(long, default_value = "10")]
    pub step: u64,
    /// Milliseconds to run after the last scripted step.
    #[arg(long, default_value = "1000")]
    pub settle: u64,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
