use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use pymprims_endpoint::{Direction, Exchange};
use pymprims_wire::Message;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Outcome of one guard check.
#[derive(Debug, Serialize)]
pub struct Check {
    pub subject: String,
    pub safe: bool,
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    channel_id: &'a str,
    message_type: &'a str,
    payload: &'a str,
}

/// Print a single named value, such as an encoded string or a frame URL.
pub fn print_value(label: &str, value: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::Map::new();
            out.insert(label.to_string(), serde_json::Value::from(value));
            println!("{}", serde_json::Value::Object(out));
        }
        OutputFormat::Table => {
            let mut table = new_table(vec![label.to_uppercase()]);
            table.add_row(vec![value.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{label}={value}"),
        OutputFormat::Raw => println!("{value}"),
    }
}

pub fn print_messages(channel_id: &str, messages: &[Message], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for message in messages {
                let out = MessageOutput {
                    channel_id,
                    message_type: &message.message_type,
                    payload: &message.payload,
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["CHANNEL", "TYPE", "PAYLOAD"]);
            for message in messages {
                table.add_row(vec![
                    channel_id.to_string(),
                    message.message_type.clone(),
                    message.payload.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for message in messages {
                println!(
                    "channel={} type={} payload={}",
                    channel_id, message.message_type, message.payload
                );
            }
        }
        OutputFormat::Raw => {
            for message in messages {
                print_raw(message.payload.as_bytes());
                print_raw(b"\n");
            }
        }
    }
}

pub fn print_checks(subject: &str, checks: &[Check], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for check in checks {
                println!(
                    "{}",
                    serde_json::to_string(check).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = new_table(vec![subject.to_uppercase(), "RESULT".to_string()]);
            for check in checks {
                table.add_row(vec![check.subject.clone(), verdict(check.safe).to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for check in checks {
                println!("{subject}={} result={}", check.subject, verdict(check.safe));
            }
        }
        OutputFormat::Raw => {
            for check in checks {
                println!("{}", verdict(check.safe));
            }
        }
    }
}

pub fn print_exchanges(exchanges: &[Exchange], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for exchange in exchanges {
                println!(
                    "{}",
                    serde_json::to_string(exchange).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["AT (ms)", "DIRECTION", "TYPE", "PAYLOAD"]);
            for exchange in exchanges {
                table.add_row(vec![
                    exchange.at_ms.to_string(),
                    direction_name(exchange.direction).to_string(),
                    exchange.message_type.clone(),
                    exchange.payload.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for exchange in exchanges {
                println!(
                    "at={}ms {} type={} payload={}",
                    exchange.at_ms,
                    direction_name(exchange.direction),
                    exchange.message_type,
                    exchange.payload
                );
            }
        }
        OutputFormat::Raw => {
            for exchange in exchanges {
                print_raw(exchange.wire.as_bytes());
                print_raw(b"\n");
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn direction_name(direction: Direction) -> &'static str {
    match direction {
        Direction::ToChild => "parent -> child",
        Direction::ToParent => "child -> parent",
    }
}

fn verdict(safe: bool) -> &'static str {
    if safe {
        "safe"
    } else {
        "unsafe"
    }
}

fn new_table<T: ToString>(header: Vec<T>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(ToString::to_string).collect::<Vec<_>>());
    table
}
