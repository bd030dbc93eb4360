//! Dumps the DevTools traffic recorded in a driver log.
//!
//! Usage:
//!
//! ```text
//! cargo run --example replay_log -- <log-file> [http|websocket] [--debug]
//! ```
//!
//! Prints one JSON object per entry. Stops at end of file or at the first
//! malformed entry, which is reported through the log.

// ============================================================================
// Imports
// ============================================================================

use anyhow::{Context, bail};
use devtools_sync::{DevToolsLogReader, Protocol};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Main
// ============================================================================

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let debug = args.iter().any(|a| a == "--debug");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    init_logging(debug);

    let Some(path) = positional.first() else {
        bail!("usage: replay_log <log-file> [http|websocket] [--debug]");
    };

    let protocol = match positional.get(1).map(|p| p.to_ascii_lowercase()).as_deref() {
        None | Some("websocket") => Protocol::WebSocket,
        Some("http") => Protocol::Http,
        Some(other) => bail!("unknown protocol {other:?}, expected http or websocket"),
    };

    let mut reader =
        DevToolsLogReader::open(path).with_context(|| format!("opening {path}"))?;

    let mut count = 0usize;
    for entry in reader.entries(protocol) {
        println!("{}", serde_json::to_string(&entry)?);
        count += 1;
    }

    tracing::info!(count, lines = reader.line_number(), %protocol, "Done");
    Ok(())
}

// ============================================================================
// Logging
// ============================================================================

fn init_logging(debug: bool) {
    let default = if debug { "devtools_sync=debug" } else { "devtools_sync=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
