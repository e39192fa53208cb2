//! Offline subcommands that work directly against a JSON data file.

mod list;
mod show;
mod transition;

pub(crate) use list::cmd_list;
pub(crate) use show::cmd_show;
pub(crate) use transition::{cmd_approve, cmd_post};

use std::path::PathBuf;
use std::process;

use reelops_storage::JsonFileScriptStore;
use tokio::runtime::Runtime;

use crate::{report_error, OutputFormat};

/// Current-thread runtime for a single command.
fn runtime(output: OutputFormat) -> Runtime {
    match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            report_error(&format!("failed to start runtime: {}", e), output);
            process::exit(1);
        }
    }
}

/// Open the data file named by `--data` or the config, or exit.
fn open_store(rt: &Runtime, data: Option<PathBuf>, output: OutputFormat) -> JsonFileScriptStore {
    let Some(path) = data else {
        report_error("no data file given: pass --data or set REELOPS_DATA", output);
        process::exit(1);
    };
    match rt.block_on(JsonFileScriptStore::open(&path)) {
        Ok(store) => store,
        Err(e) => {
            report_error(&e.to_string(), output);
            process::exit(1);
        }
    }
}

/// Print a value as pretty JSON on stdout.
fn print_json<T: serde::Serialize>(value: &T) {
    let pretty = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("serialization error: {}", e));
    println!("{}", pretty);
}

