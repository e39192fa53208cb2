use std::path::PathBuf;
use std::process;

use reelops_storage::{ScriptQuery, ScriptStatus, ScriptStore};

use super::{open_store, print_json, runtime};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_list(
    data: Option<PathBuf>,
    status: Option<ScriptStatus>,
    limit: Option<usize>,
    offset: Option<usize>,
    output: OutputFormat,
) {
    let rt = runtime(output);
    let store = open_store(&rt, data, output);

    let mut query = ScriptQuery {
        status,
        ..ScriptQuery::default()
    };
    if let Some(limit) = limit {
        query.limit = limit;
    }
    if let Some(offset) = offset {
        query.offset = offset;
    }

    let page = match rt.block_on(store.list(&query)) {
        Ok(p) => p,
        Err(e) => {
            report_error(&e.to_string(), output);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => print_json(&page),
        OutputFormat::Text => {
            for record in &page.scripts {
                println!(
                    "{:<24} {:<22} processed={:<5} {}",
                    record.id, record.status, record.processed, record.created_at
                );
            }
            println!(
                "{} of {} scripts (offset {}, limit {})",
                page.scripts.len(),
                page.total,
                page.offset,
                page.limit
            );
        }
    }
}
