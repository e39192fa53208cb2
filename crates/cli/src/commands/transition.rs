use std::path::PathBuf;
use std::process;

use reelops_lifecycle::{GuardError, Operation, TransitionGuard, WebhookNotifier};

use super::{open_store, print_json, runtime};
use crate::config::ReelopsConfig;
use crate::OutputFormat;

pub(crate) fn cmd_approve(
    config: &ReelopsConfig,
    data: Option<PathBuf>,
    id: &str,
    actor: &str,
    output: OutputFormat,
) {
    run(config, data, id, actor, Operation::Approve, output);
}

pub(crate) fn cmd_post(
    config: &ReelopsConfig,
    data: Option<PathBuf>,
    id: &str,
    actor: &str,
    output: OutputFormat,
) {
    run(config, data, id, actor, Operation::PostVideo, output);
}

fn run(
    config: &ReelopsConfig,
    data: Option<PathBuf>,
    id: &str,
    actor: &str,
    operation: Operation,
    output: OutputFormat,
) {
    let rt = runtime(output);
    let store = open_store(&rt, data, output);
    let notifier = WebhookNotifier::new(config.webhook_config());
    let guard = TransitionGuard::new(store, notifier).with_tenant(config.tenant_id.clone());

    let result = rt.block_on(async {
        match operation {
            Operation::Approve => guard.approve(id, actor).await,
            Operation::PostVideo => guard.post_video(id, actor).await,
        }
    });

    let outcome = match result {
        Ok(o) => o,
        Err(e) => {
            report_guard_error(&e, output);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => print_json(&outcome),
        OutputFormat::Text => match operation {
            Operation::Approve => {
                println!("approved {}: status is now \"{}\"", outcome.script_id, outcome.status)
            }
            Operation::PostVideo => println!("posting initiated for {}", outcome.script_id),
        },
    }
}

fn report_guard_error(err: &GuardError, output: OutputFormat) {
    eprintln!("{}", render_guard_error(err, output));
}

fn render_guard_error(err: &GuardError, output: OutputFormat) -> String {
    match output {
        OutputFormat::Json => {
            let mut body = serde_json::json!({ "error": err.to_string(), "code": err.code() });
            if let GuardError::NotifyFailed { reverted, .. } = err {
                body["reverted"] = serde_json::json!(reverted);
            }
            body.to_string()
        }
        OutputFormat::Text => {
            let mut text = format!("error: {}", err);
            if matches!(err, GuardError::NotifyFailed { reverted: false, .. }) {
                text.push_str(
                    "\nwarning: the revert also failed; the record needs manual attention",
                );
            }
            text
        }
    }
}
