use std::path::PathBuf;
use std::process;

use reelops_lifecycle::GuardError;
use reelops_storage::{ScriptRecord, ScriptStore};

use super::{open_store, print_json, runtime};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_show(data: Option<PathBuf>, id: &str, output: OutputFormat) {
    let rt = runtime(output);
    let store = open_store(&rt, data, output);

    let record = match rt.block_on(store.get(id)) {
        Ok(r) => r,
        Err(e) => {
            report_error(&GuardError::from(e).to_string(), output);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => print_json(&record),
        OutputFormat::Text => print!("{}", render(&record)),
    }
}

/// Key/value text view of a record. Unset optional fields are omitted.
fn render(record: &ScriptRecord) -> String {
    let mut out = String::new();
    let mut line = |key: &str, value: &str| {
        out.push_str(&format!("{:<14}{}\n", format!("{}:", key), value));
    };

    line("id", &record.id);
    line("status", record.status.as_str());
    line("processed", if record.processed { "true" } else { "false" });
    if let Some(user) = &record.user_id {
        line("user_id", user);
    }
    if let Some(script) = &record.script_json {
        line("hook", &script.hook);
        line("script", &script.spoken_script);
    }
    if let Some(caption) = &record.caption {
        line("caption", caption);
    }
    if let Some(tags) = &record.hashtags {
        let tags: Vec<String> = tags.iter().map(|t| format!("#{}", t)).collect();
        line("hashtags", &tags.join(" "));
    }
    if let Some(track) = &record.music_track {
        line("music_track", track);
    }
    if let Some(url) = &record.video_url {
        line("video_url", url);
    }
    if let Some(err) = &record.error_message {
        line("error", err);
    }
    if let Some(posted) = &record.posted_at {
        line("posted_at", posted);
    }
    line("created_at", &record.created_at);
    line("updated_at", &record.updated_at);
    out
}

#[cfg(test)]
mod tests {
    use reelops_storage::ScriptStatus;

    use super::*;

    #[test]
    fn render_skips_unset_fields() {
        let mut record = ScriptRecord::new("abc", ScriptStatus::PendingScript);
        record.caption = Some("Morning routine".into());
        record.hashtags = Some(vec!["fyp".into(), "growth".into()]);
        let text = render(&record);
        assert!(text.contains("id:           abc"));
        assert!(text.contains("status:       Pending Script"));
        assert!(text.contains("hashtags:     #fyp #growth"));
        assert!(!text.contains("video_url"));
    }
}
