use std::collections::HashMap;
use std::path::PathBuf;

use colored::Colorize;

use crate::config::loader::{discover_config_files, load_config, strip_jsonc_comments};
use crate::config::{NamecardConfig, Profile, ProfileConfig};
use crate::error::NamecardError;

use super::output::{is_stdout_tty, OutputMode};

/// Printed in place of header values, which often carry API keys.
const REDACTED: &str = "<redacted>";

/// A merged profile together with the file that defined it.
struct AnnotatedProfile {
    name: String,
    config: ProfileConfig,
    source: PathBuf,
    is_default: bool,
}

/// Walk the discovered files in precedence order and record, for each
/// profile, the first file it appeared in. Values come from the merged,
/// env-expanded config.
fn load_annotated(
    cli_config: Option<&str>,
) -> Result<(NamecardConfig, Vec<AnnotatedProfile>), NamecardError> {
    let merged = load_config(cli_config)?;

    let mut sources: HashMap<String, PathBuf> = HashMap::new();
    for path in discover_config_files(cli_config) {
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        let Ok(cfg) = serde_json::from_str::<NamecardConfig>(&strip_jsonc_comments(&content))
        else {
            continue;
        };
        for name in cfg.profiles.keys() {
            sources.entry(name.clone()).or_insert_with(|| path.clone());
        }
    }

    let default_name = merged.profile_name(None).to_string();
    let mut entries: Vec<AnnotatedProfile> = merged
        .profiles
        .iter()
        .map(|(name, config)| AnnotatedProfile {
            name: name.clone(),
            config: config.clone(),
            source: sources.get(name).cloned().unwrap_or_default(),
            is_default: *name == default_name,
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok((merged, entries))
}

pub fn run_config_show(cli_config: Option<&str>, mode: OutputMode) -> Result<(), NamecardError> {
    let (merged, entries) = load_annotated(cli_config)?;

    if mode == OutputMode::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&redact_headers(merged)).unwrap_or_default()
        );
        return Ok(());
    }

    if entries.is_empty() {
        println!("No profiles configured.");
        if let Ok(url) = std::env::var("NAMECARD_BASE_URL") {
            println!("Ad-hoc profile from NAMECARD_BASE_URL: {url}");
        }
        return Ok(());
    }

    let is_tty = is_stdout_tty();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", format_entry(entry, is_tty));
    }
    Ok(())
}

fn redact_headers(mut config: NamecardConfig) -> NamecardConfig {
    for profile in config.profiles.values_mut() {
        for value in profile.headers.values_mut() {
            *value = REDACTED.to_string();
        }
    }
    config
}

fn format_entry(entry: &AnnotatedProfile, is_tty: bool) -> String {
    let label = |text: &str| {
        if is_tty {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    };
    let mut title = if is_tty {
        entry.name.bold().cyan().to_string()
    } else {
        entry.name.clone()
    };
    if entry.is_default {
        title.push_str(" (default)");
    }

    let mut lines = vec![title];
    match Profile::from_config(&entry.name, &entry.config) {
        Ok(profile) => {
            lines.push(format!("  {}: {}", label("URL"), profile.base_url));
            lines.push(format!("  {}: {}", label("Refresh"), profile.refresh_path));
            lines.push(format!(
                "  {}: {}ms",
                label("Refresh timeout"),
                profile.refresh_timeout.as_millis()
            ));
            if let Some(scheme) = profile.auth_scheme {
                lines.push(format!("  {}: {}", label("Auth scheme"), scheme));
            }
            if profile.allow_http {
                lines.push(format!("  {}: allowed", label("Cleartext HTTP")));
            }
            if !profile.headers.is_empty() {
                let mut names: Vec<&String> = profile.headers.keys().collect();
                names.sort();
                let names: Vec<&str> = names.into_iter().map(String::as_str).collect();
                lines.push(format!("  {}: {}", label("Headers"), names.join(", ")));
            }
            lines.push(format!(
                "  {}: {}",
                label("Session"),
                profile.session_file.display()
            ));
        }
        Err(e) => lines.push(format!("  {}: {e}", label("Invalid"))),
    }
    lines.push(format!("  {}: {}", label("Source"), entry.source.display()));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
