use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::NamecardError;

use super::env::expand_profile_config;
use super::types::{NamecardConfig, ProfileConfig};

pub const CONFIG_ENV: &str = "NAMECARD_CONFIG";

/// Remove `//` and `/* */` comments so JSONC files parse as plain JSON.
/// Newlines inside comments are kept so serde error positions still line up.
pub fn strip_jsonc_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            match ch {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (ch, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    if c == '\n' {
                        out.push('\n');
                    }
                    prev = c;
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Config files that exist, highest precedence first:
///
/// 1. `--config` flag
/// 2. `NAMECARD_CONFIG`
/// 3. `./config/namecard.json`
/// 4. `~/.namecard/namecard.json`, else `~/.namecard/namecard.jsonc`
pub fn discover_config_files(cli_config: Option<&str>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(path) = cli_config {
        candidates.push(PathBuf::from(path));
    }
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.is_empty() {
            candidates.push(PathBuf::from(env_path));
        }
    }
    candidates.push(PathBuf::from("./config/namecard.json"));
    if let Some(home) = dirs::home_dir() {
        let dir = home.join(".namecard");
        let json = dir.join("namecard.json");
        candidates.push(if json.exists() {
            json
        } else {
            dir.join("namecard.jsonc")
        });
    }

    let mut files = Vec::new();
    for path in candidates {
        if path.exists() && !files.contains(&path) {
            files.push(path);
        }
    }
    files
}

fn load_config_file(path: &Path) -> Result<NamecardConfig, NamecardError> {
    let content = std::fs::read_to_string(path).map_err(|e| NamecardError::ConfigError {
        path: path.to_path_buf(),
        detail: format!("Cannot read file: {e}"),
    })?;

    serde_json::from_str(&strip_jsonc_comments(&content)).map_err(|e| NamecardError::ConfigError {
        path: path.to_path_buf(),
        detail: format!("Invalid JSON: {e}"),
    })
}

/// Add profiles from `source` that `target` does not define yet.
fn merge_profiles(target: &mut HashMap<String, ProfileConfig>, source: HashMap<String, ProfileConfig>) {
    for (name, profile) in source {
        target.entry(name).or_insert(profile);
    }
}

/// Load and merge every discovered config file, then expand environment
/// references. Earlier files win for both profiles and `defaultProfile`.
pub fn load_config(cli_config: Option<&str>) -> Result<NamecardConfig, NamecardError> {
    if let Some(path) = cli_config {
        if !Path::new(path).exists() {
            return Err(NamecardError::ConfigError {
                path: PathBuf::from(path),
                detail: "File does not exist".to_string(),
            });
        }
    }
    load_from_files(&discover_config_files(cli_config))
}

pub fn load_from_files(files: &[PathBuf]) -> Result<NamecardConfig, NamecardError> {
    let mut merged = NamecardConfig::default();
    for path in files {
        let cfg = load_config_file(path)?;
        tracing::debug!(path = %path.display(), profiles = cfg.profiles.len(), "loaded config");
        if merged.default_profile.is_none() {
            merged.default_profile = cfg.default_profile;
        }
        merge_profiles(&mut merged.profiles, cfg.profiles);
    }

    for profile in merged.profiles.values_mut() {
        expand_profile_config(profile)?;
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> serde_json::Value {
        serde_json::from_str(&strip_jsonc_comments(input)).unwrap()
    }

    #[test]
    fn strips_line_and_block_comments() {
        let parsed = parse(
            r#"{
  // line comment
  "a": 1, /* block */ "b": 2
  /*
   * multi-line
   */
  "c": 3 // trailing
}"#,
        );
        assert_eq!(parsed["a"], 1);
        assert_eq!(parsed["b"], 2);
        assert_eq!(parsed["c"], 3);
    }

    #[test]
    fn keeps_slashes_inside_strings() {
        let parsed = parse(r#"{"url": "https://api.example.com/v1", "quoted": "say \"//hi\""}"#);
        assert_eq!(parsed["url"], "https://api.example.com/v1");
        assert_eq!(parsed["quoted"], "say \"//hi\"");
    }

    #[test]
    fn input_without_comments_is_unchanged() {
        let input = r#"{"key": "value"}"#;
        assert_eq!(strip_jsonc_comments(input), input);
    }

    #[test]
    fn earlier_files_win() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.jsonc");
        std::fs::write(
            &first,
            r#"{"profiles": {"prod": {"baseUrl": "https://first.example.com"}}}"#,
        )
        .unwrap();
        std::fs::write(
            &second,
            r#"{
  // lower precedence
  "defaultProfile": "dev",
  "profiles": {
    "prod": {"baseUrl": "https://second.example.com"},
    "dev": {"baseUrl": "https://dev.example.com"}
  }
}"#,
        )
        .unwrap();

        let config = load_from_files(&[first, second]).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("dev"));
        assert_eq!(
            config.profiles["prod"].base_url.as_deref(),
            Some("https://first.example.com")
        );
        assert!(config.profiles.contains_key("dev"));
    }

    #[test]
    fn expands_env_references_after_merge() {
        std::env::set_var("NAMECARD_TEST_LOADER_HOST", "env.example.com");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("namecard.json");
        std::fs::write(
            &path,
            r#"{"profiles": {"p": {"baseUrl": "https://${NAMECARD_TEST_LOADER_HOST}"}}}"#,
        )
        .unwrap();

        let config = load_from_files(&[path]).unwrap();
        assert_eq!(
            config.profiles["p"].base_url.as_deref(),
            Some("https://env.example.com")
        );
        std::env::remove_var("NAMECARD_TEST_LOADER_HOST");
    }

    #[test]
    fn invalid_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not valid json at all").unwrap();

        let err = load_from_files(&[path.clone()]).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn missing_cli_config_is_an_error() {
        let err = load_config(Some("/nonexistent/namecard.json")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn discovered_files_all_exist() {
        for f in discover_config_files(Some("/nonexistent/path/config.json")) {
            assert!(f.exists());
        }
    }
}
