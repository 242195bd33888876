use std::collections::HashMap;

use crate::error::NamecardError;

use super::types::ProfileConfig;

/// Expand environment variable references in a string.
///
/// Supported syntaxes:
/// - `${VAR}` - replaced with env var value; error if unset
/// - `${VAR:-fallback}` - replaced with env var value, or fallback if unset or empty
/// - `$env:VAR` - same as `${VAR}`
pub fn expand_env_vars(input: &str) -> Result<String, NamecardError> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        if chars.peek() == Some(&'{') {
            chars.next();
            let mut var_expr = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_expr.push(c);
            }
            if !found_close {
                return Err(env_error(&format!(
                    "Unclosed variable reference: ${{{var_expr}"
                )));
            }

            if let Some((var_name, fallback)) = var_expr.split_once(":-") {
                match std::env::var(var_name) {
                    Ok(val) if !val.is_empty() => result.push_str(&val),
                    _ => result.push_str(fallback),
                }
            } else {
                result.push_str(&lookup(&var_expr)?);
            }
            continue;
        }

        let rest: String = chars.clone().take(4).collect();
        if rest == "env:" {
            for _ in 0..4 {
                chars.next();
            }
            let mut var_name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    var_name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            if var_name.is_empty() {
                return Err(env_error("Empty variable name in $env: reference"));
            }
            result.push_str(&lookup(&var_name)?);
            continue;
        }

        // Not a recognized pattern, output the '$' literally
        result.push('$');
    }

    Ok(result)
}

/// Expand environment variables in the string fields of a profile.
pub fn expand_profile_config(config: &mut ProfileConfig) -> Result<(), NamecardError> {
    if let Some(ref mut url) = config.base_url {
        *url = expand_env_vars(url)?;
    }
    if let Some(ref mut path) = config.refresh_path {
        *path = expand_env_vars(path)?;
    }
    if let Some(ref mut file) = config.session_file {
        *file = expand_env_vars(file)?;
    }
    let expanded_headers: HashMap<String, String> = config
        .headers
        .iter()
        .map(|(k, v)| Ok((k.clone(), expand_env_vars(v)?)))
        .collect::<Result<_, NamecardError>>()?;
    config.headers = expanded_headers;
    Ok(())
}

fn lookup(var_name: &str) -> Result<String, NamecardError> {
    std::env::var(var_name)
        .map_err(|_| env_error(&format!("Environment variable '{var_name}' is not set")))
}

fn env_error(detail: &str) -> NamecardError {
    NamecardError::ConfigError {
        path: std::path::PathBuf::from("<env>"),
        detail: detail.to_string(),
    }
}
