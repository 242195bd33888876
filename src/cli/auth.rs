use colored::Colorize;
use serde_json::json;

use crate::credentials::CredentialStore;
use crate::device::DeviceInfo;
use crate::error::NamecardError;
use crate::types::{LoginRequest, RegisterRequest};

use super::output::{is_stdout_tty, print_message, print_user, OutputMode};
use super::session::Session;

pub async fn run_login(
    session: &Session,
    user: &str,
    password: &str,
    is_email: bool,
    mode: OutputMode,
) -> Result<(), NamecardError> {
    let request = LoginRequest {
        email: is_email.then(|| user.to_string()),
        user_name: (!is_email).then(|| user.to_string()),
        password: password.to_string(),
    };
    let roles = session.client.auth().login(&request).await?;
    let message = if roles.is_empty() {
        format!("Logged in as {user} (profile '{}')", session.profile.name)
    } else {
        format!(
            "Logged in as {user} (profile '{}', roles: {})",
            session.profile.name,
            roles.join(", ")
        )
    };
    print_message(
        &message,
        json!({ "profile": session.profile.name, "user": user, "roles": roles }),
        mode,
    );
    Ok(())
}

pub async fn run_register(
    session: &Session,
    request: RegisterRequest,
    mode: OutputMode,
) -> Result<(), NamecardError> {
    let request = request.with_device(&DeviceInfo::detect());
    let body = session.client.auth().register(&request).await?;
    let message = match body.get("message").and_then(|m| m.as_str()) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => format!(
            "Registered {}. Run: namecard login {}",
            request.user_name, request.user_name
        ),
    };
    print_message(&message, body, mode);
    Ok(())
}

pub async fn run_logout(session: &Session, mode: OutputMode) -> Result<(), NamecardError> {
    let was_logged_in = session.store.is_authenticated();
    session.client.auth().logout().await?;
    let message = if was_logged_in {
        format!("Logged out of profile '{}'", session.profile.name)
    } else {
        format!("Profile '{}' has no active session", session.profile.name)
    };
    print_message(
        &message,
        json!({ "profile": session.profile.name, "loggedOut": was_logged_in }),
        mode,
    );
    Ok(())
}

pub async fn run_whoami(session: &Session, mode: OutputMode) -> Result<(), NamecardError> {
    session.require_login()?;
    let user = session.client.users().profile().await?;
    print_user(&user, mode, is_stdout_tty());
    Ok(())
}

/// Report the local session state without touching the network.
pub fn run_status(session: &Session, mode: OutputMode) -> Result<(), NamecardError> {
    let credentials = session.store.get();
    let claims = credentials.as_ref().and_then(|c| c.claims());
    let expires_at = claims.as_ref().and_then(|c| c.expires_at());

    let status = json!({
        "profile": session.profile.name,
        "baseUrl": session.profile.base_url,
        "sessionFile": session.store.path().display().to_string(),
        "loggedIn": credentials.is_some(),
        "subject": claims.as_ref().and_then(|c| c.sub.clone()),
        "roles": claims.as_ref().map(|c| c.roles.clone()).unwrap_or_default(),
        "accessTokenExpiresAt": expires_at.map(|t| t.to_rfc3339()),
        "accessTokenExpired": credentials.as_ref().is_some_and(|c| c.is_expired()),
    });

    if mode == OutputMode::Json {
        print_message("", status, mode);
        return Ok(());
    }

    let is_tty = is_stdout_tty();
    println!("Profile: {}", session.profile.name);
    println!("API: {}", session.profile.base_url);
    println!("Session file: {}", session.store.path().display());
    match credentials {
        None => {
            let state = if is_tty {
                "not logged in".yellow().to_string()
            } else {
                "not logged in".to_string()
            };
            println!("Session: {state}");
        }
        Some(ref creds) => {
            let state = if is_tty {
                "logged in".green().to_string()
            } else {
                "logged in".to_string()
            };
            println!("Session: {state}");
            if let Some(ref c) = claims {
                if !c.roles.is_empty() {
                    println!("Roles: {}", c.roles.join(", "));
                }
            }
            if let Some(at) = expires_at {
                let note = if creds.is_expired() {
                    " (expired, refreshed on next request)"
                } else {
                    ""
                };
                println!("Access token expires: {}{note}", at.to_rfc3339());
            }
        }
    }
    Ok(())
}
