use std::fmt::Write as _;

use colored::Colorize;
use serde::Serialize;

use crate::error::NamecardError;
use crate::types::{Card, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Pretty,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Pretty
        }
    }
}

pub fn is_stdout_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

fn label(text: &str, is_tty: bool) -> String {
    if is_tty {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

fn heading(text: &str, is_tty: bool) -> String {
    if is_tty {
        text.bold().cyan().to_string()
    } else {
        text.to_string()
    }
}

fn field(out: &mut String, name: &str, value: Option<&str>, is_tty: bool) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        let _ = writeln!(out, "  {}: {}", label(name, is_tty), v);
    }
}

pub fn format_card(card: &Card, is_tty: bool) -> String {
    let mut out = String::new();
    let title = format!("{} [{}]", card.id, card.template());
    let _ = writeln!(out, "{}", heading(&title, is_tty));
    if let Some(user) = card.user.as_deref() {
        let owner = user.full_name.as_deref().unwrap_or(&user.user_name);
        field(&mut out, "Owner", Some(owner), is_tty);
    }
    field(&mut out, "Job", card.job.as_deref(), is_tty);
    field(&mut out, "Company", card.company.as_deref(), is_tty);
    field(&mut out, "Phone", card.phone.as_deref(), is_tty);
    field(&mut out, "Address", card.address.as_deref(), is_tty);
    field(&mut out, "Website", card.web_site.as_deref(), is_tty);
    field(&mut out, "Bio", card.bio.as_deref(), is_tty);
    if !card.is_active {
        let inactive = if is_tty {
            "inactive".yellow().to_string()
        } else {
            "inactive".to_string()
        };
        let _ = writeln!(out, "  {}: {}", label("Status", is_tty), inactive);
    }
    for link in card.active_social_links() {
        let _ = writeln!(
            out,
            "  {}: {}",
            label(&link.platform, is_tty),
            if is_tty {
                link.url.underline().to_string()
            } else {
                link.url.clone()
            }
        );
    }
    out
}

pub fn format_user(user: &User, is_tty: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", heading(&user.user_name, is_tty));
    field(&mut out, "Name", user.full_name.as_deref(), is_tty);
    field(&mut out, "Email", Some(&user.email), is_tty);
    if !user.roles.is_empty() {
        field(&mut out, "Roles", Some(&user.roles.join(", ")), is_tty);
    }
    let _ = writeln!(out, "  {}: {}", label("Cards", is_tty), user.id_card.len());
    out
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

pub fn print_cards(cards: &[Card], mode: OutputMode, is_tty: bool) {
    match mode {
        OutputMode::Json => print_json(cards),
        OutputMode::Pretty if cards.is_empty() => println!("No cards."),
        OutputMode::Pretty => {
            for (i, card) in cards.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{}", format_card(card, is_tty));
            }
        }
    }
}

pub fn print_card(card: &Card, mode: OutputMode, is_tty: bool) {
    match mode {
        OutputMode::Json => print_json(card),
        OutputMode::Pretty => print!("{}", format_card(card, is_tty)),
    }
}

pub fn print_user(user: &User, mode: OutputMode, is_tty: bool) {
    match mode {
        OutputMode::Json => print_json(user),
        OutputMode::Pretty => print!("{}", format_user(user, is_tty)),
    }
}

/// Print a short status line, or a JSON object in JSON mode.
pub fn print_message(message: &str, json: serde_json::Value, mode: OutputMode) {
    match mode {
        OutputMode::Json => print_json(&json),
        OutputMode::Pretty => println!("{message}"),
    }
}

pub fn print_error(err: &NamecardError, mode: OutputMode) {
    match mode {
        OutputMode::Json => print_json(&err.to_json()),
        OutputMode::Pretty => {
            let prefix = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
                "Error".red().bold().to_string()
            } else {
                "Error".to_string()
            };
            eprintln!("{prefix}: {err}");
        }
    }
}
