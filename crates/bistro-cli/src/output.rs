//! Terminal output for the bistro CLI.
//!
//! Results go to stdout, notices that the user must act on go to stderr.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

/// Account fields shown by `whoami`, in display order.
const PROFILE_FIELDS: [&str; 3] = ["name", "email", "role"];

/// How JSON bodies are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStyle {
    /// One line, for piping into other tools.
    Compact,
    Pretty,
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// A notice the user has to act on, such as signing in again.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow().bold(), msg);
}

pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

pub fn json<T: Serialize>(value: &T, style: JsonStyle) -> Result<()> {
    println!("{}", render_json(value, style)?);
    Ok(())
}

/// Print the profile fields the account carries, skipping absent ones.
pub fn profile(account: &Value) {
    for (label, value) in profile_fields(account) {
        field(label, value);
    }
}

/// A response with no body is reported by its status alone.
pub fn empty_response(status: u16) {
    success(&format!("HTTP {}", status));
}

fn render_json<T: Serialize>(value: &T, style: JsonStyle) -> Result<String> {
    let rendered = match style {
        JsonStyle::Compact => serde_json::to_string(value)?,
        JsonStyle::Pretty => serde_json::to_string_pretty(value)?,
    };
    Ok(rendered)
}

fn profile_fields(account: &Value) -> impl Iterator<Item = (&'static str, &str)> {
    PROFILE_FIELDS
        .into_iter()
        .filter_map(|label| Some((label, account.get(label)?.as_str()?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compact_json_is_a_single_line() {
        let body = json!([{ "id": "o1", "total": 12 }]);
        let rendered = render_json(&body, JsonStyle::Compact).unwrap();
        assert_eq!(rendered, r#"[{"id":"o1","total":12}]"#);
        assert!(render_json(&body, JsonStyle::Pretty).unwrap().contains('\n'));
    }

    #[test]
    fn profile_skips_missing_and_non_string_fields() {
        let account = json!({ "email": "owner@example.com", "name": "Ada", "role": 3 });
        let fields: Vec<_> = profile_fields(&account).collect();
        assert_eq!(fields, [("name", "Ada"), ("email", "owner@example.com")]);
    }
}
