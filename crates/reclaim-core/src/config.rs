//! Helpers for reading service configuration from environment variables.
//!
//! Each service defines its own config struct with a `from_env()` constructor
//! built from these helpers, so a missing or malformed variable surfaces as an
//! error naming the variable instead of a panic deep inside startup.

use std::str::FromStr;

use anyhow::{Context as _, anyhow};

/// Read a required variable.
pub fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}

/// Read an optional variable. Empty values count as unset.
pub fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read and parse a variable, falling back to `default` when it is unset.
pub fn parse_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid value for {name}: {e}")),
        None => Ok(default),
    }
}

/// Read a boolean flag. Accepts `1/0`, `true/false`, `yes/no`, `on/off`.
pub fn flag(name: &str) -> anyhow::Result<bool> {
    let Some(raw) = optional(name) else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("invalid boolean for {name}: {other}")),
    }
}
