//! Option resolution for run settings
//!
//! Each recognized setting resolves from three competing sources with a fixed
//! precedence: environment variable, then explicit option, then declared
//! default. Resolution is pure given an environment snapshot, so tests never
//! have to mutate the process environment.

use std::collections::HashMap;

use crate::error::{HarnessError, Result};

/// Immutable snapshot of the process environment taken once per resolution
pub type EnvSnapshot = HashMap<String, String>;

/// Capture the current process environment
pub fn env_snapshot() -> EnvSnapshot {
    std::env::vars().collect()
}

/// Declared type of a setting's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Symbol-like token (normalized, identity-preserving)
    Symbol,
    /// Free-form string; an empty string counts as unset
    Str,
}

/// A single named, typed, validated configuration slot
///
/// Declared once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Setting {
    /// Human-readable name used in error messages and the config dump
    pub description: &'static str,
    /// Legal value set; None means unrestricted
    pub legal_values: Option<&'static [&'static str]>,
    /// Environment variable that overrides any explicit value
    pub env_var: Option<&'static str>,
    pub default: Option<&'static str>,
    pub value_type: ValueType,
}

impl Setting {
    /// Resolve this setting against an explicit value and an env snapshot
    pub fn resolve(&self, explicit: Option<&str>, env: &EnvSnapshot) -> Result<Option<String>> {
        resolve(
            explicit,
            self.legal_values,
            self.description,
            self.env_var,
            self.default,
            self.value_type,
            env,
        )
    }
}

/// Resolve one configuration value.
///
/// Precedence, highest first: environment variable (when `env_var` is given
/// and set), explicit value, default. An empty string resolving through a
/// `Str` setting is treated as unset and replaced with the default. A
/// non-null `legal_values` set rejects anything outside it with
/// [`HarnessError::InvalidConfiguration`].
pub fn resolve(
    explicit: Option<&str>,
    legal_values: Option<&[&str]>,
    description: &str,
    env_var: Option<&str>,
    default: Option<&str>,
    value_type: ValueType,
    env: &EnvSnapshot,
) -> Result<Option<String>> {
    let mut value = env_var
        .and_then(|name| env.get(name).map(String::as_str))
        .or(explicit)
        .or(default)
        .map(str::to_owned);

    match value_type {
        ValueType::Str => {
            if value.as_deref() == Some("") {
                value = default.map(str::to_owned);
            }
        }
        ValueType::Symbol => {
            // Canonical symbolic form: surrounding whitespace stripped,
            // case preserved.
            if let Some(v) = value.take() {
                value = Some(v.trim().to_owned());
            }
        }
    }

    if let Some(legal) = legal_values {
        let accepted = value.as_deref().is_some_and(|v| legal.contains(&v));
        if !accepted {
            return Err(HarnessError::invalid_configuration(
                description,
                value.unwrap_or_else(|| "<unset>".to_string()),
            ));
        }
    }

    Ok(value)
}
