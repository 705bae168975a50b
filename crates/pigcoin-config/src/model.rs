use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Stores user-configurable preferences and storage locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for stored data. Defaults to `<home>/data`.
    pub data_dir: Option<PathBuf>,

    #[serde(default = "Config::default_transactions_key")]
    pub transactions_key: String,
    #[serde(default = "Config::default_goals_key")]
    pub goals_key: String,

    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Tracing filter directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "pt-BR".into(),
            currency: "BRL".into(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            data_dir: None,
            transactions_key: Self::default_transactions_key(),
            goals_key: Self::default_goals_key(),
            backup_retention: Self::default_backup_retention(),
            log_filter: None,
        }
    }
}

impl Config {
    /// Setting names accepted by [`Config::set`].
    pub const KEYS: [&'static str; 8] = [
        "locale",
        "currency",
        "color",
        "data_dir",
        "transactions_key",
        "goals_key",
        "backup_retention",
        "log_filter",
    ];

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_transactions_key() -> String {
        "pigcoin_transactions".into()
    }

    pub fn default_goals_key() -> String {
        "pigcoin_goals".into()
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn resolve_data_dir(&self, home: &Path) -> PathBuf {
        match &self.data_dir {
            Some(path) => path.clone(),
            None => home.join("data"),
        }
    }

    /// Current value of a setting, rendered for display.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "locale" => self.locale.clone(),
            "currency" => self.currency.clone(),
            "color" => self.ui_color_enabled.to_string(),
            "data_dir" => self
                .data_dir
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            "transactions_key" => self.transactions_key.clone(),
            "goals_key" => self.goals_key.clone(),
            "backup_retention" => self.backup_retention.to_string(),
            "log_filter" => self.log_filter.clone().unwrap_or_default(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Updates a setting from user input. An empty value clears optional
    /// settings.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let mut next = self.clone();
        match key {
            "locale" => next.locale = required(key, value)?,
            "currency" => next.currency = required(key, value)?.to_ascii_uppercase(),
            "color" => {
                next.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                    "on" | "true" | "yes" => true,
                    "off" | "false" | "no" => false,
                    _ => return Err(invalid(key, "expected on or off")),
                }
            }
            "data_dir" => next.data_dir = optional(value).map(PathBuf::from),
            "transactions_key" => next.transactions_key = required(key, value)?,
            "goals_key" => next.goals_key = required(key, value)?,
            "backup_retention" => {
                next.backup_retention = value
                    .parse()
                    .map_err(|_| invalid(key, "expected a whole number"))?
            }
            "log_filter" => next.log_filter = optional(value),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        if next.transactions_key == next.goals_key {
            return Err(invalid(key, "transactions and goals need distinct keys"));
        }
        *self = next;
        Ok(())
    }

    pub fn currency_symbol(&self) -> &str {
        match self.currency.as_str() {
            "BRL" => "R$",
            "USD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            other => other,
        }
    }

    /// Formats an amount with the currency symbol and locale separators.
    pub fn format_amount(&self, value: f64) -> String {
        let (group, decimal) = if uses_comma_decimal(&self.locale) {
            ('.', ',')
        } else {
            (',', '.')
        };
        let raw = format!("{:.2}", value.abs());
        let (whole, cents) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));
        let mut grouped = String::new();
        for (index, digit) in whole.chars().enumerate() {
            if index > 0 && (whole.len() - index) % 3 == 0 {
                grouped.push(group);
            }
            grouped.push(digit);
        }
        let sign = if value < 0.0 { "-" } else { "" };
        format!(
            "{}{} {}{}{}",
            sign,
            self.currency_symbol(),
            grouped,
            decimal,
            cents
        )
    }
}

fn uses_comma_decimal(locale: &str) -> bool {
    let language = locale
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(language.as_str(), "pt" | "es" | "de" | "fr" | "it" | "nl")
}

fn required(key: &str, value: &str) -> Result<String, ConfigError> {
    if value.is_empty() {
        return Err(invalid(key, "value cannot be empty"));
    }
    Ok(value.to_string())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
