//! # Station Configuration
//!
//! One TOML file describes the scale, the printer, the HTTP listener and the
//! diagnostic log. Every key is optional.
//!
//! ```toml
//! [scale]
//! device = "/dev/ttyUSB0"
//! baud_rate = 9600
//! encoding = "utf-8"
//!
//! [printer]
//! device = "${TARAZU_PRINTER}"
//! label_size = "100x80"
//! copies = 1
//!
//! [label]
//! sender_name = "BIZ"
//! qr_base_url = "https://tracking.post.ir/?id="
//!
//! [server]
//! listen = "127.0.0.1:8080"
//!
//! [log]
//! capacity = 50
//! ```
//!
//! `${VAR}` anywhere in the file is replaced by the environment variable
//! before parsing.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use encoding_rs::Encoding;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TarazuError};
use crate::label::encoder::{DEFAULT_BRAND, DEFAULT_WEIGHT_UNIT};
use crate::label::{DEFAULT_QR_BASE_URL, EncodeOptions, LabelField, LabelRecord};
use crate::logbook::DEFAULT_LOG_CAPACITY;
use crate::printer::LabelSize;
use crate::scale::encoding_for;
use crate::transport::BaudRate;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StationConfig {
    pub scale: ScaleConfig,
    pub printer: PrinterSection,
    pub label: LabelDefaults,
    pub server: ServerSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleConfig {
    /// Connect to this device on startup
    pub device: Option<String>,
    pub baud_rate: BaudRate,
    /// WHATWG label of the scale's output charset
    pub encoding: String,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            device: None,
            baud_rate: BaudRate::default(),
            encoding: "utf-8".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrinterSection {
    pub device: Option<String>,
    pub baud_rate: BaudRate,
    /// Charset the TSPL program is encoded in
    pub encoding: String,
    pub label_size: LabelSize,
    pub copies: u32,
    pub brand: String,
    pub weight_unit: String,
}

impl Default for PrinterSection {
    fn default() -> Self {
        Self {
            device: None,
            baud_rate: BaudRate::default(),
            encoding: "utf-8".to_string(),
            label_size: LabelSize::default(),
            copies: 1,
            brand: DEFAULT_BRAND.to_string(),
            weight_unit: DEFAULT_WEIGHT_UNIT.to_string(),
        }
    }
}

impl PrinterSection {
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            copies: self.copies,
            brand: self.brand.clone(),
            weight_unit: self.weight_unit.clone(),
        }
    }
}

/// Values a fresh label starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelDefaults {
    pub qr_base_url: String,
    pub sender_name: String,
    pub sender_city: String,
    pub sender_address: String,
    pub payment_method: String,
}

impl Default for LabelDefaults {
    fn default() -> Self {
        Self {
            qr_base_url: DEFAULT_QR_BASE_URL.to_string(),
            sender_name: String::new(),
            sender_city: String::new(),
            sender_address: String::new(),
            payment_method: String::new(),
        }
    }
}

impl LabelDefaults {
    /// A new record stamped with `now` and prefilled with the sender block.
    pub fn record_at(&self, now: DateTime<Local>) -> LabelRecord {
        let mut record = LabelRecord::new_at(now).with_qr_base_url(self.qr_base_url.clone());
        record.set(LabelField::SenderName, self.sender_name.clone());
        record.set(LabelField::SenderCity, self.sender_city.clone());
        record.set(LabelField::SenderAddress, self.sender_address.clone());
        record.set(LabelField::PaymentMethod, self.payment_method.clone());
        record
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    pub capacity: usize,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl StationConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TarazuError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| TarazuError::Config(format!("TOML parsing error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot: charset labels and counts.
    pub fn validate(&self) -> Result<()> {
        self.scale_encoding()?;
        self.printer_encoding()?;
        if self.printer.copies == 0 {
            return Err(TarazuError::Config("printer.copies must be at least 1".to_string()));
        }
        if self.log.capacity == 0 {
            return Err(TarazuError::Config("log.capacity must be at least 1".to_string()));
        }
        if self.server.listen.trim().is_empty() {
            return Err(TarazuError::Config("server.listen must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn scale_encoding(&self) -> Result<&'static Encoding> {
        encoding_for(&self.scale.encoding)
    }

    pub fn printer_encoding(&self) -> Result<&'static Encoding> {
        encoding_for(&self.printer.encoding)
    }
}

/// Replace `${VAR}` with the variable's value; unset variables are an error.
fn substitute_env_vars(content: &str) -> Result<String> {
    let mut missing = None;
    let replaced = ENV_VAR.replace_all(content, |caps: &regex::Captures| {
        let name = &caps[1];
        std::env::var(name).unwrap_or_else(|_| {
            missing.get_or_insert_with(|| name.to_string());
            String::new()
        })
    });
    match missing {
        Some(name) => Err(TarazuError::Config(format!(
            "Environment variable '{}' is not set",
            name
        ))),
        None => Ok(replaced.into_owned()),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = StationConfig::from_toml_str("").unwrap();
        assert_eq!(config, StationConfig::default());
        assert_eq!(config.server.listen, "127.0.0.1:8080");
        assert_eq!(config.log.capacity, 50);
        assert_eq!(config.printer.label_size, LabelSize::Size100x80);
    }

    #[test]
    fn test_sections_parse() {
        let config = StationConfig::from_toml_str(
            r#"
            [scale]
            device = "/dev/ttyUSB0"
            baud_rate = 4800
            encoding = "windows-1256"

            [printer]
            label_size = "80x100"
            copies = 2

            [label]
            sender_name = "BIZ"
            "#,
        )
        .unwrap();
        assert_eq!(config.scale.device.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(config.scale.baud_rate.get(), 4800);
        assert_eq!(config.scale_encoding().unwrap().name(), "windows-1256");
        assert_eq!(config.printer.label_size, LabelSize::Size80x100);
        assert_eq!(config.printer.encode_options().copies, 2);
        assert_eq!(config.label.sender_name, "BIZ");
    }

    #[test]
    fn test_invalid_values_rejected() {
        for bad in [
            "[scale]\nbaud_rate = 57600",
            "[printer]\nlabel_size = \"50x50\"",
            "[printer]\nencoding = \"klingon\"",
            "[printer]\ncopies = 0",
            "[log]\ncapacity = 0",
            "[scale]\nparity = \"even\"",
        ] {
            assert!(
                matches!(StationConfig::from_toml_str(bad), Err(TarazuError::Config(_))),
                "accepted: {}",
                bad
            );
        }
    }

    #[test]
    fn test_env_substitution() {
        // SAFETY: test-local variable name, no other thread reads it.
        unsafe { std::env::set_var("TARAZU_TEST_PRINTER", "/dev/ttyUSB7") };
        let config =
            StationConfig::from_toml_str("[printer]\ndevice = \"${TARAZU_TEST_PRINTER}\"").unwrap();
        assert_eq!(config.printer.device.as_deref(), Some("/dev/ttyUSB7"));

        let err = StationConfig::from_toml_str("[printer]\ndevice = \"${TARAZU_TEST_UNSET_VAR}\"")
            .unwrap_err();
        assert!(err.to_string().contains("TARAZU_TEST_UNSET_VAR"));
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nlisten = \"0.0.0.0:9000\"").unwrap();
        let config = StationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:9000");

        let err = StationConfig::from_file("/nonexistent/station.toml").unwrap_err();
        assert!(err.to_string().contains("Cannot read"));
    }

    #[test]
    fn test_label_defaults_prefill() {
        let defaults = LabelDefaults {
            sender_name: "BIZ".to_string(),
            qr_base_url: "https://t.example/".to_string(),
            ..Default::default()
        };
        let now = Local.with_ymd_and_hms(2025, 7, 13, 9, 0, 0).unwrap();
        let mut record = defaults.record_at(now);
        assert_eq!(record.sender_name, "BIZ");
        assert_eq!(record.date, "2025-07-13");
        record.set(LabelField::TrackingNumber, "X1");
        assert_eq!(record.qr_data, "https://t.example/X1");
    }
}
