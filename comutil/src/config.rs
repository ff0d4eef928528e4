//! Configuration for the conversion layer
//!
//! Supports loading configuration from a TOML file.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::code_page::CodePage;
use crate::codec::{Backend, MAX_INPUT_LEN};
use crate::context::{CodecContext, ErrorPolicy};
use crate::error::{ComutilError, Result};
use crate::log_sink::LogSink;

/// Top-level configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// String codec settings
    #[serde(default)]
    pub codec: CodecConfig,

    /// Diagnostic log file settings
    #[serde(default)]
    pub log_sink: LogSinkConfig,

    /// Tracing settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// String codec configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CodecConfig {
    /// Code page number (default: 0, the active ANSI code page)
    #[serde(default)]
    pub code_page: CodePage,

    /// Maximum input length in bytes or code units (default: INT_MAX)
    #[serde(default = "default_max_len")]
    pub max_len: usize,

    /// Degrade conversion failures to empty strings (default: false)
    #[serde(default)]
    pub compatibility_mode: bool,

    /// Transcoding backend, "portable" or "native" (default: portable)
    #[serde(default = "default_backend")]
    pub backend: String,
}

/// Diagnostic log file configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LogSinkConfig {
    /// File to open at startup (default: none)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Tracing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level filter (default: "comutil=info")
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_max_len() -> usize {
    MAX_INPUT_LEN
}

fn default_backend() -> String {
    "portable".to_string()
}

fn default_log_level() -> String {
    "comutil=info".to_string()
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            code_page: CodePage::default(),
            max_len: default_max_len(),
            compatibility_mode: false,
            backend: default_backend(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ComutilError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ComutilError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Install the tracing subscriber using `logging.level`
    pub fn init_tracing(&self) {
        crate::init_tracing(&self.logging.level);
    }

    /// Error policy selected by `compatibility_mode`
    pub fn error_policy(&self) -> ErrorPolicy {
        if self.codec.compatibility_mode {
            ErrorPolicy::Degrade
        } else {
            ErrorPolicy::Strict
        }
    }

    /// Transcoding backend named by `backend`
    ///
    /// "native" falls back to the portable backend off Windows.
    pub fn backend(&self) -> Result<Backend> {
        match self.codec.backend.to_ascii_lowercase().as_str() {
            "portable" => Ok(Backend::Portable),
            #[cfg(windows)]
            "native" => Ok(Backend::Native),
            #[cfg(not(windows))]
            "native" => {
                tracing::warn!("Native backend is only available on Windows, using portable");
                Ok(Backend::Portable)
            }
            other => Err(ComutilError::Config {
                path: "codec.backend".to_string(),
                message: format!("unknown backend '{}'", other),
            }),
        }
    }

    /// Build the codec context for a worker
    pub fn codec_context(&self) -> Result<CodecContext> {
        Ok(CodecContext::new(self.codec.code_page)
            .with_max_len(self.codec.max_len)
            .with_policy(self.error_policy())
            .with_backend(self.backend()?))
    }

    /// Open the configured log file on `sink`, if any
    ///
    /// Returns whether a file was opened.
    pub fn open_log_sink(&self, sink: &LogSink) -> Result<bool> {
        match &self.log_sink.path {
            Some(path) => sink.open(path).map(|()| true),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.codec.code_page, CodePage::ACP);
        assert_eq!(config.codec.max_len, MAX_INPUT_LEN);
        assert!(!config.codec.compatibility_mode);
        assert_eq!(config.codec.backend, "portable");
        assert!(config.log_sink.path.is_none());
        assert_eq!(config.logging.level, "comutil=info");
        assert_eq!(config.error_policy(), ErrorPolicy::Strict);
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [codec]
            code_page = 1252
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.codec.code_page, CodePage::WINDOWS_1252);
        assert_eq!(config.codec.max_len, MAX_INPUT_LEN); // default
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [codec]
            code_page = 65001
            max_len = 4096
            compatibility_mode = true
            backend = "portable"

            [log_sink]
            path = "C:\\Temp\\bridge.log"

            [logging]
            level = "debug"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.codec.code_page, CodePage::UTF8);
        assert_eq!(config.codec.max_len, 4096);
        assert!(config.codec.compatibility_mode);
        assert_eq!(
            config.log_sink.path,
            Some(PathBuf::from(r"C:\Temp\bridge.log"))
        );
        assert_eq!(config.logging.level, "debug");

        let ctx = config.codec_context().unwrap();
        assert_eq!(ctx.code_page(), CodePage::UTF8);
        assert_eq!(ctx.max_len(), 4096);
        assert_eq!(ctx.policy(), ErrorPolicy::Degrade);
        assert_eq!(ctx.backend(), Backend::Portable);
    }

    #[test]
    fn test_unknown_backend() {
        let toml = r#"
            [codec]
            backend = "iconv"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(config.codec_context(), Err(ComutilError::Config { .. })));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.codec.code_page, CodePage::ACP);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[codec]\ncode_page = \"not a number\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ComutilError::Config { .. })));
    }

    #[test]
    fn test_init_tracing_from_config() {
        let config: Config = toml::from_str("[logging]\nlevel = \"comutil=debug\"\n").unwrap();
        assert_eq!(config.logging.level, "comutil=debug");
        // a second install is ignored rather than panicking
        config.init_tracing();
        config.init_tracing();
        tracing::debug!("tracing installed from config");
    }

    #[test]
    fn test_open_log_sink() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LogSink::new();

        assert!(!Config::default().open_log_sink(&sink).unwrap());
        assert!(!sink.is_open());

        let mut config = Config::default();
        config.log_sink.path = Some(dir.path().join("bridge.log"));
        assert!(config.open_log_sink(&sink).unwrap());
        assert!(sink.is_open());
        sink.close();
    }
}
