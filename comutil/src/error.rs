//! Error types for string, time and log sink operations

use thiserror::Error;

use crate::code_page::CodePage;

#[derive(Error, Debug)]
pub enum ComutilError {
    #[error("Encoding error (code page {code_page}): {message}")]
    Encoding { code_page: CodePage, message: String },

    #[error("Input length {len} exceeds maximum of {max}")]
    Length { len: usize, max: usize },

    #[error("Value out of range: {0}")]
    Range(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error in '{path}': {message}")]
    Config { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, ComutilError>;

impl ComutilError {
    /// Create an encoding error for the given code page.
    pub fn encoding(code_page: CodePage, message: impl Into<String>) -> Self {
        ComutilError::Encoding {
            code_page,
            message: message.into(),
        }
    }

    /// Create a range error.
    pub fn range(message: impl Into<String>) -> Self {
        ComutilError::Range(message.into())
    }

    /// Check if this error came from the string codecs.
    pub fn is_codec_error(&self) -> bool {
        matches!(self, ComutilError::Encoding { .. } | ComutilError::Length { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ComutilError::encoding(CodePage::WINDOWS_1252, "bad byte");
        assert_eq!(err.to_string(), "Encoding error (code page 1252): bad byte");

        let err = ComutilError::Length { len: 10, max: 5 };
        assert_eq!(err.to_string(), "Input length 10 exceeds maximum of 5");

        assert_eq!(
            ComutilError::range("year 99").to_string(),
            "Value out of range: year 99"
        );
    }

    #[test]
    fn test_is_codec_error() {
        assert!(ComutilError::encoding(CodePage::UTF8, "x").is_codec_error());
        assert!(ComutilError::Length { len: 2, max: 1 }.is_codec_error());
        assert!(!ComutilError::range("x").is_codec_error());
        assert!(!ComutilError::from(std::io::Error::other("x")).is_codec_error());
    }
}
