//! Code page identifiers and their byte encodings.

use std::fmt;

use encoding_rs::Encoding;
use serde::Deserialize;

use crate::error::{ComutilError, Result};

/// Windows code page number selecting the byte encoding used for
/// multibyte <-> wide transcoding.
///
/// The pseudo pages [`CodePage::ACP`], [`CodePage::OEMCP`] and
/// [`CodePage::THREAD_ACP`] are resolved when a conversion runs. On Windows
/// they follow the system locale; elsewhere they resolve to UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct CodePage(u32);

impl CodePage {
    /// Active ANSI code page (`CP_ACP`).
    pub const ACP: Self = Self(0);
    /// OEM code page (`CP_OEMCP`).
    pub const OEMCP: Self = Self(1);
    /// Calling thread's ANSI code page (`CP_THREAD_ACP`).
    pub const THREAD_ACP: Self = Self(3);
    /// Thai.
    pub const WINDOWS_874: Self = Self(874);
    /// Japanese Shift_JIS.
    pub const SHIFT_JIS: Self = Self(932);
    /// Simplified Chinese GBK.
    pub const GBK: Self = Self(936);
    /// Korean.
    pub const EUC_KR: Self = Self(949);
    /// Traditional Chinese Big5.
    pub const BIG5: Self = Self(950);
    /// Central European.
    pub const WINDOWS_1250: Self = Self(1250);
    /// Cyrillic.
    pub const WINDOWS_1251: Self = Self(1251);
    /// Western European.
    pub const WINDOWS_1252: Self = Self(1252);
    /// Greek.
    pub const WINDOWS_1253: Self = Self(1253);
    /// Turkish.
    pub const WINDOWS_1254: Self = Self(1254);
    /// Hebrew.
    pub const WINDOWS_1255: Self = Self(1255);
    /// Arabic.
    pub const WINDOWS_1256: Self = Self(1256);
    /// Baltic.
    pub const WINDOWS_1257: Self = Self(1257);
    /// Vietnamese.
    pub const WINDOWS_1258: Self = Self(1258);
    /// Russian KOI8-R.
    pub const KOI8_R: Self = Self(20866);
    /// Simplified Chinese GB18030.
    pub const GB18030: Self = Self(54936);
    /// UTF-8 (`CP_UTF8`).
    pub const UTF8: Self = Self(65001);

    /// Create from a raw code page number.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw code page number.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Check if this is one of the locale-dependent pseudo pages.
    pub fn is_pseudo(&self) -> bool {
        matches!(*self, Self::ACP | Self::OEMCP | Self::THREAD_ACP)
    }

    /// Resolve pseudo pages to the concrete page in effect.
    pub fn resolve(self) -> Self {
        match self {
            Self::ACP | Self::THREAD_ACP => platform_ansi_code_page(),
            Self::OEMCP => platform_oem_code_page(),
            other => other,
        }
    }

    /// Look up the byte encoding for this page (after resolution).
    pub fn encoding(self) -> Result<&'static Encoding> {
        let resolved = self.resolve();
        encoding_for(resolved.0).ok_or_else(|| {
            ComutilError::encoding(
                resolved,
                format!("code page {} is not supported", resolved.0),
            )
        })
    }
}

impl Default for CodePage {
    fn default() -> Self {
        Self::ACP
    }
}

impl From<u32> for CodePage {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ACP => write!(f, "CP_ACP"),
            Self::OEMCP => write!(f, "CP_OEMCP"),
            Self::THREAD_ACP => write!(f, "CP_THREAD_ACP"),
            Self::UTF8 => write!(f, "CP_UTF8"),
            Self(value) => write!(f, "{}", value),
        }
    }
}

fn encoding_for(value: u32) -> Option<&'static Encoding> {
    let encoding = match value {
        866 => encoding_rs::IBM866,
        874 => encoding_rs::WINDOWS_874,
        932 => encoding_rs::SHIFT_JIS,
        936 => encoding_rs::GBK,
        949 => encoding_rs::EUC_KR,
        950 => encoding_rs::BIG5,
        1250 => encoding_rs::WINDOWS_1250,
        1251 => encoding_rs::WINDOWS_1251,
        1252 => encoding_rs::WINDOWS_1252,
        1253 => encoding_rs::WINDOWS_1253,
        1254 => encoding_rs::WINDOWS_1254,
        1255 => encoding_rs::WINDOWS_1255,
        1256 => encoding_rs::WINDOWS_1256,
        1257 => encoding_rs::WINDOWS_1257,
        1258 => encoding_rs::WINDOWS_1258,
        10000 => encoding_rs::MACINTOSH,
        20866 => encoding_rs::KOI8_R,
        20932 => encoding_rs::EUC_JP,
        21866 => encoding_rs::KOI8_U,
        28592 => encoding_rs::ISO_8859_2,
        28593 => encoding_rs::ISO_8859_3,
        28594 => encoding_rs::ISO_8859_4,
        28595 => encoding_rs::ISO_8859_5,
        28596 => encoding_rs::ISO_8859_6,
        28597 => encoding_rs::ISO_8859_7,
        28598 => encoding_rs::ISO_8859_8,
        28605 => encoding_rs::ISO_8859_15,
        50220 => encoding_rs::ISO_2022_JP,
        54936 => encoding_rs::GB18030,
        65001 => encoding_rs::UTF_8,
        _ => return None,
    };
    Some(encoding)
}

#[cfg(windows)]
fn platform_ansi_code_page() -> CodePage {
    CodePage(unsafe { windows::Win32::Globalization::GetACP() })
}

#[cfg(windows)]
fn platform_oem_code_page() -> CodePage {
    CodePage(unsafe { windows::Win32::Globalization::GetOEMCP() })
}

// Outside Windows the locale's narrow encoding is UTF-8 in practice.
#[cfg(not(windows))]
fn platform_ansi_code_page() -> CodePage {
    CodePage::UTF8
}

#[cfg(not(windows))]
fn platform_oem_code_page() -> CodePage {
    CodePage::UTF8
}
