//! Byte string <-> wide string transcoding
//!
//! Byte strings are counted `u8` buffers in some code page; wide strings are
//! counted UTF-16 code units as carried by `BSTR`. Neither side is assumed to
//! be null terminated, and every conversion returns a freshly allocated
//! buffer owned by the caller.
//!
//! Two backends implement [`Transcoder`]:
//! - [`Portable`]: `encoding_rs` tables, available everywhere
//! - `Native` (Windows only): `MultiByteToWideChar` / `WideCharToMultiByte`

#[cfg(windows)]
mod native;
mod portable;

#[cfg(windows)]
pub use native::Native;
pub use portable::Portable;

use crate::code_page::CodePage;
use crate::error::{ComutilError, Result};

/// Largest input accepted by the codecs (`INT_MAX` code units or bytes).
pub const MAX_INPUT_LEN: usize = i32::MAX as usize;

/// A code page transcoding implementation.
///
/// Callers never pass empty input; length limits and surrogate checks have
/// already been applied by the time these run.
pub trait Transcoder {
    /// Decode a byte string into UTF-16 code units.
    fn decode(&self, code_page: CodePage, bytes: &[u8]) -> Result<Vec<u16>>;

    /// Encode well-formed UTF-16 into a byte string.
    fn encode(&self, code_page: CodePage, wide: &[u16]) -> Result<Vec<u8>>;
}

/// Transcoding backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    /// `encoding_rs` tables.
    #[default]
    Portable,
    /// Win32 NLS conversion functions.
    #[cfg(windows)]
    Native,
}

impl Transcoder for Backend {
    fn decode(&self, code_page: CodePage, bytes: &[u8]) -> Result<Vec<u16>> {
        match self {
            Backend::Portable => Portable.decode(code_page, bytes),
            #[cfg(windows)]
            Backend::Native => Native.decode(code_page, bytes),
        }
    }

    fn encode(&self, code_page: CodePage, wide: &[u16]) -> Result<Vec<u8>> {
        match self {
            Backend::Portable => Portable.encode(code_page, wide),
            #[cfg(windows)]
            Backend::Native => Native.encode(code_page, wide),
        }
    }
}

/// Convert a byte string in `code_page` to a wide string.
///
/// Empty input yields an empty wide string. Invalid byte sequences fail with
/// [`ComutilError::Encoding`].
pub fn bytes_to_wide(bytes: &[u8], code_page: CodePage) -> Result<Vec<u16>> {
    bytes_to_wide_with(&Portable, bytes, code_page, MAX_INPUT_LEN)
}

/// Convert a wide string to a byte string in `code_page`.
///
/// `None` is treated as the empty string. When `null_terminate` is set the
/// result carries exactly one trailing `0` byte, and none otherwise. Inputs
/// longer than [`MAX_INPUT_LEN`] fail with [`ComutilError::Length`]; unpaired
/// surrogates and characters the code page cannot represent fail with
/// [`ComutilError::Encoding`].
pub fn wide_to_bytes(
    wide: Option<&[u16]>,
    code_page: CodePage,
    null_terminate: bool,
) -> Result<Vec<u8>> {
    wide_to_bytes_with(&Portable, wide, code_page, null_terminate, MAX_INPUT_LEN)
}

pub(crate) fn bytes_to_wide_with<T: Transcoder + ?Sized>(
    transcoder: &T,
    bytes: &[u8],
    code_page: CodePage,
    max_len: usize,
) -> Result<Vec<u16>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    check_length(bytes.len(), max_len)?;

    transcoder.decode(code_page, bytes).inspect_err(|e| {
        tracing::debug!("bytes_to_wide failed for {} bytes: {}", bytes.len(), e);
    })
}

pub(crate) fn wide_to_bytes_with<T: Transcoder + ?Sized>(
    transcoder: &T,
    wide: Option<&[u16]>,
    code_page: CodePage,
    null_terminate: bool,
    max_len: usize,
) -> Result<Vec<u8>> {
    let wide = wide.unwrap_or(&[]);
    check_length(wide.len(), max_len)?;

    let mut bytes = if wide.is_empty() {
        Vec::new()
    } else {
        check_surrogates(code_page, wide)
            .and_then(|()| transcoder.encode(code_page, wide))
            .inspect_err(|e| {
                tracing::debug!("wide_to_bytes failed for {} code units: {}", wide.len(), e);
            })?
    };

    if null_terminate {
        bytes.push(0);
    }
    Ok(bytes)
}

/// Reject lengths above `max` before any conversion work happens.
pub fn check_length(len: usize, max: usize) -> Result<()> {
    if len > max {
        return Err(ComutilError::Length { len, max });
    }
    Ok(())
}

fn check_surrogates(code_page: CodePage, wide: &[u16]) -> Result<()> {
    let mut index = 0;
    for decoded in char::decode_utf16(wide.iter().copied()) {
        match decoded {
            Ok(c) => index += c.len_utf16(),
            Err(e) => {
                return Err(ComutilError::encoding(
                    code_page,
                    format!(
                        "unpaired surrogate 0x{:04X} at index {}",
                        e.unpaired_surrogate(),
                        index
                    ),
                ))
            }
        }
    }
    Ok(())
}
