//! Win32 NLS backed transcoding.
//!
//! Pseudo code pages (`CP_ACP`, `CP_OEMCP`, `CP_THREAD_ACP`) are handed to
//! Windows unchanged so the system resolves them exactly as other callers see
//! them.

use windows::core::BOOL;
use windows::Win32::Globalization::{
    MultiByteToWideChar, WideCharToMultiByte, MB_ERR_INVALID_CHARS,
    MULTI_BYTE_TO_WIDE_CHAR_FLAGS, WC_ERR_INVALID_CHARS,
};

use super::Transcoder;
use crate::code_page::CodePage;
use crate::error::{ComutilError, Result};
use crate::platform;

/// Transcoder using `MultiByteToWideChar` and `WideCharToMultiByte`.
///
/// Invalid input bytes and characters with no mapping in the target code page
/// both fail with [`ComutilError::Encoding`], same as the portable backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Native;

impl Transcoder for Native {
    fn decode(&self, code_page: CodePage, bytes: &[u8]) -> Result<Vec<u16>> {
        let cp = code_page.value();
        let flags = decode_flags(code_page);

        // how many code units will we need?
        let needed = unsafe { MultiByteToWideChar(cp, flags, bytes, None) };
        let needed: usize = match needed.try_into() {
            Ok(n) if n > 0 => n,
            _ => return Err(last_error(code_page)),
        };

        let mut wide = vec![0u16; needed];
        let written = unsafe { MultiByteToWideChar(cp, flags, bytes, Some(wide.as_mut_slice())) };
        let written: usize = match written.try_into() {
            Ok(n) if n > 0 => n,
            _ => return Err(last_error(code_page)),
        };
        wide.truncate(written);

        Ok(wide)
    }

    fn encode(&self, code_page: CodePage, wide: &[u16]) -> Result<Vec<u8>> {
        let cp = code_page.value();
        let resolved = code_page.resolve().value();
        let flags = if resolved == UTF8 { WC_ERR_INVALID_CHARS } else { 0 };
        // UTF-7 and UTF-8 take no default character arguments
        let track_default = resolved != UTF7 && resolved != UTF8;

        let mut used_default = BOOL(0);
        let used_default_ptr = track_default.then_some(&mut used_default as *mut BOOL);

        // how many bytes will we need?
        let needed =
            unsafe { WideCharToMultiByte(cp, flags, wide, None, None, used_default_ptr) };
        let needed: usize = match needed.try_into() {
            Ok(n) if n > 0 => n,
            _ => return Err(last_error(code_page)),
        };
        if used_default.as_bool() {
            return Err(unmappable(code_page, wide));
        }

        let mut bytes = vec![0u8; needed];
        let written = unsafe {
            WideCharToMultiByte(cp, flags, wide, Some(bytes.as_mut_slice()), None, used_default_ptr)
        };
        let written: usize = match written.try_into() {
            Ok(n) if n > 0 => n,
            _ => return Err(last_error(code_page)),
        };
        if used_default.as_bool() {
            return Err(unmappable(code_page, wide));
        }
        bytes.truncate(written);

        Ok(bytes)
    }
}

const UTF7: u32 = 65000;
const UTF8: u32 = 65001;

/// `MB_ERR_INVALID_CHARS`, except for the pages where Windows requires the
/// flags to be zero.
fn decode_flags(code_page: CodePage) -> MULTI_BYTE_TO_WIDE_CHAR_FLAGS {
    match code_page.resolve().value() {
        42 | 50220..=50229 | 57002..=57011 | UTF7 => MULTI_BYTE_TO_WIDE_CHAR_FLAGS::default(),
        _ => MB_ERR_INVALID_CHARS,
    }
}

fn last_error(code_page: CodePage) -> ComutilError {
    let err = windows::core::Error::from_win32();
    let message = platform::describe(&err)
        .unwrap_or_else(|| format!("Windows error 0x{:08X}", err.code().0));
    ComutilError::encoding(code_page, message)
}

fn unmappable(code_page: CodePage, wide: &[u16]) -> ComutilError {
    // Windows does not report which character fell back to the default
    ComutilError::encoding(
        code_page,
        format!(
            "{} code units contain a character with no mapping in code page {}",
            wide.len(),
            code_page
        ),
    )
}
