//! OS diagnostic text.

use windows::core::{Error as WinError, HRESULT};

/// Get the system message for a Win32 error code.
///
/// Returns `None` when the system has no text for the code.
pub fn error_message(code: u32) -> Option<String> {
    describe(&WinError::from_hresult(HRESULT::from_win32(code)))
}

/// System message carried by a Windows error, without trailing line breaks
/// so it can be embedded in a single log line.
pub fn describe(err: &WinError) -> Option<String> {
    let message = err.message();
    let message = message.trim_end_matches(['\r', '\n', ' ']);

    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
