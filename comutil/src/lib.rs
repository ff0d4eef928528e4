//! # comutil
//!
//! Conversion utilities for bridges between a scripting engine and COM.
//!
//! ## Features
//!
//! - **String codec**: byte strings in a configurable code page <-> UTF-16
//!   wide strings (`BSTR` contents), with typed errors for invalid input and
//!   oversized buffers
//! - **Variant time codec**: OLE `DATE` values <-> calendar timestamps without
//!   losing milliseconds
//! - **Diagnostic log sink**: one shared, thread-safe `tag:message` log file
//! - **Bridge policy**: opt-in degrade-to-empty handling for hosts that expect
//!   conversions never to fail
//!
//! ## Example
//!
//! ```
//! use comutil::{to_calendar, to_variant, CalendarTimestamp, CodePage, CodecContext};
//!
//! fn main() -> comutil::Result<()> {
//!     let ctx = CodecContext::new(CodePage::WINDOWS_1252);
//!     let wide = ctx.bytes_to_wide(b"Ver Laptop")?;
//!     assert_eq!(ctx.wide_to_bytes(Some(&wide), false)?, b"Ver Laptop");
//!
//!     let stamp = CalendarTimestamp::new(2008, 6, 15, 14, 30, 7, 250)?;
//!     let date = to_variant(&stamp)?;
//!     assert_eq!(to_calendar(date)?.millisecond(), 250);
//!     Ok(())
//! }
//! ```

pub mod code_page;
pub mod codec;
pub mod config;
pub mod context;
mod error;
pub mod log_sink;
#[cfg(windows)]
pub mod platform;
pub mod variant_time;

pub use code_page::CodePage;
pub use codec::{bytes_to_wide, wide_to_bytes, Backend, Transcoder, MAX_INPUT_LEN};
pub use config::Config;
pub use context::{CodecContext, ErrorPolicy};
pub use error::{ComutilError, Result};
pub use log_sink::LogSink;
pub use variant_time::{to_calendar, to_variant, CalendarTimestamp, VariantTime};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with the given filter, unless `RUST_LOG` overrides it.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
