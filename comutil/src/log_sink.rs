//! Process-wide diagnostic log file.
//!
//! Lines are written as `tag:message`, newline terminated, and flushed
//! immediately. Every entry point holds the sink's lock for its whole
//! duration, so lines from concurrent threads never interleave. Nothing here
//! returns an error once the file is open: diagnostics must not take the host
//! down.
//!
//! ```no_run
//! use comutil::{sink_log, LogSink};
//!
//! LogSink::global().open("bridge.log")?;
//! sink_log!("typeinfo", "loaded {} members", 12);
//! LogSink::global().close();
//! # Ok::<(), comutil::ComutilError>(())
//! ```

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::error::Result;

static GLOBAL: OnceLock<LogSink> = OnceLock::new();

/// A log file shared between threads.
#[derive(Debug, Default)]
pub struct LogSink {
    stream: Mutex<Option<File>>,
}

impl LogSink {
    /// Create a closed sink.
    pub const fn new() -> Self {
        Self {
            stream: Mutex::new(None),
        }
    }

    /// The process-wide sink, created on first use.
    pub fn global() -> &'static LogSink {
        GLOBAL.get_or_init(LogSink::new)
    }

    /// Open `path` for logging, truncating it.
    ///
    /// Any file already open is closed first, so on failure the sink is left
    /// closed.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut stream = self.lock();
        release(&mut stream);

        let file = File::create(path).inspect_err(|e| {
            tracing::warn!("Failed to open log file {:?}: {}", path, e);
        })?;
        *stream = Some(file);

        tracing::info!("Log file opened at {:?}", path);
        Ok(())
    }

    /// Flush and close the log file. Does nothing when closed.
    pub fn close(&self) {
        let mut stream = self.lock();
        release(&mut stream);
    }

    /// Check if a log file is open.
    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Append `tag:message`.
    ///
    /// A newline is added unless the message already ends with one.
    pub fn log(&self, tag: &str, message: fmt::Arguments<'_>) {
        let mut stream = self.lock();
        let Some(file) = stream.as_mut() else {
            return;
        };

        let line = format_line(tag, &message.to_string());
        // a failed write is dropped; there is nowhere to report it
        let _ = file.write_all(line.as_bytes()).and_then(|()| file.flush());
    }

    /// Append a preformatted message. Either argument missing makes this a
    /// no-op.
    pub fn log_str(&self, tag: Option<&str>, message: Option<&str>) {
        if let (Some(tag), Some(message)) = (tag, message) {
            self.log(tag, format_args!("{}", message));
        }
    }

    /// Like [`LogSink::log`], but only built with the `verbose` feature.
    #[cfg(feature = "verbose")]
    pub fn log_verbose(&self, tag: &str, message: fmt::Arguments<'_>) {
        self.log(tag, message);
    }

    /// Like [`LogSink::log`], but only built with the `verbose` feature.
    #[cfg(not(feature = "verbose"))]
    #[inline(always)]
    pub fn log_verbose(&self, _tag: &str, _message: fmt::Arguments<'_>) {}

    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.stream.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn release(stream: &mut Option<File>) {
    if let Some(mut file) = stream.take() {
        let _ = file.flush();
    }
}

fn format_line(tag: &str, message: &str) -> String {
    let mut line = String::with_capacity(tag.len() + message.len() + 2);
    line.push_str(tag);
    line.push(':');
    line.push_str(message);
    if !message.ends_with('\n') {
        line.push('\n');
    }
    line
}

/// Write a printf-style line to the global [`LogSink`].
///
/// ```no_run
/// comutil::sink_log!("dispatch", "Invoke({}) returned {:#x}", 7, 0x8002_0003u32);
/// ```
#[macro_export]
macro_rules! sink_log {
    ($tag:expr, $($arg:tt)+) => {
        $crate::LogSink::global().log($tag, ::std::format_args!($($arg)+))
    };
}

/// Write a line to the global [`LogSink`] in `verbose` builds only.
#[macro_export]
macro_rules! sink_log_verbose {
    ($tag:expr, $($arg:tt)+) => {
        $crate::LogSink::global().log_verbose($tag, ::std::format_args!($($arg)+))
    };
}
