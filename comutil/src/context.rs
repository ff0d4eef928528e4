//! Per-worker conversion settings and the bridge-facing conversions.
//!
//! A [`CodecContext`] is an ordinary value: each worker owns its own copy, so
//! changing the code page on one thread never affects another. A request that
//! hops threads carries its context along explicitly.

use serde::Deserialize;

use crate::code_page::CodePage;
use crate::codec::{self, Backend, MAX_INPUT_LEN};
use crate::error::Result;

/// What the bridge-facing conversions do with a codec failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Return the error to the caller.
    #[default]
    Strict,
    /// Log the error and hand the host an empty value, which the host cannot
    /// tell apart from a genuinely empty string.
    Degrade,
}

/// Conversion settings for one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecContext {
    code_page: CodePage,
    max_len: usize,
    policy: ErrorPolicy,
    backend: Backend,
}

impl Default for CodecContext {
    fn default() -> Self {
        Self::new(CodePage::default())
    }
}

impl CodecContext {
    /// Strict, portable context for `code_page`.
    pub fn new(code_page: CodePage) -> Self {
        Self {
            code_page,
            max_len: MAX_INPUT_LEN,
            policy: ErrorPolicy::Strict,
            backend: Backend::Portable,
        }
    }

    /// Set the error policy used by the `bridge_*` conversions.
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the transcoding backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Lower the maximum input length. Values above `INT_MAX` are clamped.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len.min(MAX_INPUT_LEN);
        self
    }

    pub fn code_page(&self) -> CodePage {
        self.code_page
    }

    /// Switch this worker's code page.
    pub fn set_code_page(&mut self, code_page: CodePage) {
        tracing::debug!("Code page changed from {} to {}", self.code_page, code_page);
        self.code_page = code_page;
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Byte string to wide string; errors are always returned.
    pub fn bytes_to_wide(&self, bytes: &[u8]) -> Result<Vec<u16>> {
        codec::bytes_to_wide_with(&self.backend, bytes, self.code_page, self.max_len)
    }

    /// Wide string to byte string; errors are always returned.
    pub fn wide_to_bytes(&self, wide: Option<&[u16]>, null_terminate: bool) -> Result<Vec<u8>> {
        codec::wide_to_bytes_with(
            &self.backend,
            wide,
            self.code_page,
            null_terminate,
            self.max_len,
        )
    }

    /// Byte string to wide string under this context's [`ErrorPolicy`].
    pub fn bridge_bytes_to_wide(&self, bytes: &[u8]) -> Result<Vec<u16>> {
        self.apply_policy("bytes_to_wide", self.bytes_to_wide(bytes))
    }

    /// Wide string to byte string under this context's [`ErrorPolicy`].
    ///
    /// A degraded result honours `null_terminate`, like an empty input would.
    pub fn bridge_wide_to_bytes(
        &self,
        wide: Option<&[u16]>,
        null_terminate: bool,
    ) -> Result<Vec<u8>> {
        let result = self.apply_policy("wide_to_bytes", self.wide_to_bytes(wide, null_terminate));
        match result {
            Ok(bytes) if bytes.is_empty() && null_terminate => Ok(vec![0]),
            other => other,
        }
    }

    fn apply_policy<T: Default>(&self, operation: &str, result: Result<T>) -> Result<T> {
        match (result, self.policy) {
            (Ok(value), _) => Ok(value),
            (Err(e), ErrorPolicy::Strict) => Err(e),
            (Err(e), ErrorPolicy::Degrade) => {
                tracing::warn!("{} degraded to empty value: {}", operation, e);
                Ok(T::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComutilError;

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_default_context() {
        let ctx = CodecContext::default();
        assert_eq!(ctx.code_page(), CodePage::ACP);
        assert_eq!(ctx.policy(), ErrorPolicy::Strict);
        assert_eq!(ctx.backend(), Backend::Portable);
        assert_eq!(ctx.max_len(), MAX_INPUT_LEN);
    }

    #[test]
    fn test_max_len_is_clamped() {
        let ctx = CodecContext::default().with_max_len(usize::MAX);
        assert_eq!(ctx.max_len(), MAX_INPUT_LEN);
    }

    #[test]
    fn test_contexts_are_independent() {
        let mut worker_a = CodecContext::new(CodePage::WINDOWS_1252);
        let worker_b = worker_a.clone();
        worker_a.set_code_page(CodePage::UTF8);

        assert_eq!(worker_a.code_page(), CodePage::UTF8);
        assert_eq!(worker_b.code_page(), CodePage::WINDOWS_1252);

        let w = worker_a.bytes_to_wide("é".as_bytes()).unwrap();
        assert_eq!(w, wide("é"));
        let w = worker_b.bytes_to_wide(&[0xE9]).unwrap();
        assert_eq!(w, wide("é"));
    }

    #[test]
    fn test_strict_policy_propagates() {
        let ctx = CodecContext::new(CodePage::WINDOWS_1252);
        let err = ctx
            .bridge_wide_to_bytes(Some(&wide("☃")), false)
            .unwrap_err();
        assert!(matches!(err, ComutilError::Encoding { .. }));

        let ctx = CodecContext::new(CodePage::UTF8);
        assert!(ctx.bridge_bytes_to_wide(&[0xFF]).is_err());
    }

    #[test]
    fn test_degrade_policy_returns_empty() {
        let ctx = CodecContext::new(CodePage::WINDOWS_1252).with_policy(ErrorPolicy::Degrade);
        assert!(ctx
            .bridge_wide_to_bytes(Some(&wide("☃")), false)
            .unwrap()
            .is_empty());
        assert_eq!(
            ctx.bridge_wide_to_bytes(Some(&wide("☃")), true).unwrap(),
            vec![0]
        );

        let ctx = CodecContext::new(CodePage::UTF8).with_policy(ErrorPolicy::Degrade);
        assert!(ctx.bridge_bytes_to_wide(&[0xFF]).unwrap().is_empty());

        // the direct conversions still report the failure
        assert!(ctx.bytes_to_wide(&[0xFF]).is_err());
    }

    #[test]
    fn test_degrade_covers_length_errors() {
        let ctx = CodecContext::new(CodePage::UTF8)
            .with_max_len(3)
            .with_policy(ErrorPolicy::Degrade);
        assert!(ctx.bridge_bytes_to_wide(b"abcd").unwrap().is_empty());
        assert!(matches!(
            ctx.wide_to_bytes(Some(&wide("abcd")), false),
            Err(ComutilError::Length { len: 4, max: 3 })
        ));
    }

    #[test]
    fn test_policy_deserialize() {
        #[derive(Deserialize)]
        struct Holder {
            policy: ErrorPolicy,
        }
        let holder: Holder = toml::from_str("policy = \"degrade\"").unwrap();
        assert_eq!(holder.policy, ErrorPolicy::Degrade);
    }
}
