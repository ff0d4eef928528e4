//! `encoding_rs` backed transcoding.

use encoding_rs::{DecoderResult, EncoderResult};

use super::Transcoder;
use crate::code_page::CodePage;
use crate::error::{ComutilError, Result};

/// Table-driven transcoder that behaves the same on every platform.
///
/// The output buffer is sized once from the codec's worst-case estimate and
/// truncated to what was written, so no separate sizing pass is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Portable;

impl Transcoder for Portable {
    fn decode(&self, code_page: CodePage, bytes: &[u8]) -> Result<Vec<u16>> {
        let encoding = code_page.encoding()?;
        let mut decoder = encoding.new_decoder_without_bom_handling();

        let capacity = decoder
            .max_utf16_buffer_length(bytes.len())
            .ok_or_else(|| ComutilError::encoding(code_page, "output length overflows usize"))?;
        let mut wide = vec![0u16; capacity];

        let (result, read, written) =
            decoder.decode_to_utf16_without_replacement(bytes, &mut wide, true);

        match result {
            DecoderResult::InputEmpty => {
                wide.truncate(written);
                Ok(wide)
            }
            DecoderResult::Malformed(bad, extra) => {
                let offset = read.saturating_sub(bad as usize + extra as usize);
                Err(ComutilError::encoding(
                    code_page,
                    format!(
                        "invalid {} byte sequence at offset {}",
                        encoding.name(),
                        offset
                    ),
                ))
            }
            DecoderResult::OutputFull => Err(ComutilError::encoding(
                code_page,
                "wide buffer too small for decoded output",
            )),
        }
    }

    fn encode(&self, code_page: CodePage, wide: &[u16]) -> Result<Vec<u8>> {
        let encoding = code_page.encoding()?;
        let mut encoder = encoding.new_encoder();

        let capacity = encoder
            .max_buffer_length_from_utf16_without_replacement(wide.len())
            .ok_or_else(|| ComutilError::encoding(code_page, "output length overflows usize"))?;
        let mut bytes = vec![0u8; capacity];

        let (result, read, written) =
            encoder.encode_from_utf16_without_replacement(wide, &mut bytes, true);

        match result {
            EncoderResult::InputEmpty => {
                bytes.truncate(written);
                Ok(bytes)
            }
            EncoderResult::Unmappable(c) => Err(ComutilError::encoding(
                code_page,
                format!(
                    "character U+{:04X} at index {} has no mapping in {}",
                    c as u32,
                    read.saturating_sub(c.len_utf16()),
                    encoding.name()
                ),
            )),
            EncoderResult::OutputFull => Err(ComutilError::encoding(
                code_page,
                "byte buffer too small for encoded output",
            )),
        }
    }
}
