//! Text encodings accepted for column data.
//!
//! Only two are supported: single-byte ASCII (code page 1252) and UTF-16LE
//! (code page 1200). Characters outside ASCII are written as `?`.

use esent_native::CodePage;

use crate::error::{InteropError, InteropResult};

/// A supported text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// One byte per character.
    Ascii,
    /// UTF-16, little endian.
    Unicode,
}

impl Encoding {
    /// Resolves a code page, rejecting anything other than ASCII or Unicode.
    pub fn for_code_page(code_page: CodePage) -> InteropResult<Self> {
        match code_page {
            CodePage::ASCII => Ok(Self::Ascii),
            CodePage::UNICODE => Ok(Self::Unicode),
            CodePage(other) => Err(InteropError::InvalidEncoding { code_page: other }),
        }
    }

    /// Returns the engine code page.
    #[must_use]
    pub const fn code_page(self) -> CodePage {
        match self {
            Self::Ascii => CodePage::ASCII,
            Self::Unicode => CodePage::UNICODE,
        }
    }

    /// Encodes text.
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            Self::Unicode => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        }
    }

    /// Decodes text. A trailing odd byte of UTF-16 data is ignored.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { char::from(b) } else { '?' })
                .collect(),
            Self::Unicode => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
        }
    }
}
