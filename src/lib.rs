//! # cyrconv - Cyrillic and Unicode Text Conversion
//!
//! Converts whole text buffers between UTF-8 (with or without BOM),
//! UTF-16LE/BE and the Windows-1251, CP866 and KOI8-R code pages.
//!
//! Conversion always goes through an intermediate sequence of
//! [`CodePoint`]s. Decoding never rejects malformed text; bad sequences
//! become U+FFFD, stray UTF-8 continuation bytes are kept in the
//! 0xDC80-0xDCFF escape band, and characters a single-byte target cannot
//! represent become that table's replacement byte. The only structural
//! error is UTF-16 input with an odd number of bytes.
//!
//! ## Quick Start
//!
//! ```rust
//! use cyrconv::{Encoding, Translator};
//!
//! // Windows-1251 to UTF-8
//! let translator = Translator::new(Some(Encoding::WINDOWS_1251), Encoding::UTF8);
//!
//! let cp1251 = &[0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2]; // "Привет"
//! let utf8 = translator.convert(cp1251).unwrap();
//! assert_eq!(std::str::from_utf8(&utf8).unwrap(), "Привет");
//! ```

#![deny(missing_docs)]

use std::str::FromStr;

use log::{debug, trace};
use serde::Serialize;
use thiserror::Error;

pub mod detection;
pub mod multibyte;
pub mod tables;

pub use detection::{DetectionMethod, DetectionResult, EncodingDetector, detect_encoding};
pub use multibyte::ByteOrder;
pub use tables::SingleByteTable;

/// U+FFFD REPLACEMENT CHARACTER
pub const REPLACEMENT: u32 = 0xFFFD;

/// First value of the escape band holding invalid UTF-8 bytes
pub const ESCAPE_BASE: u32 = 0xDC80;

/// Last value of the escape band
pub const ESCAPE_END: u32 = 0xDCFF;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during conversion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// UTF-16 input whose length is not a whole number of code units
    #[error(
        "{operation}: input length {length} is not a multiple of 2 (unpaired byte at offset {})",
        .length.saturating_sub(1)
    )]
    OddUtf16Length {
        /// Operation that rejected the input
        operation: &'static str,
        /// Input length in bytes
        length: usize,
    },

    /// A working buffer could not be allocated
    #[error("{operation}: failed to allocate {requested} bytes")]
    Allocation {
        /// Operation that needed the buffer
        operation: &'static str,
        /// Requested size in bytes
        requested: usize,
    },

    /// Encoding selector that names none of the supported encodings
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),
}

/// Supported character encodings
///
/// The discriminant is the numeric selector used on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[allow(non_camel_case_types)]
#[repr(u8)]
pub enum Encoding {
    /// UTF-8 without byte order mark
    #[serde(rename = "UTF-8")]
    UTF8 = 0,
    /// UTF-8 with byte order mark
    #[serde(rename = "UTF-8-BOM")]
    UTF8_BOM = 1,
    /// UTF-16 little endian
    #[serde(rename = "UTF-16LE")]
    UTF16LE = 2,
    /// UTF-16 big endian
    #[serde(rename = "UTF-16BE")]
    UTF16BE = 3,
    /// Windows-1251 (Windows Cyrillic)
    #[serde(rename = "Windows-1251")]
    WINDOWS_1251 = 4,
    /// DOS Code Page 866 (Russian OEM)
    #[serde(rename = "CP866")]
    CP_866 = 5,
    /// KOI8-R (Unix Cyrillic)
    #[serde(rename = "KOI8-R")]
    KOI8_R = 6,
}

impl Encoding {
    /// All encodings in selector order
    pub const ALL: [Encoding; 7] = [
        Encoding::UTF8,
        Encoding::UTF8_BOM,
        Encoding::UTF16LE,
        Encoding::UTF16BE,
        Encoding::WINDOWS_1251,
        Encoding::CP_866,
        Encoding::KOI8_R,
    ];

    /// Encoding for a numeric selector 0-6
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Numeric selector of this encoding
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Get the canonical name of this encoding
    pub fn name(self) -> &'static str {
        match self {
            Encoding::UTF8 => "UTF-8",
            Encoding::UTF8_BOM => "UTF-8-BOM",
            Encoding::UTF16LE => "UTF-16LE",
            Encoding::UTF16BE => "UTF-16BE",
            Encoding::WINDOWS_1251 => "Windows-1251",
            Encoding::CP_866 => "CP866",
            Encoding::KOI8_R => "KOI8-R",
        }
    }

    /// Short human-readable description
    pub fn description(self) -> &'static str {
        match self {
            Encoding::UTF8 => "UTF-8 without BOM",
            Encoding::UTF8_BOM => "UTF-8 with BOM",
            Encoding::UTF16LE => "UTF-16 Little Endian",
            Encoding::UTF16BE => "UTF-16 Big Endian",
            Encoding::WINDOWS_1251 => "CP1251 (Windows Cyrillic)",
            Encoding::CP_866 => "CP866 (DOS Cyrillic)",
            Encoding::KOI8_R => "KOI8-R (Unix Cyrillic)",
        }
    }

    /// Byte order mark stripped from input of this encoding, if any
    pub fn bom(self) -> Option<&'static [u8]> {
        match self {
            Encoding::UTF8_BOM => Some(&multibyte::UTF8_BOM),
            Encoding::UTF16LE => Some(&[0xFF, 0xFE]),
            Encoding::UTF16BE => Some(&[0xFE, 0xFF]),
            _ => None,
        }
    }

    /// Check if this is one of the table-driven code pages
    pub fn is_single_byte(self) -> bool {
        matches!(
            self,
            Encoding::WINDOWS_1251 | Encoding::CP_866 | Encoding::KOI8_R
        )
    }

    /// Check if this is a Unicode transformation format
    pub fn is_unicode(self) -> bool {
        !self.is_single_byte()
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(index) = s.trim().parse::<u8>() {
            return Self::from_index(index).ok_or_else(|| Error::UnknownEncoding(s.to_string()));
        }

        let encoding = match s.trim().to_uppercase().replace('_', "-").as_str() {
            "UTF8" | "UTF-8" => Encoding::UTF8,
            "UTF8-BOM" | "UTF-8-BOM" | "UTF8BOM" => Encoding::UTF8_BOM,
            "UTF16LE" | "UTF-16LE" => Encoding::UTF16LE,
            "UTF16BE" | "UTF-16BE" => Encoding::UTF16BE,
            "WINDOWS1251" | "WINDOWS-1251" | "WIN1251" | "CP1251" => Encoding::WINDOWS_1251,
            "CP866" | "DOS866" | "IBM866" => Encoding::CP_866,
            "KOI8R" | "KOI8-R" => Encoding::KOI8_R,
            _ => return Err(Error::UnknownEncoding(s.to_string())),
        };
        Ok(encoding)
    }
}

/// One decoded character and the number of source bytes it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePoint {
    /// Unicode scalar value, or an escape-band value for an invalid byte
    pub value: u32,
    /// Source bytes consumed to produce this entry
    pub source_len: usize,
}

impl CodePoint {
    /// U+FFFD standing in for `source_len` bytes of malformed input
    pub fn replacement(source_len: usize) -> Self {
        Self {
            value: REPLACEMENT,
            source_len,
        }
    }

    /// The original byte, if this entry preserves an invalid UTF-8 byte
    pub fn escaped_byte(&self) -> Option<u8> {
        (ESCAPE_BASE..=ESCAPE_END)
            .contains(&self.value)
            .then(|| 0x80 | (self.value - ESCAPE_BASE) as u8)
    }

    /// Whether decoding substituted this entry for unreadable input
    pub fn is_substitution(&self) -> bool {
        self.value == REPLACEMENT || self.escaped_byte().is_some()
    }
}

fn try_alloc<T>(capacity: usize, operation: &'static str) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(capacity)
        .map_err(|_| Error::Allocation {
            operation,
            requested: capacity.saturating_mul(std::mem::size_of::<T>()),
        })?;
    Ok(buffer)
}

/// Decode `input` as `encoding`
///
/// A leading BOM matching `encoding` is stripped first. Only the UTF-16
/// decoders can fail, and only on odd-length input.
pub fn decode(input: &[u8], encoding: Encoding) -> Result<Vec<CodePoint>> {
    let body = match encoding.bom() {
        Some(bom) if input.starts_with(bom) => {
            trace!("stripping {}-byte {} BOM", bom.len(), encoding.name());
            &input[bom.len()..]
        }
        _ => input,
    };

    match encoding {
        Encoding::UTF8 | Encoding::UTF8_BOM => {
            let mut out = try_alloc(body.len(), "UTF-8 decode")?;
            multibyte::decode_utf8_into(body, &mut out);
            Ok(out)
        }
        Encoding::UTF16LE | Encoding::UTF16BE => {
            let order = if encoding == Encoding::UTF16LE {
                ByteOrder::Little
            } else {
                ByteOrder::Big
            };
            let mut out = try_alloc(body.len() / 2, "UTF-16 decode")?;
            multibyte::decode_utf16_into(body, order, &mut out).map_err(|err| match err {
                // report against the caller's buffer, BOM included
                Error::OddUtf16Length { operation, .. } => Error::OddUtf16Length {
                    operation,
                    length: input.len(),
                },
                other => other,
            })?;
            Ok(out)
        }
        Encoding::WINDOWS_1251 | Encoding::CP_866 | Encoding::KOI8_R => {
            let mut out = try_alloc(body.len(), "single-byte decode")?;
            if let Some(table) = SingleByteTable::for_encoding(encoding) {
                table.decode_into(body, &mut out);
            }
            Ok(out)
        }
    }
}

/// Encode `chars` as `encoding`
///
/// UTF-8-BOM output starts with EF BB BF; UTF-16 output carries no BOM.
pub fn encode(chars: &[CodePoint], encoding: Encoding) -> Result<Vec<u8>> {
    match encoding {
        Encoding::UTF8 | Encoding::UTF8_BOM => {
            let with_bom = encoding == Encoding::UTF8_BOM;
            let capacity = chars.len().saturating_mul(4).saturating_add(3);
            let mut out = try_alloc(capacity, "UTF-8 encode")?;
            multibyte::encode_utf8_into(chars, with_bom, &mut out);
            Ok(out)
        }
        Encoding::UTF16LE | Encoding::UTF16BE => {
            let order = if encoding == Encoding::UTF16LE {
                ByteOrder::Little
            } else {
                ByteOrder::Big
            };
            let mut out = try_alloc(chars.len().saturating_mul(4), "UTF-16 encode")?;
            multibyte::encode_utf16_into(chars, order, &mut out);
            Ok(out)
        }
        Encoding::WINDOWS_1251 | Encoding::CP_866 | Encoding::KOI8_R => {
            let mut out = try_alloc(chars.len(), "single-byte encode")?;
            if let Some(table) = SingleByteTable::for_encoding(encoding) {
                table.encode_into(chars, &mut out);
            }
            Ok(out)
        }
    }
}

/// Summary of one conversion
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// Encoding the input was decoded as
    pub source: Encoding,
    /// Encoding the output was written in
    pub target: Encoding,
    /// Whether `source` was auto-detected
    pub detected: bool,
    /// Input size in bytes
    pub bytes_read: usize,
    /// Number of decoded code points
    pub code_points: usize,
    /// Decoded entries that are U+FFFD or escaped invalid bytes
    pub substitutions: usize,
    /// Output size in bytes
    pub bytes_written: usize,
    /// Converted bytes
    #[serde(skip)]
    pub output: Vec<u8>,
}

/// Whole-buffer converter between two encodings
#[derive(Debug, Clone, Copy)]
pub struct Translator {
    from: Option<Encoding>,
    to: Encoding,
}

impl Translator {
    /// Create a translator; `from = None` detects the source encoding of
    /// every buffer passed to it.
    pub fn new(from: Option<Encoding>, to: Encoding) -> Self {
        Self { from, to }
    }

    /// Translator that auto-detects its source encoding
    pub fn auto(to: Encoding) -> Self {
        Self::new(None, to)
    }

    /// Get source encoding, `None` when auto-detecting
    pub fn from_encoding(&self) -> Option<Encoding> {
        self.from
    }

    /// Get target encoding
    pub fn to_encoding(&self) -> Encoding {
        self.to
    }

    /// Convert data from source to target encoding
    pub fn convert(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.convert_with_report(input).map(|conversion| conversion.output)
    }

    /// Convert data and report what happened along the way
    pub fn convert_with_report(&self, input: &[u8]) -> Result<Conversion> {
        let (source, detected) = match self.from {
            Some(encoding) => (encoding, false),
            None => (detect_encoding(input), true),
        };

        let chars = decode(input, source)?;
        let substitutions = chars.iter().filter(|cp| cp.is_substitution()).count();
        debug!(
            "decoded {} code points from {} bytes of {} ({} substituted)",
            chars.len(),
            input.len(),
            source.name(),
            substitutions
        );

        let output = encode(&chars, self.to)?;
        debug!("encoded {} bytes of {}", output.len(), self.to.name());

        Ok(Conversion {
            source,
            target: self.to,
            detected,
            bytes_read: input.len(),
            code_points: chars.len(),
            substitutions,
            bytes_written: output.len(),
            output,
        })
    }
}

/// Convert `input` in one call; `from = None` auto-detects
pub fn convert(input: &[u8], from: Option<Encoding>, to: Encoding) -> Result<Vec<u8>> {
    Translator::new(from, to).convert(input)
}
