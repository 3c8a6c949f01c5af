//! Source encoding detection
//!
//! Only the Unicode encodings are detected: a BOM is conclusive, a
//! zero-byte parity scan recognises BOM-less UTF-16, and everything else
//! is treated as UTF-8. The parity scan is a heuristic. It works for text
//! that is mostly Latin or ASCII and can misfire on binary data or on
//! UTF-16 text without enough ASCII in the sampled window.

use log::debug;
use serde::Serialize;

use crate::Encoding;
use crate::multibyte::is_valid_utf8;

/// Bytes inspected by the zero-byte parity scan
pub const PARITY_WINDOW: usize = 1024;

/// Zero bytes one parity must exceed, with none at the other parity
pub const PARITY_THRESHOLD: usize = 10;

/// Shortest buffer the parity scan is attempted on
pub const PARITY_MIN_LEN: usize = 4;

/// Which rule settled the detected encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// A byte order mark at the start of the buffer
    Bom,
    /// Zero bytes clustered at even or odd offsets
    ZeroParity,
    /// The whole buffer is well-formed UTF-8
    Utf8Valid,
    /// Nothing matched; UTF-8 is assumed
    Fallback,
}

/// Result of encoding detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionResult {
    /// Most likely encoding
    pub encoding: Encoding,
    /// Whether a BOM was detected
    pub bom_detected: bool,
    /// Rule that produced `encoding`
    pub method: DetectionMethod,
}

impl DetectionResult {
    fn new(encoding: Encoding, method: DetectionMethod) -> Self {
        Self {
            encoding,
            bom_detected: method == DetectionMethod::Bom,
            method,
        }
    }
}

/// Encoding detector for UTF-8 and UTF-16 input
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingDetector;

impl EncodingDetector {
    /// Create a new encoding detector
    pub fn new() -> Self {
        Self
    }

    /// Detect the encoding of `data`. Never fails; ambiguous and empty
    /// input come back as UTF-8 without BOM.
    pub fn detect(&self, data: &[u8]) -> DetectionResult {
        let result = self.detect_inner(data);
        debug!(
            "detected {} via {:?} ({} bytes)",
            result.encoding.name(),
            result.method,
            data.len()
        );
        result
    }

    fn detect_inner(&self, data: &[u8]) -> DetectionResult {
        if let Some(encoding) = self.detect_bom(data) {
            return DetectionResult::new(encoding, DetectionMethod::Bom);
        }

        if let Some(encoding) = self.detect_zero_parity(data) {
            return DetectionResult::new(encoding, DetectionMethod::ZeroParity);
        }

        if !data.is_empty() && is_valid_utf8(data) {
            DetectionResult::new(Encoding::UTF8, DetectionMethod::Utf8Valid)
        } else {
            DetectionResult::new(Encoding::UTF8, DetectionMethod::Fallback)
        }
    }

    /// Detect BOM (Byte Order Mark)
    fn detect_bom(&self, data: &[u8]) -> Option<Encoding> {
        [Encoding::UTF8_BOM, Encoding::UTF16LE, Encoding::UTF16BE]
            .into_iter()
            .find(|enc| enc.bom().is_some_and(|bom| data.starts_with(bom)))
    }

    /// Guess BOM-less UTF-16 from where the zero bytes fall. ASCII text in
    /// UTF-16BE has a zero high byte at every even offset, UTF-16LE at
    /// every odd one.
    fn detect_zero_parity(&self, data: &[u8]) -> Option<Encoding> {
        if data.len() < PARITY_MIN_LEN {
            return None;
        }

        let window = &data[..data.len().min(PARITY_WINDOW)];
        let (even, odd) = window
            .iter()
            .enumerate()
            .filter(|&(_, &byte)| byte == 0)
            .fold((0usize, 0usize), |(even, odd), (i, _)| {
                if i % 2 == 0 {
                    (even + 1, odd)
                } else {
                    (even, odd + 1)
                }
            });

        if even > PARITY_THRESHOLD && odd == 0 {
            Some(Encoding::UTF16BE)
        } else if odd > PARITY_THRESHOLD && even == 0 {
            Some(Encoding::UTF16LE)
        } else {
            None
        }
    }
}

/// Detect the encoding of `data` with the default detector
pub fn detect_encoding(data: &[u8]) -> Encoding {
    EncodingDetector::new().detect(data).encoding
}
