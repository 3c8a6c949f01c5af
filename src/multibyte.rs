//! Variable-length Unicode transforms: UTF-8 and UTF-16
//!
//! Decoders never reject malformed text. Every input byte ends up in
//! exactly one `CodePoint`, and anything that does not parse becomes
//! U+FFFD or, for a stray continuation byte, a value in the
//! 0xDC80-0xDCFF escape band.

use crate::{CodePoint, ESCAPE_BASE, Error, REPLACEMENT, Result};

/// Byte order of UTF-16 code units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

impl ByteOrder {
    #[inline]
    fn read(self, pair: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes(pair),
            ByteOrder::Big => u16::from_be_bytes(pair),
        }
    }

    #[inline]
    fn write(self, unit: u16) -> [u8; 2] {
        match self {
            ByteOrder::Little => unit.to_le_bytes(),
            ByteOrder::Big => unit.to_be_bytes(),
        }
    }
}

/// UTF-8 byte order mark
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[inline]
pub(crate) fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Sequence length announced by a leading byte, `None` if the byte can
/// not start a sequence (continuation bytes and 0xF8-0xFF).
#[inline]
pub(crate) fn sequence_length(first: u8) -> Option<usize> {
    if first < 0x80 {
        Some(1)
    } else if first & 0xE0 == 0xC0 {
        Some(2)
    } else if first & 0xF0 == 0xE0 {
        Some(3)
    } else if first & 0xF8 == 0xF0 {
        Some(4)
    } else {
        None
    }
}

/// Decode one complete sequence whose length was taken from its leading
/// byte. Rejects bad continuation bytes, overlong forms, surrogates and
/// values above U+10FFFF.
pub(crate) fn decode_sequence(seq: &[u8]) -> Option<u32> {
    let (&first, tail) = seq.split_first()?;
    if !tail.iter().all(|&b| is_continuation(b)) {
        return None;
    }
    let payload = |lead_mask: u8| {
        tail.iter().fold(u32::from(first & lead_mask), |acc, &b| {
            (acc << 6) | u32::from(b & 0x3F)
        })
    };

    match seq.len() {
        1 => (first < 0x80).then_some(u32::from(first)),
        2 => {
            let cp = payload(0x1F);
            (0x80..=0x7FF).contains(&cp).then_some(cp)
        }
        3 => {
            let cp = payload(0x0F);
            (cp >= 0x800 && !(0xD800..=0xDFFF).contains(&cp)).then_some(cp)
        }
        4 => {
            let cp = payload(0x07);
            (0x10000..=0x10FFFF).contains(&cp).then_some(cp)
        }
        _ => None,
    }
}

/// Check `input` against the UTF-8 grammar. A sequence cut short by the
/// end of the buffer is accepted.
pub fn is_valid_utf8(input: &[u8]) -> bool {
    let mut pos = 0;
    while pos < input.len() {
        let Some(len) = sequence_length(input[pos]) else {
            return false;
        };
        if pos + len > input.len() {
            return true;
        }
        if decode_sequence(&input[pos..pos + len]).is_none() {
            return false;
        }
        pos += len;
    }
    true
}

/// Decode UTF-8 into `out`
pub fn decode_utf8_into(input: &[u8], out: &mut Vec<CodePoint>) {
    let mut pos = 0;
    while pos < input.len() {
        let first = input[pos];

        if is_continuation(first) {
            out.push(CodePoint {
                value: ESCAPE_BASE + u32::from(first & 0x7F),
                source_len: 1,
            });
            pos += 1;
            continue;
        }

        let Some(len) = sequence_length(first) else {
            out.push(CodePoint::replacement(1));
            pos += 1;
            continue;
        };

        let remaining = input.len() - pos;
        if len > remaining {
            out.push(CodePoint::replacement(remaining));
            break;
        }

        let value = decode_sequence(&input[pos..pos + len]).unwrap_or(REPLACEMENT);
        out.push(CodePoint {
            value,
            source_len: len,
        });
        pos += len;
    }
}

/// Decode UTF-8 bytes into code points
pub fn decode_utf8(input: &[u8]) -> Vec<CodePoint> {
    let mut out = Vec::with_capacity(input.len());
    decode_utf8_into(input, &mut out);
    out
}

/// Decode UTF-16 into `out`. The input must not carry a BOM; BOM handling
/// belongs to the caller.
pub fn decode_utf16_into(input: &[u8], order: ByteOrder, out: &mut Vec<CodePoint>) -> Result<()> {
    if input.len() % 2 != 0 {
        return Err(Error::OddUtf16Length {
            operation: "UTF-16 decode",
            length: input.len(),
        });
    }

    let mut units = input
        .chunks_exact(2)
        .map(|pair| order.read([pair[0], pair[1]]))
        .peekable();

    while let Some(unit) = units.next() {
        let cp = match unit {
            0xD800..=0xDBFF => match units.peek() {
                Some(&low) if (0xDC00..=0xDFFF).contains(&low) => {
                    units.next();
                    let value =
                        0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                    CodePoint {
                        value,
                        source_len: 4,
                    }
                }
                _ => CodePoint::replacement(2),
            },
            0xDC00..=0xDFFF => CodePoint::replacement(2),
            _ => CodePoint {
                value: u32::from(unit),
                source_len: 2,
            },
        };
        out.push(cp);
    }

    Ok(())
}

/// Decode UTF-16 bytes into code points
pub fn decode_utf16(input: &[u8], order: ByteOrder) -> Result<Vec<CodePoint>> {
    let mut out = Vec::with_capacity(input.len() / 2);
    decode_utf16_into(input, order, &mut out)?;
    Ok(out)
}

/// Scalar value to emit for a code point; surrogates, escape-band values
/// and anything above U+10FFFF become U+FFFD.
#[inline]
fn scalar(value: u32) -> char {
    char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Encode code points as UTF-8 into `out`, optionally prefixed with a BOM
pub fn encode_utf8_into(chars: &[CodePoint], with_bom: bool, out: &mut Vec<u8>) {
    if with_bom {
        out.extend_from_slice(&UTF8_BOM);
    }
    let mut buf = [0u8; 4];
    for cp in chars {
        out.extend_from_slice(scalar(cp.value).encode_utf8(&mut buf).as_bytes());
    }
}

/// Encode code points as UTF-8
pub fn encode_utf8(chars: &[CodePoint], with_bom: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(chars.len() * 4 + UTF8_BOM.len());
    encode_utf8_into(chars, with_bom, &mut out);
    out
}

/// Encode code points as UTF-16 into `out`, without a BOM
pub fn encode_utf16_into(chars: &[CodePoint], order: ByteOrder, out: &mut Vec<u8>) {
    let mut buf = [0u16; 2];
    for cp in chars {
        for &unit in scalar(cp.value).encode_utf16(&mut buf).iter() {
            out.extend_from_slice(&order.write(unit));
        }
    }
}

/// Encode code points as UTF-16
pub fn encode_utf16(chars: &[CodePoint], order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(chars.len() * 4);
    encode_utf16_into(chars, order, &mut out);
    out
}
