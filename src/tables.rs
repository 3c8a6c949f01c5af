//! Single-byte Cyrillic code pages
//!
//! Each table covers the upper half of the code page (bytes 0x80-0xFF);
//! the lower half is plain ASCII. A zero entry marks a byte the code page
//! leaves unassigned.

use crate::{CodePoint, Encoding, REPLACEMENT};

/// Windows-1251 (Windows Cyrillic), bytes 0x80-0xFF
pub static WINDOWS_1251: [u16; 128] = [
    0x0402, 0x0403, 0x201A, 0x0453, 0x201E, 0x2026, 0x2020, 0x2021, // 0x80
    0x20AC, 0x2030, 0x0409, 0x2039, 0x040A, 0x040C, 0x040B, 0x040F, // 0x88
    0x0452, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, // 0x90
    0x0000, 0x2122, 0x0459, 0x203A, 0x045A, 0x045C, 0x045B, 0x045F, // 0x98
    0x00A0, 0x040E, 0x045E, 0x0408, 0x00A4, 0x0490, 0x00A6, 0x00A7, // 0xA0
    0x0401, 0x00A9, 0x0404, 0x00AB, 0x00AC, 0x00AD, 0x00AE, 0x0407, // 0xA8
    0x00B0, 0x00B1, 0x0406, 0x0456, 0x0491, 0x00B5, 0x00B6, 0x00B7, // 0xB0
    0x0451, 0x2116, 0x0454, 0x00BB, 0x0458, 0x0405, 0x0455, 0x0457, // 0xB8
    0x0410, 0x0411, 0x0412, 0x0413, 0x0414, 0x0415, 0x0416, 0x0417, // 0xC0
    0x0418, 0x0419, 0x041A, 0x041B, 0x041C, 0x041D, 0x041E, 0x041F, // 0xC8
    0x0420, 0x0421, 0x0422, 0x0423, 0x0424, 0x0425, 0x0426, 0x0427, // 0xD0
    0x0428, 0x0429, 0x042A, 0x042B, 0x042C, 0x042D, 0x042E, 0x042F, // 0xD8
    0x0430, 0x0431, 0x0432, 0x0433, 0x0434, 0x0435, 0x0436, 0x0437, // 0xE0
    0x0438, 0x0439, 0x043A, 0x043B, 0x043C, 0x043D, 0x043E, 0x043F, // 0xE8
    0x0440, 0x0441, 0x0442, 0x0443, 0x0444, 0x0445, 0x0446, 0x0447, // 0xF0
    0x0448, 0x0449, 0x044A, 0x044B, 0x044C, 0x044D, 0x044E, 0x044F, // 0xF8
];

/// DOS code page 866 (Russian OEM), bytes 0x80-0xFF
pub static CP_866: [u16; 128] = [
    0x0410, 0x0411, 0x0412, 0x0413, 0x0414, 0x0415, 0x0416, 0x0417, // 0x80
    0x0418, 0x0419, 0x041A, 0x041B, 0x041C, 0x041D, 0x041E, 0x041F, // 0x88
    0x0420, 0x0421, 0x0422, 0x0423, 0x0424, 0x0425, 0x0426, 0x0427, // 0x90
    0x0428, 0x0429, 0x042A, 0x042B, 0x042C, 0x042D, 0x042E, 0x042F, // 0x98
    0x0430, 0x0431, 0x0432, 0x0433, 0x0434, 0x0435, 0x0436, 0x0437, // 0xA0
    0x0438, 0x0439, 0x043A, 0x043B, 0x043C, 0x043D, 0x043E, 0x043F, // 0xA8
    0x2591, 0x2592, 0x2593, 0x2502, 0x2524, 0x2561, 0x2562, 0x2556, // 0xB0
    0x2555, 0x2563, 0x2551, 0x2557, 0x255D, 0x255C, 0x255B, 0x2510, // 0xB8
    0x2514, 0x2534, 0x252C, 0x251C, 0x2500, 0x253C, 0x255E, 0x255F, // 0xC0
    0x255A, 0x2554, 0x2569, 0x2566, 0x2560, 0x2550, 0x256C, 0x2567, // 0xC8
    0x2568, 0x2564, 0x2565, 0x2559, 0x2558, 0x2552, 0x2553, 0x256B, // 0xD0
    0x256A, 0x2518, 0x250C, 0x2588, 0x2584, 0x258C, 0x2590, 0x2580, // 0xD8
    0x0440, 0x0441, 0x0442, 0x0443, 0x0444, 0x0445, 0x0446, 0x0447, // 0xE0
    0x0448, 0x0449, 0x044A, 0x044B, 0x044C, 0x044D, 0x044E, 0x044F, // 0xE8
    0x0401, 0x0451, 0x0404, 0x0454, 0x0407, 0x0457, 0x0406, 0x0456, // 0xF0
    0x0490, 0x0491, 0x040E, 0x045E, 0x0408, 0x0458, 0x00A0, 0x00B0, // 0xF8
];

/// KOI8-R (Unix Cyrillic), bytes 0x80-0xFF
pub static KOI8_R: [u16; 128] = [
    0x2500, 0x2502, 0x250C, 0x2510, 0x2514, 0x2518, 0x251C, 0x2524, // 0x80
    0x252C, 0x2534, 0x253C, 0x2580, 0x2584, 0x2588, 0x258C, 0x2590, // 0x88
    0x2591, 0x2592, 0x2593, 0x2320, 0x25A0, 0x2219, 0x221A, 0x2248, // 0x90
    0x2264, 0x2265, 0x00A0, 0x2321, 0x00B0, 0x00B2, 0x00B7, 0x00F7, // 0x98
    0x2550, 0x2551, 0x2552, 0x0451, 0x2553, 0x2554, 0x2555, 0x2556, // 0xA0
    0x2557, 0x2558, 0x2559, 0x255A, 0x255B, 0x255C, 0x255D, 0x255E, // 0xA8
    0x255F, 0x2560, 0x2561, 0x0401, 0x2562, 0x2563, 0x2564, 0x2565, // 0xB0
    0x2566, 0x2567, 0x2568, 0x2569, 0x256A, 0x256B, 0x256C, 0x00A9, // 0xB8
    0x044E, 0x0430, 0x0431, 0x0446, 0x0434, 0x0435, 0x0444, 0x0433, // 0xC0
    0x0445, 0x0438, 0x0439, 0x043A, 0x043B, 0x043C, 0x043D, 0x043E, // 0xC8
    0x043F, 0x044F, 0x0440, 0x0441, 0x0442, 0x0443, 0x0436, 0x0432, // 0xD0
    0x044C, 0x044B, 0x0437, 0x0448, 0x044D, 0x0449, 0x0447, 0x044A, // 0xD8
    0x042E, 0x0410, 0x0411, 0x0426, 0x0414, 0x0415, 0x0424, 0x0413, // 0xE0
    0x0425, 0x0418, 0x0419, 0x041A, 0x041B, 0x041C, 0x041D, 0x041E, // 0xE8
    0x041F, 0x042F, 0x0420, 0x0421, 0x0422, 0x0423, 0x0416, 0x0412, // 0xF0
    0x042C, 0x042B, 0x0417, 0x0428, 0x042D, 0x0429, 0x0427, 0x042A, // 0xF8
];

/// Byte written when a code point has no slot in the table and the table
/// has no U+FFFD slot either.
pub const FALLBACK_BYTE: u8 = b'?';

/// Lookup table for one single-byte code page
#[derive(Debug, Clone, Copy)]
pub struct SingleByteTable {
    upper: &'static [u16; 128],
}

impl SingleByteTable {
    /// The table for `encoding`, or `None` for the Unicode encodings
    pub fn for_encoding(encoding: Encoding) -> Option<Self> {
        let upper = match encoding {
            Encoding::WINDOWS_1251 => &WINDOWS_1251,
            Encoding::CP_866 => &CP_866,
            Encoding::KOI8_R => &KOI8_R,
            _ => return None,
        };
        Some(Self::from_upper(upper))
    }

    /// Table over an arbitrary upper half, bytes 0x80-0xFF in order
    pub(crate) const fn from_upper(upper: &'static [u16; 128]) -> Self {
        Self { upper }
    }

    /// Code point for a single byte; unassigned bytes map to U+FFFD
    #[inline]
    pub fn decode_byte(&self, byte: u8) -> u32 {
        if byte < 0x80 {
            return u32::from(byte);
        }
        match self.upper[usize::from(byte - 0x80)] {
            0 => REPLACEMENT,
            unicode => u32::from(unicode),
        }
    }

    /// Exact reverse lookup, first match wins
    pub fn find(&self, value: u32) -> Option<u8> {
        if value < 0x80 {
            return Some(value as u8);
        }
        self.upper
            .iter()
            .position(|&entry| u32::from(entry) == value)
            .map(|index| 0x80 + index as u8)
    }

    /// Byte used for code points the table cannot represent: the table's
    /// own U+FFFD slot if it has one, `?` otherwise.
    pub fn replacement_byte(&self) -> u8 {
        self.find(REPLACEMENT).unwrap_or(FALLBACK_BYTE)
    }

    /// Byte for a code point, applying the replacement fallback
    pub fn encode_char(&self, value: u32) -> u8 {
        self.find(value).unwrap_or_else(|| self.replacement_byte())
    }

    /// Decode every byte of `input` into `out`, one code point per byte
    pub fn decode_into(&self, input: &[u8], out: &mut Vec<CodePoint>) {
        out.extend(input.iter().map(|&byte| CodePoint {
            value: self.decode_byte(byte),
            source_len: 1,
        }));
    }

    /// Encode `chars` into `out`, one byte per code point
    pub fn encode_into(&self, chars: &[CodePoint], out: &mut Vec<u8>) {
        let replacement = self.replacement_byte();
        out.extend(
            chars
                .iter()
                .map(|cp| self.find(cp.value).unwrap_or(replacement)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> [(Encoding, SingleByteTable); 3] {
        [Encoding::WINDOWS_1251, Encoding::CP_866, Encoding::KOI8_R]
            .map(|enc| (enc, SingleByteTable::for_encoding(enc).unwrap()))
    }

    #[test]
    fn unicode_encodings_have_no_table() {
        for enc in [
            Encoding::UTF8,
            Encoding::UTF8_BOM,
            Encoding::UTF16LE,
            Encoding::UTF16BE,
        ] {
            assert!(SingleByteTable::for_encoding(enc).is_none());
        }
    }

    #[test]
    fn ascii_passes_through() {
        for (_, table) in tables() {
            for byte in 0u8..0x80 {
                assert_eq!(table.decode_byte(byte), u32::from(byte));
                assert_eq!(table.encode_char(u32::from(byte)), byte);
            }
        }
    }

    #[test]
    fn upper_half_round_trips_or_falls_back() {
        for (enc, table) in tables() {
            for byte in 0x80u8..=0xFF {
                let back = table.encode_char(table.decode_byte(byte));
                assert!(
                    back == byte || back == table.replacement_byte(),
                    "{}: 0x{byte:02X} came back as 0x{back:02X}",
                    enc.name()
                );
            }
        }
    }

    #[test]
    fn cyrillic_alphabet_positions() {
        let cp1251 = SingleByteTable::for_encoding(Encoding::WINDOWS_1251).unwrap();
        let cp866 = SingleByteTable::for_encoding(Encoding::CP_866).unwrap();
        let koi8 = SingleByteTable::for_encoding(Encoding::KOI8_R).unwrap();

        // 'А' U+0410
        assert_eq!(cp1251.find(0x0410), Some(0xC0));
        assert_eq!(cp866.find(0x0410), Some(0x80));
        assert_eq!(koi8.find(0x0410), Some(0xE1));

        // 'я' U+044F
        assert_eq!(cp1251.find(0x044F), Some(0xFF));
        assert_eq!(cp866.find(0x044F), Some(0xEF));
        assert_eq!(koi8.find(0x044F), Some(0xD1));
    }

    #[test]
    fn unassigned_byte_decodes_to_replacement() {
        let cp1251 = SingleByteTable::for_encoding(Encoding::WINDOWS_1251).unwrap();
        assert_eq!(cp1251.decode_byte(0x98), REPLACEMENT);
        assert_eq!(cp1251.encode_char(REPLACEMENT), FALLBACK_BYTE);
    }

    #[test]
    fn euro_sign_is_lossy_in_cp866() {
        let cp866 = SingleByteTable::for_encoding(Encoding::CP_866).unwrap();
        assert_eq!(cp866.replacement_byte(), b'?');
        assert_eq!(cp866.encode_char(0x20AC), 0x3F);

        // Windows-1251 does carry the euro sign
        let cp1251 = SingleByteTable::for_encoding(Encoding::WINDOWS_1251).unwrap();
        assert_eq!(cp1251.encode_char(0x20AC), 0x88);
    }

    // U+0410.. in order, with U+FFFD at 0x85
    static WITH_REPLACEMENT_SLOT: [u16; 128] = {
        let mut upper = [0u16; 128];
        let mut i = 0;
        while i < 128 {
            upper[i] = 0x0410 + i as u16;
            i += 1;
        }
        upper[5] = 0xFFFD;
        upper
    };

    #[test]
    fn unmappable_values_use_the_tables_own_replacement_slot() {
        let table = SingleByteTable::from_upper(&WITH_REPLACEMENT_SLOT);
        assert_eq!(table.replacement_byte(), 0x85);
        assert_eq!(table.encode_char(0x20AC), 0x85);
        assert_eq!(table.encode_char(0x1F600), 0x85);
        assert_eq!(table.decode_byte(0x85), 0xFFFD);

        // mapped values are unaffected
        assert_eq!(table.encode_char(0x0410), 0x80);
        assert_eq!(table.encode_char(u32::from(b'A')), b'A');

        let chars = [0x0410, 0x20AC, 0x41].map(|value| CodePoint {
            value,
            source_len: 1,
        });
        let mut out = Vec::new();
        table.encode_into(&chars, &mut out);
        assert_eq!(out, vec![0x80, 0x85, 0x41]);

        // the shipped table has no such slot and keeps `?`
        let cp866 = SingleByteTable::from_upper(&CP_866);
        assert_eq!(cp866.encode_char(0x20AC), b'?');
    }

    #[test]
    fn escape_band_and_astral_values_fall_back() {
        for (_, table) in tables() {
            assert_eq!(table.encode_char(0xDC80), b'?');
            assert_eq!(table.encode_char(0x1F600), b'?');
            assert_eq!(table.encode_char(0x110000), b'?');
        }
    }

    #[test]
    fn decode_into_is_one_entry_per_byte() {
        let koi8 = SingleByteTable::for_encoding(Encoding::KOI8_R).unwrap();
        let mut out = Vec::new();
        koi8.decode_into(&[0xF0, 0xD2, 0xC9, b'!'], &mut out);

        let values: Vec<u32> = out.iter().map(|cp| cp.value).collect();
        assert_eq!(values, vec![0x041F, 0x0440, 0x0438, 0x21]);
        assert!(out.iter().all(|cp| cp.source_len == 1));
    }
}
