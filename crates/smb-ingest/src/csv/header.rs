//! Header normalization and delimiter sniffing.

/// Field delimiter detected from a file's first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Semicolon,
    /// The first line holds neither separator (single column or empty).
    Undetected,
}

impl Delimiter {
    /// Byte to hand to the CSV reader. Undetected files read as comma.
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Semicolon => b';',
            Delimiter::Comma | Delimiter::Undetected => b',',
        }
    }
}

/// Classifies a raw (unparsed) first line.
///
/// Any semicolon wins, even inside quotes: the sniff is deliberately
/// shallow.
pub fn sniff_line(line: &str) -> Delimiter {
    if line.contains(';') {
        Delimiter::Semicolon
    } else if line.contains(',') {
        Delimiter::Comma
    } else {
        Delimiter::Undetected
    }
}

/// Normalizes a header value: strips a BOM and surrounding whitespace.
pub fn normalize_header(value: &str) -> String {
    value.trim().trim_matches('\u{feff}').trim().to_string()
}
