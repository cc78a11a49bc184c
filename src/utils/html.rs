use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Named references browsers accept without the closing `;`.
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren",
    "deg", "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34",
    "gt", "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

/// Code points 0x80..=0x9F in character references mean their Windows-1252
/// characters.
const WINDOWS_1252: [u32; 32] = [
    0x20AC, 0x81, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160, 0x2039,
    0x0152, 0x8D, 0x017D, 0x8F, 0x90, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014,
    0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0x9D, 0x017E, 0x0178,
];

static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+;?|#[0-9]+;?|[A-Za-z][A-Za-z0-9]*;?)").unwrap()
});

/// Decodes HTML character references in one pass, the way browsers read
/// text content: numeric references, named references and the legacy names
/// that may omit the semicolon (`&amp x`, `B&auml`). Unknown references are
/// kept as written.
pub fn unescape_html(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    REFERENCE
        .replace_all(text, |caps: &Captures| decode_reference(&caps[1]))
        .into_owned()
}

fn decode_reference(reference: &str) -> String {
    if let Some(number) = reference.strip_prefix('#') {
        return decode_numeric(number.trim_end_matches(';'));
    }
    if reference.ends_with(';') {
        let entity = format!("&{}", reference);
        let decoded = html_escape::decode_html_entities(&entity);
        if decoded != entity {
            return decoded.into_owned();
        }
    }
    let longest = LEGACY_ENTITIES
        .iter()
        .filter(|name| reference.starts_with(**name))
        .max_by_key(|name| name.len());
    match longest {
        Some(name) => {
            let decoded = html_escape::decode_html_entities(&format!("&{};", name)).into_owned();
            decoded + &reference[name.len()..]
        }
        None => format!("&{}", reference),
    }
}

fn decode_numeric(number: &str) -> String {
    let parsed = match number.strip_prefix(|c| c == 'x' || c == 'X') {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => number.parse::<u32>(),
    };
    let Ok(code) = parsed else {
        return '\u{FFFD}'.to_string();
    };
    match code {
        0 | 0xD800..=0xDFFF | 0x11_0000..=u32::MAX => '\u{FFFD}'.to_string(),
        0x0D => '\r'.to_string(),
        0x80..=0x9F => char::from_u32(WINDOWS_1252[(code - 0x80) as usize])
            .map(String::from)
            .unwrap_or_default(),
        0x01..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F | 0xFDD0..=0xFDEF => String::new(),
        _ if code & 0xFFFE == 0xFFFE => String::new(),
        _ => char::from_u32(code)
            .map(String::from)
            .unwrap_or_else(|| '\u{FFFD}'.to_string()),
    }
}
