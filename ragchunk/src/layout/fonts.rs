//! Font resources: style flags, glyph widths and code → text decoding.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, Stream};

use super::{StyleFlags, cmap::ToUnicodeMap};

const FLAG_FIXED_PITCH: i64 = 1;
const FLAG_ITALIC: i64 = 1 << 6;
const FLAG_FORCE_BOLD: i64 = 1 << 18;

/// Follows indirect references (bounded, to survive reference loops).
pub(crate) fn resolve<'a>(doc: &'a Document, mut obj: &'a Object) -> Option<&'a Object> {
    for _ in 0..8 {
        match obj {
            Object::Reference(id) => obj = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

pub(crate) fn get<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|obj| resolve(doc, obj))
}

pub(crate) fn as_dict(obj: &Object) -> Option<&Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

pub(crate) fn get_dict<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    get(doc, dict, key).and_then(as_dict)
}

pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

pub(crate) fn name(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::Name(name) => Some(name.as_slice()),
        _ => None,
    }
}

pub(crate) fn stream_bytes(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

#[derive(Debug, Clone)]
enum Widths {
    Simple {
        first_char: u32,
        widths: Vec<f32>,
        missing: f32,
    },
    Composite {
        widths: HashMap<u32, f32>,
        default: f32,
    },
}

/// One decoded character code.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DecodedGlyph {
    pub text: String,
    /// Horizontal advance in glyph space (thousandths of an em).
    pub width: f32,
    /// Single-byte code 32, which receives word spacing.
    pub is_word_space: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct FontInfo {
    pub flags: StyleFlags,
    composite: bool,
    widths: Widths,
    to_unicode: Option<ToUnicodeMap>,
    differences: HashMap<u8, String>,
}

impl FontInfo {
    /// Used when a `Tf` names a font missing from the resources.
    pub(crate) fn fallback() -> Self {
        Self {
            flags: StyleFlags::PLAIN,
            composite: false,
            widths: Widths::Simple {
                first_char: 0,
                widths: Vec::new(),
                missing: 500.0,
            },
            to_unicode: None,
            differences: HashMap::new(),
        }
    }

    pub(crate) fn load(doc: &Document, font: &Dictionary) -> Self {
        let subtype = get(doc, font, b"Subtype").and_then(name).unwrap_or_default();
        let composite = subtype == b"Type0";
        let descendant = if composite {
            get(doc, font, b"DescendantFonts")
                .and_then(|obj| match obj {
                    Object::Array(items) => items.first().and_then(|item| resolve(doc, item)),
                    _ => None,
                })
                .and_then(as_dict)
        } else {
            None
        };

        let base_font = get(doc, font, b"BaseFont")
            .and_then(name)
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .unwrap_or_default();

        let descriptor = descendant
            .and_then(|desc| get_dict(doc, desc, b"FontDescriptor"))
            .or_else(|| get_dict(doc, font, b"FontDescriptor"));
        let descriptor_flags = descriptor
            .and_then(|desc| get(doc, desc, b"Flags"))
            .and_then(|obj| match obj {
                Object::Integer(value) => Some(*value),
                _ => None,
            })
            .unwrap_or(0);
        let flags = flags_from_descriptor(descriptor_flags).union(flags_from_name(&base_font));

        let widths = match descendant {
            Some(desc) => composite_widths(doc, desc),
            None => {
                let fallback = if flags.monospace { 600.0 } else { 500.0 };
                let missing = descriptor
                    .and_then(|desc| get(doc, desc, b"MissingWidth"))
                    .and_then(number)
                    .filter(|w| *w > 0.0)
                    .unwrap_or(fallback);
                simple_widths(doc, font, missing)
            }
        };

        let to_unicode = match get(doc, font, b"ToUnicode") {
            Some(Object::Stream(stream)) => {
                let cmap = ToUnicodeMap::parse(&stream_bytes(stream));
                (!cmap.is_empty()).then_some(cmap)
            }
            _ => None,
        };

        let differences = if composite {
            HashMap::new()
        } else {
            encoding_differences(doc, font)
        };

        Self {
            flags,
            composite,
            widths,
            to_unicode,
            differences,
        }
    }

    fn code_width(&self) -> usize {
        match self.to_unicode.as_ref().and_then(ToUnicodeMap::code_width) {
            Some(width) if self.composite => width.clamp(1, 4),
            _ if self.composite => 2,
            _ => 1,
        }
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> Vec<DecodedGlyph> {
        let step = self.code_width();
        bytes
            .chunks(step)
            .map(|chunk| {
                let code = chunk
                    .iter()
                    .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));
                DecodedGlyph {
                    text: self.code_text(code),
                    width: self.glyph_width(code),
                    is_word_space: step == 1 && code == 32,
                }
            })
            .collect()
    }

    fn code_text(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|map| map.lookup(code)) {
            return text.to_string();
        }
        if self.composite {
            return char::from_u32(code)
                .filter(|ch| !ch.is_control())
                .map(String::from)
                .unwrap_or_default();
        }
        let byte = code as u8;
        if let Some(text) = self.differences.get(&byte) {
            return text.clone();
        }
        win_ansi(byte).map(String::from).unwrap_or_default()
    }

    fn glyph_width(&self, code: u32) -> f32 {
        match &self.widths {
            Widths::Simple {
                first_char,
                widths,
                missing,
            } => code
                .checked_sub(*first_char)
                .and_then(|idx| widths.get(idx as usize))
                .copied()
                .filter(|w| *w > 0.0)
                .unwrap_or(*missing),
            Widths::Composite { widths, default } => {
                widths.get(&code).copied().unwrap_or(*default)
            }
        }
    }
}

fn flags_from_descriptor(flags: i64) -> StyleFlags {
    StyleFlags {
        monospace: flags & FLAG_FIXED_PITCH != 0,
        bold: flags & FLAG_FORCE_BOLD != 0,
        italic: flags & FLAG_ITALIC != 0,
    }
}

fn flags_from_name(base_font: &str) -> StyleFlags {
    // Drop the six-letter subset tag, e.g. "ABCDEF+Courier".
    let name = base_font
        .split_once('+')
        .map_or(base_font, |(_, rest)| rest)
        .to_ascii_lowercase();
    StyleFlags {
        monospace: ["courier", "mono", "consolas", "menlo", "code"]
            .iter()
            .any(|needle| name.contains(needle)),
        bold: ["bold", "black", "heavy", "semibold", "demi"]
            .iter()
            .any(|needle| name.contains(needle)),
        italic: ["italic", "oblique"].iter().any(|needle| name.contains(needle)),
    }
}

fn simple_widths(doc: &Document, font: &Dictionary, missing: f32) -> Widths {
    let first_char = get(doc, font, b"FirstChar")
        .and_then(number)
        .map_or(0, |value| value.max(0.0) as u32);
    let widths = match get(doc, font, b"Widths") {
        Some(Object::Array(items)) => items
            .iter()
            .map(|item| resolve(doc, item).and_then(number).unwrap_or(0.0))
            .collect(),
        _ => Vec::new(),
    };
    Widths::Simple {
        first_char,
        widths,
        missing,
    }
}

/// Reads a CID font's `/W` array: `c [w1 w2 ...]` and `c_first c_last w` forms.
fn composite_widths(doc: &Document, descendant: &Dictionary) -> Widths {
    let default = get(doc, descendant, b"DW")
        .and_then(number)
        .unwrap_or(1000.0);
    let mut widths = HashMap::new();
    if let Some(Object::Array(items)) = get(doc, descendant, b"W") {
        let items: Vec<&Object> = items.iter().filter_map(|item| resolve(doc, item)).collect();
        let mut idx = 0;
        while idx + 1 < items.len() {
            let Some(first) = number(items[idx]) else {
                break;
            };
            let first = first.max(0.0) as u32;
            match items[idx + 1] {
                Object::Array(run) => {
                    for (offset, width) in run.iter().enumerate().take(0x10000) {
                        let Some(code) = u32::try_from(offset)
                            .ok()
                            .and_then(|offset| first.checked_add(offset))
                        else {
                            break;
                        };
                        if let Some(width) = resolve(doc, width).and_then(number) {
                            widths.insert(code, width);
                        }
                    }
                    idx += 2;
                }
                other => {
                    let (Some(last), Some(width)) =
                        (number(other), items.get(idx + 2).and_then(|obj| number(obj)))
                    else {
                        break;
                    };
                    let last = last.max(0.0) as u32;
                    if last >= first && last - first <= 0xFFFF {
                        for code in first..=last {
                            widths.insert(code, width);
                        }
                    }
                    idx += 3;
                }
            }
        }
    }
    Widths::Composite { widths, default }
}

fn encoding_differences(doc: &Document, font: &Dictionary) -> HashMap<u8, String> {
    let mut differences = HashMap::new();
    let Some(encoding) = get_dict(doc, font, b"Encoding") else {
        return differences;
    };
    let Some(Object::Array(items)) = get(doc, encoding, b"Differences") else {
        return differences;
    };
    let mut code: u32 = 0;
    for item in items {
        match resolve(doc, item) {
            Some(Object::Integer(start)) => code = (*start).clamp(0, 255) as u32,
            Some(Object::Name(glyph)) => {
                if let (Ok(byte), Some(text)) = (u8::try_from(code), glyph_name_text(glyph)) {
                    differences.insert(byte, text);
                }
                code += 1;
            }
            _ => {}
        }
    }
    differences
}

fn glyph_name_text(glyph: &[u8]) -> Option<String> {
    let glyph = std::str::from_utf8(glyph).ok()?;
    if let Some(hex) = glyph.strip_prefix("uni") {
        return u32::from_str_radix(hex.get(..4)?, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }
    let mut chars = glyph.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Some(ch.to_string());
    }
    let text = match glyph {
        "space" => " ",
        "bullet" => "•",
        "periodcentered" => "·",
        "endash" => "–",
        "emdash" => "—",
        "hyphen" => "-",
        "quoteleft" => "‘",
        "quoteright" => "’",
        "quotedblleft" => "“",
        "quotedblright" => "”",
        "quotesingle" => "'",
        "quotedbl" => "\"",
        "period" => ".",
        "comma" => ",",
        "colon" => ":",
        "semicolon" => ";",
        "exclam" => "!",
        "question" => "?",
        "parenleft" => "(",
        "parenright" => ")",
        "bracketleft" => "[",
        "bracketright" => "]",
        "slash" => "/",
        "ampersand" => "&",
        "less" => "<",
        "greater" => ">",
        "fi" => "fi",
        "fl" => "fl",
        "ff" => "ff",
        "zero" => "0",
        "one" => "1",
        "two" => "2",
        "three" => "3",
        "four" => "4",
        "five" => "5",
        "six" => "6",
        "seven" => "7",
        "eight" => "8",
        "nine" => "9",
        _ => return None,
    };
    Some(text.to_string())
}

/// WinAnsiEncoding; bytes outside 0x80..=0x9F coincide with Latin-1.
fn win_ansi(byte: u8) -> Option<char> {
    let ch = match byte {
        0x80 => '€',
        0x82 => '‚',
        0x83 => 'ƒ',
        0x84 => '„',
        0x85 => '…',
        0x86 => '†',
        0x87 => '‡',
        0x88 => 'ˆ',
        0x89 => '‰',
        0x8A => 'Š',
        0x8B => '‹',
        0x8C => 'Œ',
        0x8E => 'Ž',
        0x91 => '‘',
        0x92 => '’',
        0x93 => '“',
        0x94 => '”',
        0x95 => '•',
        0x96 => '–',
        0x97 => '—',
        0x98 => '˜',
        0x99 => '™',
        0x9A => 'š',
        0x9B => '›',
        0x9C => 'œ',
        0x9E => 'ž',
        0x9F => 'Ÿ',
        0x80..=0x9F => return None,
        other => char::from(other),
    };
    (!ch.is_control() || ch == '\t').then_some(ch)
}
