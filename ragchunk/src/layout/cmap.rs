//! Minimal `ToUnicode` CMap reader: `bfchar` and `bfrange` sections only.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub(crate) struct ToUnicodeMap {
    map: HashMap<u32, String>,
    /// Byte width of source codes as declared by the codespace ranges.
    code_width: Option<usize>,
}

#[derive(Debug, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    Word(String),
    ArrayOpen,
    ArrayClose,
}

impl ToUnicodeMap {
    pub(crate) fn parse(data: &[u8]) -> Self {
        let tokens = tokenize(data);
        let mut cmap = ToUnicodeMap::default();
        let mut idx = 0;
        while idx < tokens.len() {
            match &tokens[idx] {
                Token::Word(word) if word == "begincodespacerange" => {
                    if let Some(Token::Hex(lo)) = tokens.get(idx + 1) {
                        cmap.code_width.get_or_insert(lo.len().max(1));
                    }
                    idx += 1;
                }
                Token::Word(word) if word == "beginbfchar" => {
                    idx += 1;
                    while let (Some(Token::Hex(src)), Some(Token::Hex(dst))) =
                        (tokens.get(idx), tokens.get(idx + 1))
                    {
                        cmap.map.insert(be_code(src), utf16_be(dst));
                        idx += 2;
                    }
                }
                Token::Word(word) if word == "beginbfrange" => {
                    idx += 1;
                    loop {
                        let (Some(Token::Hex(lo)), Some(Token::Hex(hi))) =
                            (tokens.get(idx), tokens.get(idx + 1))
                        else {
                            break;
                        };
                        let (lo, hi) = (be_code(lo), be_code(hi));
                        match tokens.get(idx + 2) {
                            Some(Token::Hex(dst)) => {
                                cmap.insert_range(lo, hi, dst);
                                idx += 3;
                            }
                            Some(Token::ArrayOpen) => {
                                idx += 3;
                                let mut code = lo;
                                while let Some(Token::Hex(dst)) = tokens.get(idx) {
                                    if code <= hi {
                                        cmap.map.insert(code, utf16_be(dst));
                                    }
                                    code = code.saturating_add(1);
                                    idx += 1;
                                }
                                if tokens.get(idx) == Some(&Token::ArrayClose) {
                                    idx += 1;
                                }
                            }
                            _ => break,
                        }
                    }
                }
                _ => idx += 1,
            }
        }
        cmap
    }

    fn insert_range(&mut self, lo: u32, hi: u32, dst: &[u8]) {
        if hi < lo || hi - lo > 0xFFFF {
            return;
        }
        let mut units: Vec<u16> = dst
            .chunks(2)
            .map(|pair| match pair {
                [a, b] => u16::from_be_bytes([*a, *b]),
                [a] => u16::from(*a),
                _ => 0,
            })
            .collect();
        for code in lo..=hi {
            self.map
                .insert(code, String::from_utf16_lossy(&units).replace('\0', ""));
            if let Some(last) = units.last_mut() {
                *last = last.wrapping_add(1);
            }
        }
    }

    pub(crate) fn code_width(&self) -> Option<usize> {
        self.code_width
    }

    pub(crate) fn lookup(&self, code: u32) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn be_code(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(4)
        .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte))
}

fn utf16_be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| match pair {
            [a, b] => u16::from_be_bytes([*a, *b]),
            [a] => u16::from(*a),
            _ => 0,
        })
        .collect();
    String::from_utf16_lossy(&units).replace('\0', "")
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut idx = 0;
    while idx < data.len() {
        let byte = data[idx];
        match byte {
            b'%' => {
                while idx < data.len() && data[idx] != b'\n' && data[idx] != b'\r' {
                    idx += 1;
                }
            }
            b'<' if data.get(idx + 1) == Some(&b'<') => idx += 2,
            b'>' if data.get(idx + 1) == Some(&b'>') => idx += 2,
            b'<' => {
                let start = idx + 1;
                let end = data[start..]
                    .iter()
                    .position(|b| *b == b'>')
                    .map_or(data.len(), |pos| start + pos);
                tokens.push(Token::Hex(decode_hex(&data[start..end])));
                idx = end + 1;
            }
            b'[' => {
                tokens.push(Token::ArrayOpen);
                idx += 1;
            }
            b']' => {
                tokens.push(Token::ArrayClose);
                idx += 1;
            }
            b'(' => {
                // Literal strings only appear in CMap headers; skip them.
                let mut depth = 0usize;
                while idx < data.len() {
                    match data[idx] {
                        b'\\' => idx += 1,
                        b'(' => depth += 1,
                        b')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    idx += 1;
                }
                idx += 1;
            }
            b if b.is_ascii_whitespace() => idx += 1,
            _ => {
                let start = idx;
                while idx < data.len()
                    && !data[idx].is_ascii_whitespace()
                    && !matches!(data[idx], b'<' | b'>' | b'[' | b']' | b'(' | b'/' | b'%')
                {
                    idx += 1;
                }
                if idx == start {
                    // A lone delimiter such as '/'.
                    idx += 1;
                    continue;
                }
                tokens.push(Token::Word(
                    String::from_utf8_lossy(&data[start..idx]).into_owned(),
                ));
            }
        }
    }
    tokens
}

fn decode_hex(raw: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = raw
        .iter()
        .filter_map(|b| (*b as char).to_digit(16).map(|d| d as u8))
        .collect();
    digits
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => (hi << 4) | lo,
            [hi] => hi << 4,
            _ => 0,
        })
        .collect()
}
