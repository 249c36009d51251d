use std::borrow::Cow;
use std::io::BufRead;
use std::path::Path;

use crate::error::Error;
use crate::model::{Entry, EnvTable};
use crate::scalar::coerce;

/// Parse `.env` entries from UTF-8 text.
///
/// Lines without a `=` separator are skipped, and a later duplicate key
/// replaces the earlier value.
pub fn parse_env(input: &str) -> EnvTable {
    parse_env_with_source(input, None)
}

/// Parse `.env` entries from UTF-8 bytes.
pub fn parse_env_bytes(input: &[u8]) -> Result<EnvTable, Error> {
    let text = std::str::from_utf8(input)?;
    Ok(parse_env(text))
}

/// Parse `.env` entries from a buffered reader.
pub fn parse_env_reader<R: BufRead>(mut reader: R) -> Result<EnvTable, Error> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    parse_env_bytes(&buf)
}

pub(crate) fn parse_env_with_source(input: &str, source: Option<&Path>) -> EnvTable {
    let normalized = normalize_newlines(input);

    let mut table = EnvTable::new();
    for (idx, line) in normalized.split('\n').enumerate() {
        let line_num = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        if let Some(entry) = parse_line(line, line_num, source) {
            table.insert(entry);
        }
    }
    table
}

pub(crate) fn normalize_newlines(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            out.push('\n');
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            continue;
        }
        out.push(ch);
    }

    Cow::Owned(out)
}

fn parse_line(line: &str, line_num: u32, source: Option<&Path>) -> Option<Entry> {
    let working = line.trim();
    if working.is_empty() || working.starts_with('#') {
        return None;
    }

    let (key, raw) = working.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let raw = raw.trim();
    Some(Entry {
        key: key.to_owned(),
        value: coerce(raw),
        raw: raw.to_owned(),
        source: source.map(Path::to_path_buf),
        line: line_num,
    })
}
