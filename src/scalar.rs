use crate::value::Value;

/// Conversion of a raw token into a typed [`Value`].
///
/// Already typed values pass through unchanged, so callers holding a mix of
/// raw text and parsed values can coerce them uniformly.
pub trait Coerce {
    fn coerce(self) -> Value;
}

impl Coerce for &str {
    fn coerce(self) -> Value {
        coerce(self)
    }
}

impl Coerce for String {
    fn coerce(self) -> Value {
        coerce(&self)
    }
}

impl Coerce for &String {
    fn coerce(self) -> Value {
        coerce(self)
    }
}

impl Coerce for Value {
    fn coerce(self) -> Value {
        self
    }
}

/// Infer the typed value of a raw scalar token.
///
/// Quoted text is returned verbatim without its quotes. Unquoted text loses
/// everything from the first `#` outside a quoted span, then `true`, `false`
/// and `null` map to their literals and numeric text becomes a number.
/// Anything else stays a string.
pub fn coerce(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Some(inner) = unquote(trimmed) {
        return Value::String(inner.to_owned());
    }

    let text = strip_comment(trimmed);
    if let Some(inner) = unquote(text) {
        return Value::String(inner.to_owned());
    }

    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        "" => Value::String(String::new()),
        _ => match parse_number(text) {
            Some(number) => Value::Number(number),
            None => Value::String(text.to_owned()),
        },
    }
}

fn unquote(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.len() < 2 {
        return None;
    }

    let first = bytes[0];
    if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

/// Cut `text` at the first `#` that is not inside a quoted span.
fn strip_comment(text: &str) -> &str {
    let mut active_quote: Option<u8> = None;
    for (idx, byte) in text.bytes().enumerate() {
        match (active_quote, byte) {
            (Some(quote), _) if byte == quote => active_quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => active_quote = Some(byte),
            (None, b'#') => return text[..idx].trim(),
            (None, _) => {}
        }
    }
    text
}

fn parse_number(text: &str) -> Option<f64> {
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = text.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .ok()
                .map(|value| value as f64);
        }
    }

    if !is_decimal_literal(text) {
        return None;
    }
    text.parse::<f64>().ok()
}

// [+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?
fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut idx = 0usize;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        idx += 1;
    }

    let int_start = idx;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    let mut mantissa_digits = idx - int_start;

    if idx < bytes.len() && bytes[idx] == b'.' {
        idx += 1;
        let frac_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        mantissa_digits += idx - frac_start;
    }

    if mantissa_digits == 0 {
        return false;
    }

    if idx < bytes.len() && (bytes[idx] == b'e' || bytes[idx] == b'E') {
        idx += 1;
        if matches!(bytes.get(idx), Some(b'+' | b'-')) {
            idx += 1;
        }
        let exp_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == exp_start {
            return false;
        }
    }

    idx == bytes.len()
}
