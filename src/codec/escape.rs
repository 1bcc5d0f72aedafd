//! Escaping of argument values in the text format.
//!
//! Values are free text but a line must stay one line: `\`, newline and
//! carriage return are written as `\\`, `\n` and `\r`.

use std::borrow::Cow;

/// Escape a value for a single text line
pub fn escape_arg(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', '\n', '\r']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Reverse [`escape_arg`]
///
/// # Errors
/// A description of the first unknown or dangling escape sequence
pub fn unescape_arg(text: &str) -> Result<String, String> {
    let mut value = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => value.push('\\'),
            Some('n') => value.push('\n'),
            Some('r') => value.push('\r'),
            Some(other) => return Err(format!("unknown escape `\\{}` in argument", other)),
            None => return Err("argument ends with a lone `\\`".to_string()),
        }
    }
    Ok(value)
}
