use std::fmt::Write;

/// Characters that end a bare (unquoted) name.
#[inline]
pub(crate) fn is_name_terminator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '=' | '{' | '}' | '"' | ';')
}

/// Characters that end a bare (unquoted) value.
#[inline]
pub(crate) fn is_value_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | ';' | '}')
}

#[inline]
fn is_plain(c: char, ascii: bool) -> bool {
    !c.is_control() && (!ascii || c.is_ascii())
}

/// True if `name` can be written without quotes and read back unchanged.
pub(crate) fn is_bare_name(name: &str, ascii: bool) -> bool {
    !name.is_empty()
        && !name.starts_with("//")
        && name
            .chars()
            .all(|c| !is_name_terminator(c) && c != '\\' && is_plain(c, ascii))
}

/// True if `value` can be written without quotes and read back unchanged.
pub(crate) fn is_bare_value(value: &str, ascii: bool) -> bool {
    let (Some(first), Some(last)) = (value.chars().next(), value.chars().next_back()) else {
        return false;
    };

    !first.is_whitespace()
        && !last.is_whitespace()
        && first != '"'
        && value
            .chars()
            .all(|c| !is_value_terminator(c) && c != '\\' && is_plain(c, ascii))
}

/// Appends `input` as a double-quoted string, escaping as needed.
///
/// Quotes, backslashes and the common control characters get their short escapes;
/// other control characters (and, with `ascii` set, every non-ASCII character)
/// are written as `\u{XXXX}`.
pub(crate) fn push_quoted(input: &str, ascii: bool, out: &mut String) {
    out.reserve(input.len() + 2);
    out.push('"');

    let mut safe_from = 0;
    for (i, c) in input.char_indices() {
        let short = match c {
            '"' => Some("\\\""),
            '\\' => Some("\\\\"),
            '\n' => Some("\\n"),
            '\r' => Some("\\r"),
            '\t' => Some("\\t"),
            _ => None,
        };

        if short.is_none() && is_plain(c, ascii) {
            continue;
        }

        // flush preceding safe range
        out.push_str(&input[safe_from..i]);
        safe_from = i + c.len_utf8();

        match short {
            Some(escape) => out.push_str(escape),
            None => {
                let _ = write!(out, "\\u{{{:04X}}}", c as u32);
            }
        }
    }
    out.push_str(&input[safe_from..]);

    out.push('"');
}

/// Appends one comment line. Comments are not unescaped on read, so only ascii
/// mode rewrites anything: non-ASCII characters become `\u{XXXX}`.
pub(crate) fn push_comment_line(line: &str, ascii: bool, out: &mut String) {
    if !ascii || line.is_ascii() {
        out.push_str(line);
        return;
    }

    for c in line.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let _ = write!(out, "\\u{{{:04X}}}", c as u32);
        }
    }
}
