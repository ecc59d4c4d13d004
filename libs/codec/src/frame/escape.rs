//! Backslash escaping for frame text fields
//!
//! Structural characters `\ [ ] ; { } ,` are prefixed with a backslash; CR and
//! LF become `\r` and `\n` so a frame stays on one line.

pub(super) const ESCAPE: char = '\\';

fn is_structural(c: char) -> bool {
    matches!(c, '\\' | '[' | ']' | ';' | '{' | '}' | ',')
}

pub(super) fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if is_structural(c) => {
                out.push(ESCAPE);
                out.push(c);
            }
            c => out.push(c),
        }
    }
}

/// Character produced by the escape sequence `\c`
pub(super) fn unescape_char(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_structural_and_line_breaks() {
        let mut out = String::new();
        escape_into(&mut out, "a[b];{c},d\\e\r\n");
        assert_eq!(out, "a\\[b\\]\\;\\{c\\}\\,d\\\\e\\r\\n");
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        let mut out = String::new();
        escape_into(&mut out, "héllo wörld 42");
        assert_eq!(out, "héllo wörld 42");
    }
}
