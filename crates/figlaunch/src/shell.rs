//! POSIX shell quoting for generated scripts

use std::borrow::Cow;

/// Characters that never need quoting in a shell word
fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '=' | '@' | '%' | '+' | ',')
}

/// Quote a token only when the shell would otherwise split or expand it
pub fn quote(token: &str) -> Cow<'_, str> {
    if !token.is_empty() && token.chars().all(is_safe_char) {
        Cow::Borrowed(token)
    } else {
        Cow::Owned(single_quote(token))
    }
}

/// Quote a host path while keeping `$VAR` and a leading `~` expandable.
///
/// `~/my data` becomes `~/"my data"`; `$PWD/x` stays as is.
pub fn quote_expandable(token: &str) -> Cow<'_, str> {
    if !token.is_empty() && token.chars().all(|c| is_safe_char(c) || c == '$' || c == '~') {
        return Cow::Borrowed(token);
    }

    let (home, rest) = match token.strip_prefix("~/") {
        Some(rest) => ("~/", rest),
        None => ("", token),
    };

    let mut out = String::with_capacity(token.len() + 2);
    out.push_str(home);
    out.push('"');
    for c in rest.chars() {
        if matches!(c, '"' | '\\' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    Cow::Owned(out)
}

/// Wrap a value in single quotes, escaping embedded single quotes.
///
/// `it's` becomes `'it'\''s'`.
pub fn single_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}
