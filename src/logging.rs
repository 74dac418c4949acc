use std::borrow::Cow;

/// Default number of characters of a statement that may appear in a log record.
pub const DEFAULT_STATEMENT_LOG_LIMIT: usize = 100;

const SECRET_KEYWORDS: [&str; 2] = ["identified by", "password"];

/// Bounded, single-line excerpt of `sql` for log records.
///
/// Password literals are masked first (see [`redact_passwords`]). Whitespace
/// runs collapse to one space so multi-line statements stay on one log line;
/// anything past `limit` characters is replaced by `...`.
#[must_use]
pub fn statement_excerpt(sql: &str, limit: usize) -> Cow<'_, str> {
    match redact_passwords(sql) {
        Cow::Borrowed(s) => bounded(s, limit),
        Cow::Owned(s) => Cow::Owned(bounded(&s, limit).into_owned()),
    }
}

/// Replace the quoted literal after `IDENTIFIED BY` or `PASSWORD` with `'***'`.
#[must_use]
pub fn redact_passwords(sql: &str) -> Cow<'_, str> {
    let lower = sql.to_ascii_lowercase();
    let bytes = sql.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut search = 0;

    while let Some(keyword_end) = next_secret_keyword(&lower, search) {
        let mut start = keyword_end;
        while bytes.get(start).is_some_and(u8::is_ascii_whitespace) {
            start += 1;
        }
        if bytes.get(start) != Some(&b'\'') {
            search = keyword_end;
            continue;
        }
        let mut end = start + 1;
        loop {
            match bytes.get(end) {
                None => break,
                Some(b'\'') if bytes.get(end + 1) == Some(&b'\'') => end += 2,
                Some(b'\'') => {
                    end += 1;
                    break;
                }
                Some(_) => end += 1,
            }
        }
        let buf = out.get_or_insert_with(|| String::with_capacity(sql.len()));
        buf.push_str(&sql[copied..start]);
        buf.push_str("'***'");
        copied = end;
        search = end;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}

/// Display text of an error with password literals masked.
///
/// Some drivers quote the failing statement in their error message.
#[must_use]
pub fn error_text(err: &impl std::fmt::Display) -> String {
    let text = err.to_string();
    match redact_passwords(&text) {
        Cow::Borrowed(_) => text,
        Cow::Owned(masked) => masked,
    }
}

fn next_secret_keyword(lower: &str, from: usize) -> Option<usize> {
    SECRET_KEYWORDS
        .iter()
        .filter_map(|kw| lower[from..].find(kw).map(|pos| from + pos + kw.len()))
        .min()
}

fn bounded(sql: &str, limit: usize) -> Cow<'_, str> {
    let trimmed = sql.trim();
    let single_line = !trimmed.contains(|c: char| c.is_whitespace() && c != ' ')
        && !trimmed.contains("  ");
    if single_line && trimmed.chars().count() <= limit {
        return Cow::Borrowed(trimmed);
    }

    let mut out = String::with_capacity(limit.min(trimmed.len()) + 3);
    let mut taken = 0;
    let mut last_was_space = false;
    for c in trimmed.chars() {
        if c.is_whitespace() {
            if last_was_space {
                continue;
            }
            last_was_space = true;
        } else {
            last_was_space = false;
        }
        if taken == limit {
            out.push_str("...");
            return Cow::Owned(out);
        }
        out.push(if c.is_whitespace() { ' ' } else { c });
        taken += 1;
    }
    Cow::Owned(out)
}
