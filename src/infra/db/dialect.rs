use std::borrow::Cow;
use std::fmt::Write;

/// Placeholder convention of the target SQL engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// SQLite: `?` markers are understood natively.
    Embedded,
    /// PostgreSQL: markers must be numbered `$1`, `$2`, ...
    ClientServer,
}

impl Dialect {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Dialect::ClientServer
        } else {
            Dialect::Embedded
        }
    }

    /// Rewrites `?` markers into this dialect's convention.
    pub fn rebind<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        match self {
            Dialect::Embedded => Cow::Borrowed(sql),
            Dialect::ClientServer => Cow::Owned(number_placeholders(sql)),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    Literal,
    QuotedIdent,
    LineComment,
    BlockComment,
}

/// Numbers every `?` outside string literals, quoted identifiers and comments,
/// left to right starting at `$1`.
pub fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 16);
    let mut chars = sql.chars().peekable();
    let mut state = Scan::Code;
    let mut n = 0usize;

    while let Some(c) = chars.next() {
        match state {
            Scan::Code => match c {
                '?' => {
                    n += 1;
                    let _ = write!(out, "${}", n);
                }
                '\'' => {
                    state = Scan::Literal;
                    out.push(c);
                }
                '"' => {
                    state = Scan::QuotedIdent;
                    out.push(c);
                }
                '-' if chars.peek() == Some(&'-') => {
                    state = Scan::LineComment;
                    out.push(c);
                }
                '/' if chars.peek() == Some(&'*') => {
                    state = Scan::BlockComment;
                    out.push(c);
                    if let Some(star) = chars.next() {
                        out.push(star);
                    }
                }
                _ => out.push(c),
            },
            // A doubled quote closes and immediately reopens, which keeps `''` escapes intact.
            Scan::Literal => {
                out.push(c);
                if c == '\'' {
                    state = Scan::Code;
                }
            }
            Scan::QuotedIdent => {
                out.push(c);
                if c == '"' {
                    state = Scan::Code;
                }
            }
            Scan::LineComment => {
                out.push(c);
                if c == '\n' {
                    state = Scan::Code;
                }
            }
            Scan::BlockComment => {
                out.push(c);
                if c == '*' && chars.peek() == Some(&'/') {
                    if let Some(slash) = chars.next() {
                        out.push(slash);
                    }
                    state = Scan::Code;
                }
            }
        }
    }

    out
}
