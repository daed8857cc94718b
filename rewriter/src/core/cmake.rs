//! Minimal CMake command model.
//!
//! Recognizes command invocations (`name(args...)`) that start a line, with the
//! argument list allowed to span physical lines. Quoted arguments, `#` line
//! comments, backslash escapes and nested parentheses are honored when finding
//! the closing parenthesis. Everything else is opaque text.
//!
//! Bracket arguments (`[[...]]`) are not recognized; their content is scanned as
//! ordinary argument text.

/// One recognized command invocation. Offsets are byte offsets into the
/// scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    /// First byte of the command name.
    pub start: usize,
    /// The `(` that opens the argument list.
    pub open: usize,
    /// The matching `)`; `None` when the argument list never closes.
    pub close: Option<usize>,
}

impl Invocation {
    /// CMake command names are case-insensitive.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Raw argument text between the parentheses, if the invocation closes.
    pub fn args<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.close.map(|close| &text[self.open + 1..close])
    }

    /// Offset of the first argument byte.
    pub fn args_start(&self) -> usize {
        self.open + 1
    }

    /// Whitespace-separated argument tokens (quotes are kept as written).
    pub fn arg_tokens<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.args(text)
            .map(|args| args.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Scan `text` for command invocations in source order.
pub fn parse(text: &str) -> Vec<Invocation> {
    let bytes = text.as_bytes();
    let mut invocations = Vec::new();
    let mut i = 0;
    let mut at_line_start = true;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\n' => {
                at_line_start = true;
                i += 1;
            }
            b' ' | b'\t' | b'\r' => i += 1,
            b'#' => i = skip_comment(bytes, i),
            b if is_ident_start(b) => {
                let start = i;
                while i < bytes.len() && is_ident(bytes[i]) {
                    i += 1;
                }
                if !at_line_start {
                    continue;
                }
                at_line_start = false;
                let mut j = i;
                while j < bytes.len() && matches!(bytes[j], b' ' | b'\t') {
                    j += 1;
                }
                if j < bytes.len() && bytes[j] == b'(' {
                    let close = find_close(bytes, j);
                    invocations.push(Invocation {
                        name: text[start..i].to_string(),
                        start,
                        open: j,
                        close,
                    });
                    i = close.map_or(bytes.len(), |c| c + 1);
                }
            }
            _ => {
                at_line_start = false;
                i += 1;
            }
        }
    }
    invocations
}

/// Every invocation of `name`, in source order.
pub fn find<'a>(invocations: &'a [Invocation], name: &'a str) -> impl Iterator<Item = &'a Invocation> {
    invocations.iter().filter(move |inv| inv.is(name))
}

fn find_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => i = skip_quoted(bytes, i)?,
            b'#' => i = skip_comment(bytes, i),
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Returns the offset just past the closing quote.
fn skip_quoted(bytes: &[u8], quote: usize) -> Option<usize> {
    let mut i = quote + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Returns the offset of the newline ending the comment (or end of input).
fn skip_comment(bytes: &[u8], hash: usize) -> usize {
    bytes[hash..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |pos| hash + pos)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
