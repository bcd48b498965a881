//! Source rewrite that lets configs use JavaScript-style object literals.
//!
//! Config files are commonly written as `config({ font: 'Menlo' })`. Rhai spells map literals
//! `#{ ... }` and has no single-quoted strings, so a small lexical pass rewrites those forms
//! before compilation. Comments, double-quoted strings and backtick strings pass through
//! untouched, and line breaks are preserved so error positions still point at the right line.

/// Rewrite JavaScript-flavoured syntax into Rhai.
///
/// - `{` in expression position (after `(`, `[`, `,`, `:` or a single `=`) becomes `#{`
/// - `'text'` becomes `"text"`
/// - `===` and `!==` become `==` and `!=`
/// - `var` becomes `let`; `null` and `undefined` become `()`
pub fn normalize(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len() + 16);
    let mut sig = Significant::default();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            '/' if next == Some('/') => {
                let end = find_from(&chars, i, |ch| ch == '\n').unwrap_or(chars.len());
                out.extend(&chars[i..end]);
                i = end;
            }
            '/' if next == Some('*') => {
                let end = find_block_comment_end(&chars, i + 2);
                out.extend(&chars[i..end]);
                i = end;
            }
            '"' | '`' => {
                let end = string_end(&chars, i, c);
                out.extend(&chars[i..end]);
                sig.push('"');
                i = end;
            }
            '\'' => {
                let end = string_end(&chars, i, '\'');
                push_single_quoted(&mut out, &chars[i..end]);
                sig.push('"');
                i = end;
            }
            '{' => {
                if sig.opens_object() {
                    out.push('#');
                }
                out.push('{');
                sig.push('{');
                i += 1;
            }
            '=' | '!' if next == Some('=') && chars.get(i + 2) == Some(&'=') => {
                out.push(c);
                out.push('=');
                sig.push('=');
                sig.push('=');
                i += 3;
            }
            c if c.is_alphabetic() || c == '_' => {
                let end = find_from(&chars, i, |ch| !(ch.is_alphanumeric() || ch == '_'))
                    .unwrap_or(chars.len());
                let word: String = chars[i..end].iter().collect();
                let replaced = match word.as_str() {
                    "var" => "let",
                    "null" | "undefined" => "()",
                    other => other,
                };
                out.push_str(replaced);
                sig.push('a');
                i = end;
            }
            c if c.is_whitespace() => {
                out.push(c);
                i += 1;
            }
            _ => {
                out.push(c);
                sig.push(c);
                i += 1;
            }
        }
    }
    out
}

/// The last two significant (non-whitespace, non-comment) characters emitted.
///
/// Identifiers and literals are recorded as a placeholder character so they never look like
/// punctuation.
#[derive(Default)]
struct Significant {
    /// Most recent significant character.
    last: Option<char>,
    /// The one before it.
    before: Option<char>,
}

impl Significant {
    /// Record a significant character.
    fn push(&mut self, c: char) {
        self.before = self.last;
        self.last = Some(c);
    }

    /// Whether a `{` at this point starts an object literal rather than a block.
    fn opens_object(&self) -> bool {
        match self.last {
            Some('(' | '[' | ',' | ':') => true,
            Some('=') => !matches!(self.before, Some('=' | '!' | '<' | '>')),
            _ => false,
        }
    }
}

/// Index of the first char at or after `start` matching `pred`.
fn find_from(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> Option<usize> {
    chars[start..].iter().position(|&c| pred(c)).map(|p| start + p)
}

/// Index just past the `*/` that closes a block comment, or the end of input.
fn find_block_comment_end(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while i + 1 < chars.len() {
        if chars[i] == '*' && chars[i + 1] == '/' {
            return i + 2;
        }
        i += 1;
    }
    chars.len()
}

/// Index just past the closing `quote` of a string starting at `start`, or the end of input.
fn string_end(chars: &[char], start: usize, quote: char) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Emit a single-quoted literal (quotes included in `lit`) as a double-quoted one.
fn push_single_quoted(out: &mut String, lit: &[char]) {
    let body = match lit {
        [_, inner @ .., '\''] => inner,
        // unterminated at end of input
        [_, rest @ ..] => rest,
        [] => &[],
    };
    out.push('"');
    let mut i = 0;
    while i < body.len() {
        match body[i] {
            '\\' if body.get(i + 1) == Some(&'\'') => {
                out.push('\'');
                i += 2;
            }
            '\\' => {
                out.push('\\');
                if let Some(&escaped) = body.get(i + 1) {
                    out.push(escaped);
                }
                i += 2;
            }
            '"' => {
                out.push_str("\\\"");
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out.push('"');
}
