// Copyright (c) 2016-2020 Fabian Schuiki

//! Character pattern restrictions.
//!
//! A pattern is matched by translating it to a regular expression. Only
//! membership of individual strings is ever decided; whether a pattern is
//! empty, full, or contained in another pattern is always unknown.

use crate::tribool::TriBool;
use crate::ustring::UString;
use regex::Regex;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// A `pattern` restriction on a charstring or universal charstring.
#[derive(Debug, Clone)]
pub struct StringPattern {
    text: String,
    nocase: bool,
    regex: Option<Regex>,
}

impl StringPattern {
    /// Create a pattern from its source text, e.g. `"[a-c]+"`.
    ///
    /// Patterns that cannot be translated, for example because they
    /// reference other definitions, are kept but match with an unknown
    /// result.
    pub fn new<S: Into<String>>(text: S, nocase: bool) -> StringPattern {
        let text = text.into();
        let regex = translate(&text, ".").and_then(|body| {
            let flags = if nocase { "(?si)" } else { "(?s)" };
            match Regex::new(&format!("{}^(?:{})$", flags, body)) {
                Ok(r) => Some(r),
                Err(e) => {
                    debug!("pattern `{}` not translatable: {}", text, e);
                    None
                }
            }
        });
        StringPattern {
            text,
            nocase,
            regex,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_nocase(&self) -> bool {
        self.nocase
    }

    /// The pattern as an anchored regular expression for JSON schemas.
    /// `@nocase` has no counterpart there and is dropped. Schema regexes
    /// have no dot-all flag, so wildcards match newlines through `[\s\S]`.
    pub fn to_json_regex(&self) -> Option<String> {
        translate(&self.text, "[\\s\\S]").map(|body| format!("^{}$", body))
    }

    /// Whether the pattern could be translated into a matcher.
    pub fn is_decidable(&self) -> bool {
        self.text.is_empty() || self.regex.is_some()
    }

    pub fn is_empty(&self) -> TriBool {
        TriBool::Unknown
    }

    pub fn is_full(&self) -> TriBool {
        TriBool::Unknown
    }

    pub fn is_equal(&self, _other: &StringPattern) -> TriBool {
        TriBool::Unknown
    }

    pub fn is_subset(&self, _other: &StringPattern) -> TriBool {
        TriBool::Unknown
    }

    /// Check whether a string matches the pattern.
    pub fn matches(&self, s: &str) -> TriBool {
        if self.text.is_empty() {
            return s.is_empty().into();
        }
        match self.regex {
            Some(ref r) => r.is_match(s).into(),
            None => TriBool::Unknown,
        }
    }

    /// Check whether a universal string matches the pattern.
    ///
    /// Strings with code points beyond the range of `char` cannot be fed to
    /// the matcher and yield an unknown result.
    pub fn matches_ustring(&self, s: &UString) -> TriBool {
        match s.to_native() {
            Some(native) => self.matches(&native),
            None => TriBool::Unknown,
        }
    }
}

impl fmt::Display for StringPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "pattern ")?;
        if self.nocase {
            write!(f, "@nocase ")?;
        }
        write!(f, "({})", self.text)
    }
}

/// Translate the body of a pattern into regex syntax, with `any` standing
/// for a single arbitrary character.
fn translate(text: &str, any: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '?' => out.push_str(any),
            '*' => {
                out.push_str(any);
                out.push('*');
            }
            '+' | '(' | ')' | '|' => out.push(c),
            '\\' => out.push_str(&translate_escape(&mut chars, false)?),
            '[' => out.push_str(&translate_set(&mut chars)?),
            '#' => out.push_str(&translate_repetition(&mut chars)?),
            // References to other definitions are not supported.
            '{' => return None,
            c => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    Some(out)
}

fn translate_escape(chars: &mut Peekable<Chars>, in_set: bool) -> Option<String> {
    let c = chars.next()?;
    let s = match c {
        'd' => "0-9".to_string(),
        'w' => "0-9a-zA-Z".to_string(),
        't' => "\\t".to_string(),
        'n' => "\\n-\\r".to_string(),
        'r' => "\\r".to_string(),
        's' => "\\t-\\r ".to_string(),
        'q' => {
            let cp = translate_quadruple(chars)?;
            return Some(regex::escape(&std::char::from_u32(cp)?.to_string()));
        }
        'N' | 'b' => return None,
        c => return Some(regex::escape(&c.to_string())),
    };
    if in_set || c == 't' || c == 'r' {
        Some(s)
    } else {
        Some(format!("[{}]", s))
    }
}

/// Parse `{g,p,r,c}` following a `\q` escape.
fn translate_quadruple(chars: &mut Peekable<Chars>) -> Option<u32> {
    if chars.next()? != '{' {
        return None;
    }
    let mut body = String::new();
    loop {
        match chars.next()? {
            '}' => break,
            c => body.push(c),
        }
    }
    let parts: Vec<u32> = body
        .split(',')
        .map(|p| p.trim().parse::<u32>().ok())
        .collect::<Option<_>>()?;
    if parts.len() != 4 || parts.iter().any(|&p| p > 255) {
        return None;
    }
    Some(parts[0] << 24 | parts[1] << 16 | parts[2] << 8 | parts[3])
}

fn translate_set(chars: &mut Peekable<Chars>) -> Option<String> {
    let mut out = String::from("[");
    if chars.peek() == Some(&'^') {
        chars.next();
        out.push('^');
    }
    loop {
        match chars.next()? {
            ']' => break,
            '\\' => out.push_str(&translate_escape(chars, true)?),
            '-' => out.push('-'),
            '[' => out.push_str("\\["),
            c => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out.push(']');
    Some(out)
}

/// Translate `#n`, `#(n)`, `#(n,m)`, `#(n,)`, and `#(,m)`.
fn translate_repetition(chars: &mut Peekable<Chars>) -> Option<String> {
    match chars.next()? {
        c if c.is_ascii_digit() => Some(format!("{{{}}}", c)),
        '(' => {
            let mut body = String::new();
            loop {
                match chars.next()? {
                    ')' => break,
                    c => body.push(c),
                }
            }
            let mut parts = body.splitn(2, ',').map(|p| p.trim());
            let min = parts.next().unwrap_or("");
            match parts.next() {
                None => Some(format!("{{{}}}", min.parse::<usize>().ok()?)),
                Some(max) => {
                    let min = if min.is_empty() {
                        0
                    } else {
                        min.parse::<usize>().ok()?
                    };
                    if max.is_empty() {
                        Some(format!("{{{},}}", min))
                    } else {
                        Some(format!("{{{},{}}}", min, max.parse::<usize>().ok()?))
                    }
                }
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(p: &str, s: &str) -> TriBool {
        StringPattern::new(p, false).matches(s)
    }

    #[test]
    fn wildcards() {
        assert_eq!(matches("a?c", "abc"), TriBool::True);
        assert_eq!(matches("a?c", "ac"), TriBool::False);
        assert_eq!(matches("a*", "a"), TriBool::True);
        assert_eq!(matches("a*", "abcdef"), TriBool::True);
        assert_eq!(matches("a*", "ba"), TriBool::False);
    }

    #[test]
    fn sets_and_repetition() {
        assert_eq!(matches("[a-c]+", "abcabc"), TriBool::True);
        assert_eq!(matches("[a-c]+", "abd"), TriBool::False);
        assert_eq!(matches("[^0-9]#3", "abc"), TriBool::True);
        assert_eq!(matches("[^0-9]#3", "ab"), TriBool::False);
        assert_eq!(matches("x#(2,3)", "xxx"), TriBool::True);
        assert_eq!(matches("x#(2,3)", "xxxx"), TriBool::False);
        assert_eq!(matches("x#(2,)", "xxxxxxx"), TriBool::True);
        assert_eq!(matches("\\d#(,2)", "12"), TriBool::True);
        assert_eq!(matches("\\d#(,2)", "123"), TriBool::False);
    }

    #[test]
    fn literal_chars_are_escaped() {
        assert_eq!(matches("a.b", "a.b"), TriBool::True);
        assert_eq!(matches("a.b", "axb"), TriBool::False);
        assert_eq!(matches("\\?", "?"), TriBool::True);
    }

    #[test]
    fn json_regex_wildcards_span_newlines() {
        let p = StringPattern::new("a?c*", false);
        let re = p.to_json_regex().unwrap();
        assert_eq!(re, "^a[\\s\\S]c[\\s\\S]*$");
        assert_eq!(p.matches("a\nc\n"), TriBool::True);
        // Without the dot-all flag, as a schema validator would compile it.
        assert!(Regex::new(&re).unwrap().is_match("a\nc\n"));
        assert_eq!(StringPattern::new("{ref}", false).to_json_regex(), None);
    }

    #[test]
    fn empty_pattern() {
        assert_eq!(matches("", ""), TriBool::True);
        assert_eq!(matches("", "a"), TriBool::False);
    }

    #[test]
    fn nocase() {
        let p = StringPattern::new("abc", true);
        assert_eq!(p.matches("ABC"), TriBool::True);
        assert_eq!(format!("{}", p), "pattern @nocase (abc)");
    }

    #[test]
    fn references_are_unknown() {
        let p = StringPattern::new("{ref}x", false);
        assert!(!p.is_decidable());
        assert_eq!(p.matches("x"), TriBool::Unknown);
        assert_eq!(p.is_empty(), TriBool::Unknown);
    }

    #[test]
    fn universal_strings() {
        let p = StringPattern::new("\\q{0,0,1,0}?", false);
        assert_eq!(
            p.matches_ustring(&UString(vec![0x100, 0x41])),
            TriBool::True
        );
        assert_eq!(
            p.matches_ustring(&UString(vec![0x7FFF_FFFF, 0x41])),
            TriBool::Unknown
        );
    }
}
