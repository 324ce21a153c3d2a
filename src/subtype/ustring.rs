// Copyright (c) 2016-2020 Fabian Schuiki

//! Universal character strings and the textual representation of string
//! values in diagnostics.

use std::fmt;

/// A string of universal characters, stored as code points.
///
/// Unlike `String`, any code point up to `0x7FFFFFFF` is allowed, as the
/// universal charstring domain is larger than the Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UString(pub Vec<u32>);

impl UString {
    pub fn new() -> UString {
        UString(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn code_points(&self) -> &[u32] {
        &self.0
    }

    /// Convert to a regular string, if every code point is a valid `char`.
    pub fn to_native(&self) -> Option<String> {
        self.0.iter().map(|&cp| std::char::from_u32(cp)).collect()
    }

    /// Build a code point from its group, plane, row, and cell.
    pub fn quadruple(group: u8, plane: u8, row: u8, cell: u8) -> u32 {
        (group as u32) << 24 | (plane as u32) << 16 | (row as u32) << 8 | cell as u32
    }
}

impl<'a> From<&'a str> for UString {
    fn from(s: &'a str) -> UString {
        UString(s.chars().map(|c| c as u32).collect())
    }
}

impl From<Vec<u32>> for UString {
    fn from(v: Vec<u32>) -> UString {
        UString(v)
    }
}

impl fmt::Display for UString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", code_points_repr(&self.0))
    }
}

fn is_printable(cp: u32) -> bool {
    cp >= 0x20 && cp < 0x7F
}

/// Render a single code point in `char(g, p, r, c)` notation.
pub fn quadruple_repr(cp: u32) -> String {
    format!(
        "char({}, {}, {}, {})",
        cp >> 24,
        (cp >> 16) & 0xFF,
        (cp >> 8) & 0xFF,
        cp & 0xFF
    )
}

/// Render a sequence of code points as a string literal.
///
/// Printable runs are quoted, everything else is spelled out as a quadruple,
/// and the pieces are concatenated with `&`.
pub fn code_points_repr(cps: &[u32]) -> String {
    if cps.is_empty() {
        return "\"\"".into();
    }
    let mut pieces = vec![];
    let mut run = String::new();
    for &cp in cps {
        if is_printable(cp) {
            // The first printable char of a run opens the quotes.
            if run.is_empty() {
                run.push('"');
            }
            let c = cp as u8 as char;
            if c == '"' {
                run.push('"');
            }
            run.push(c);
        } else {
            if !run.is_empty() {
                run.push('"');
                pieces.push(std::mem::replace(&mut run, String::new()));
            }
            pieces.push(quadruple_repr(cp));
        }
    }
    if !run.is_empty() {
        run.push('"');
        pieces.push(run);
    }
    pieces.join(" & ")
}

/// Render a charstring as a string literal.
pub fn string_repr(s: &str) -> String {
    let cps: Vec<u32> = s.bytes().map(|b| b as u32).collect();
    code_points_repr(&cps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repr() {
        assert_eq!(string_repr("abc"), "\"abc\"");
        assert_eq!(string_repr(""), "\"\"");
        assert_eq!(string_repr("a\"b"), "\"a\"\"b\"");
        assert_eq!(string_repr("a\nb"), "\"a\" & char(0, 0, 0, 10) & \"b\"");
        assert_eq!(
            format!("{}", UString(vec![0x41, 0x0100_0000])),
            "\"A\" & char(1, 0, 0, 0)"
        );
    }

    #[test]
    fn native_conversion() {
        assert_eq!(UString::from("hey").to_native(), Some("hey".to_string()));
        assert_eq!(UString(vec![0x7FFF_FFFF]).to_native(), None);
        assert_eq!(UString::quadruple(0, 0, 1, 2), 0x0102);
    }
}
