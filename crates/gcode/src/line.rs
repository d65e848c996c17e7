//! Turning program text into lines the interpreter can tokenize.

use alloc::{borrow::Cow, string::String};

/// Line breaks and semicolons all end a logical line at the top level.
pub fn is_separator(c: char) -> bool {
    matches!(c, '\n' | '\r' | ';')
}

/// Splits a program into its logical lines. Runs of separators don't produce
/// empty lines.
pub fn lines(program: &str) -> Lines<'_> {
    Lines { rest: program }
}

/// Iterator over the logical lines of a program. Cloning it restarts from the
/// same point.
#[derive(Clone, Debug)]
pub struct Lines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let s = self.rest.trim_start_matches(is_separator);
        if s.is_empty() {
            self.rest = s;
            return None;
        }
        let end = s.find(is_separator).unwrap_or(s.len());
        let (line, rest) = s.split_at(end);
        self.rest = rest;
        Some(line)
    }
}

impl<'a> core::iter::FusedIterator for Lines<'a> {}

/// The result of normalizing one raw line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Normalized {
    /// The upper-cased line with comments and surrounding whitespace removed,
    /// or `None` if nothing was left.
    pub line: Option<String>,
    /// A `(` was never closed, so everything after it was dropped.
    pub unterminated_comment: bool,
}

/// Strips comments and whitespace and upper-cases what remains.
///
/// A `;` comments out the rest of the line. Parenthesized comments are removed
/// wherever they appear, and don't nest: the first `)` closes the comment. An
/// unclosed `(` drops the rest of the line.
pub fn normalize(line: &str) -> Normalized {
    let (stripped, unterminated_comment) = strip_comments(line);
    let trimmed = stripped.trim();
    Normalized {
        line: (!trimmed.is_empty()).then(|| trimmed.to_ascii_uppercase()),
        unterminated_comment,
    }
}

fn strip_comments(line: &str) -> (Cow<'_, str>, bool) {
    let line = match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    };
    if !line.contains('(') {
        return (Cow::Borrowed(line), false);
    }

    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(open) = rest.find('(') {
        out.push_str(&rest[..open]);
        let comment = &rest[open + 1..];
        match comment.find(')') {
            Some(close) => rest = &comment[close + 1..],
            None => return (Cow::Owned(out), true),
        }
    }
    out.push_str(rest);
    (Cow::Owned(out), false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> Option<String> {
        normalize(s).line
    }

    #[test]
    fn split_on_all_separators() {
        let program = "G90\nM3\r\nG1 X10;G1 Y5\r";
        assert_eq!(
            lines(program).collect::<Vec<_>>(),
            vec!["G90", "M3", "G1 X10", "G1 Y5"]
        );
    }

    #[test]
    fn separator_runs_collapse() {
        let program = ";;\n\n\r\nG0;;;G1\n\n";
        assert_eq!(lines(program).collect::<Vec<_>>(), vec!["G0", "G1"]);
        assert_eq!(lines("").count(), 0);
        assert_eq!(lines("\n;\r").count(), 0);
    }

    #[test]
    fn blank_lines_are_still_lines() {
        // Whitespace-only lines get through the splitter; the normalizer
        // drops them.
        let all: Vec<_> = lines("G0\n  \nG1").collect();
        assert_eq!(all, vec!["G0", "  ", "G1"]);
        assert_eq!(norm(all[1]), None);
    }

    #[test]
    fn splitting_restarts() {
        let mut it = lines("a\nb\nc");
        it.next();
        let saved = it.clone();
        assert_eq!(it.collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(saved.collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn trims_and_uppercases() {
        assert_eq!(norm("  g1 x10 y5\t"), Some("G1 X10 Y5".to_owned()));
        assert_eq!(norm(""), None);
        assert_eq!(norm(" \t "), None);
    }

    #[test]
    fn semicolon_comment() {
        assert_eq!(norm("G1 X1 ; go right"), Some("G1 X1".to_owned()));
        assert_eq!(norm("; just a comment"), None);
    }

    #[test]
    fn paren_comments() {
        assert_eq!(norm("G1 (move) X1 (right)"), Some("G1  X1".to_owned()));
        assert_eq!(norm("(header)"), None);
        assert_eq!(norm("G1(a)X1(b)Y2"), Some("G1X1Y2".to_owned()));
    }

    #[test]
    fn paren_comments_do_not_nest() {
        assert_eq!(norm("G0 (a (b) c) X1"), Some("G0  C) X1".to_owned()));
    }

    #[test]
    fn semicolon_inside_parens_still_truncates() {
        // The semicolon wins, which leaves the paren unclosed.
        let n = normalize("G1 X1 (a;b) Y2");
        assert_eq!(n.line, Some("G1 X1".to_owned()));
        assert!(n.unterminated_comment);
    }

    #[test]
    fn unterminated_paren() {
        let n = normalize("G1 X1 (oops Y2");
        assert_eq!(n.line, Some("G1 X1".to_owned()));
        assert!(n.unterminated_comment);

        let n = normalize("(never closed");
        assert_eq!(n.line, None);
        assert!(n.unterminated_comment);

        assert!(!normalize("G1 (fine)").unterminated_comment);
    }
}
