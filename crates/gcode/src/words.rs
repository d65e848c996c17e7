use crate::number::{parse_float, parse_int, skip_blanks};

/// A parameter word, like `X10` or `S30`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Word {
    pub letter: char,
    /// `None` if the letter wasn't followed by any digits.
    pub value: Option<f32>,
}

impl Word {
    /// A word with no digits counts as zero.
    pub fn value_or_zero(&self) -> f32 {
        self.value.unwrap_or(0.0)
    }
}

/// The word that starts a line, like `G1` or `M300`. Its number is read as an
/// integer, so `G00` and `G0` are the same command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CommandWord {
    pub letter: char,
    pub code: Option<i32>,
}

/// Splits a normalized line into words.
///
/// Call [`Words::command`] first to read the leading command word; iterating
/// yields the remaining words as parameters. Any non-blank character counts as
/// a letter, so stray punctuation is consumed as a (meaningless) word of its
/// own rather than derailing the rest of the line.
#[derive(Clone, Debug)]
pub struct Words<'a> {
    rest: &'a str,
}

impl<'a> Words<'a> {
    pub fn new(line: &'a str) -> Self {
        Words { rest: line }
    }

    fn next_letter(&mut self) -> Option<char> {
        let mut chars = skip_blanks(self.rest).chars();
        let letter = chars.next();
        self.rest = chars.as_str();
        letter
    }

    pub fn command(&mut self) -> Option<CommandWord> {
        let letter = self.next_letter()?;
        let (code, rest) = parse_int(self.rest);
        self.rest = rest;
        Some(CommandWord { letter, code })
    }
}

impl<'a> Iterator for Words<'a> {
    type Item = Word;

    fn next(&mut self) -> Option<Word> {
        let letter = self.next_letter()?;
        let (value, rest) = parse_float(self.rest);
        self.rest = rest;
        Some(Word { letter, value })
    }
}

impl<'a> core::iter::FusedIterator for Words<'a> {}
