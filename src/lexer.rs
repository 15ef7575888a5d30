//! # Notation Lexer
//!
//! Splits plaintext iReal notation into tokens. All lookahead lives here:
//! the grammar in `parser` only ever sees whole tokens.
//!
//! Every token consumes at least one character, so tokenizing any finite
//! input terminates.

use crate::ast::{BarStyle, SizeHint};

/// Token types for iReal notation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    SystemBreak,            // Y
    Bar(BarStyle),          // | [ ] { } Z
    TimeSignature(String),  // T44
    RehearsalMark(char),    // *A
    Ending(char),           // N1
    StaffText(String),      // <D.C. al Fine>
    SizeHint(SizeHint),     // s l
    Separator,              // ,
    Space,                  // ' '
    NoChord,                // n
    RepeatOneBar,           // x
    RepeatTwoBar,           // r
    Symbol(String),         // chord text
    Unrecognized(char),     // reserved character with no rule at this position
}

/// A token with its character span in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedToken {
    pub token: Token,
    pub offset: usize,
    pub len: usize,
}

/// Characters that always end a chord symbol.
const HARD_DELIMITERS: &[char] = &[' ', '|', '[', ']', '{', '}', 'Z', 'Y', '<', ',', '*'];

/// Lexer for iReal notation
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn digit_at(&self, offset: usize) -> bool {
        self.peek_at(offset).is_some_and(|c| c.is_ascii_digit())
    }

    fn take(&mut self, count: usize) -> String {
        let end = (self.position + count).min(self.chars.len());
        let text: String = self.chars[self.position..end].iter().collect();
        self.position = end;
        text
    }

    fn ends_symbol(&self, index: usize, token_empty: bool) -> bool {
        let c = self.chars[index];
        let next_is_digit = self
            .chars
            .get(index + 1)
            .is_some_and(|n| n.is_ascii_digit());
        match c {
            _ if HARD_DELIMITERS.contains(&c) => true,
            'T' | 'N' => !token_empty && next_is_digit,
            's' | 'l' => token_empty,
            _ => false,
        }
    }

    /// Read the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<LocatedToken> {
        let c = self.peek_at(0)?;
        let offset = self.position;

        let token = match c {
            'Y' => {
                self.position += 1;
                Token::SystemBreak
            }
            _ if BarStyle::from_char(c).is_some() => {
                self.position += 1;
                Token::Bar(BarStyle::from_char(c).unwrap_or_default())
            }
            'T' if self.digit_at(1) && self.digit_at(2) => {
                self.position += 1;
                Token::TimeSignature(self.take(2))
            }
            '*' if self.peek_at(1).is_some() => {
                let mark = self.chars[self.position + 1];
                self.position += 2;
                Token::RehearsalMark(mark)
            }
            'N' if self.peek_at(1).is_some() => {
                let ending = self.chars[self.position + 1];
                self.position += 2;
                Token::Ending(ending)
            }
            '<' if self.chars[self.position..].contains(&'>') => {
                self.position += 1;
                let mut text = String::new();
                while let Some(ch) = self.peek_at(0) {
                    self.position += 1;
                    if ch == '>' {
                        break;
                    }
                    text.push(ch);
                }
                Token::StaffText(text)
            }
            's' => {
                self.position += 1;
                Token::SizeHint(SizeHint::Small)
            }
            'l' => {
                self.position += 1;
                Token::SizeHint(SizeHint::Normal)
            }
            ',' => {
                self.position += 1;
                Token::Separator
            }
            ' ' => {
                self.position += 1;
                Token::Space
            }
            _ => self.lex_symbol(),
        };

        Some(LocatedToken {
            token,
            offset,
            len: self.position - offset,
        })
    }

    fn lex_symbol(&mut self) -> Token {
        let start = self.position;
        let mut end = start;
        while end < self.chars.len() && !self.ends_symbol(end, end == start) {
            end += 1;
        }

        if end == start {
            // Reserved character that no rule accepts here; step over it
            let c = self.chars[start];
            self.position += 1;
            return Token::Unrecognized(c);
        }

        let text = self.take(end - start);
        match text.as_str() {
            "n" => Token::NoChord,
            "x" => Token::RepeatOneBar,
            "r" => Token::RepeatTwoBar,
            _ => Token::Symbol(text),
        }
    }

    pub fn tokenize(&mut self) -> Vec<LocatedToken> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }
}

impl Iterator for Lexer {
    type Item = LocatedToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_types(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_bars_and_chords() {
        assert_eq!(
            token_types("[C7 |F^7]"),
            vec![
                Token::Bar(BarStyle::DoubleStart),
                Token::Symbol("C7".to_string()),
                Token::Space,
                Token::Bar(BarStyle::Single),
                Token::Symbol("F^7".to_string()),
                Token::Bar(BarStyle::DoubleEnd),
            ]
        );
    }

    #[test]
    fn test_repeat_bars_and_final() {
        assert_eq!(
            token_types("{x}Z"),
            vec![
                Token::Bar(BarStyle::RepeatStart),
                Token::RepeatOneBar,
                Token::Bar(BarStyle::RepeatEnd),
                Token::Bar(BarStyle::Final),
            ]
        );
    }

    #[test]
    fn test_annotations() {
        assert_eq!(
            token_types("*AT34N1<Fine>"),
            vec![
                Token::RehearsalMark('A'),
                Token::TimeSignature("34".to_string()),
                Token::Ending('1'),
                Token::StaffText("Fine".to_string()),
            ]
        );
    }

    #[test]
    fn test_size_hints_and_separators() {
        assert_eq!(
            token_types("sEh,A7,lD-"),
            vec![
                Token::SizeHint(SizeHint::Small),
                Token::Symbol("Eh".to_string()),
                Token::Separator,
                Token::Symbol("A7".to_string()),
                Token::Separator,
                Token::SizeHint(SizeHint::Normal),
                Token::Symbol("D-".to_string()),
            ]
        );
    }

    #[test]
    fn test_structural_symbols() {
        assert_eq!(
            token_types("n x r"),
            vec![
                Token::NoChord,
                Token::Space,
                Token::RepeatOneBar,
                Token::Space,
                Token::RepeatTwoBar,
            ]
        );
    }

    #[test]
    fn test_symbol_keeps_s_and_l_after_first_char() {
        assert_eq!(
            token_types("C7sus Gadd9"),
            vec![
                Token::Symbol("C7sus".to_string()),
                Token::Space,
                Token::Symbol("Gadd9".to_string()),
            ]
        );
    }

    #[test]
    fn test_symbol_stops_before_time_signature_and_ending() {
        assert_eq!(
            token_types("C7T44"),
            vec![
                Token::Symbol("C7".to_string()),
                Token::TimeSignature("44".to_string()),
            ]
        );
        assert_eq!(
            token_types("C7N2"),
            vec![Token::Symbol("C7".to_string()), Token::Ending('2')]
        );
    }

    #[test]
    fn test_alternate_chord_is_one_symbol() {
        assert_eq!(
            token_types("Bb7(A7b9)"),
            vec![Token::Symbol("Bb7(A7b9)".to_string())]
        );
    }

    #[test]
    fn test_unterminated_staff_text_advances_one_char() {
        assert_eq!(
            token_types("<Fine"),
            vec![Token::Unrecognized('<'), Token::Symbol("Fine".to_string())]
        );
    }

    #[test]
    fn test_trailing_rehearsal_star_is_unrecognized() {
        assert_eq!(
            token_types("C*"),
            vec![Token::Symbol("C".to_string()), Token::Unrecognized('*')]
        );
    }

    #[test]
    fn test_time_signature_needs_two_digits() {
        assert_eq!(token_types("T4"), vec![Token::Symbol("T4".to_string())]);
    }

    #[test]
    fn test_every_token_advances() {
        let inputs = [
            "",
            "<<<<",
            "****",
            "T",
            "N",
            "YYY|||",
            "{*AT44D- D-/C |Bh7, Bb7(A7b9) |N1D-/F sEh,A7} Y|N2sD-,G-,lD- ]",
            "é♭<ø>Δ°,*",
        ];
        for input in inputs {
            let tokens = Lexer::new(input).tokenize();
            let mut expected_offset = 0;
            for token in &tokens {
                assert!(token.len >= 1, "zero-width token in {:?}", input);
                assert_eq!(token.offset, expected_offset, "gap in {:?}", input);
                expected_offset += token.len;
            }
            assert_eq!(expected_offset, input.chars().count());
        }
    }
}
