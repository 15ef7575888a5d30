//! Chord symbol grammar
//!
//! Splits iReal chord text (`C-7`, `Bb^7/D`, `Bb7(A7b9)`) into root, quality,
//! bass and an optional parenthesized alternate chord.
//!
//! Parsing is total: text that does not start with a note name becomes a
//! rootless symbol whose quality holds the text verbatim, so reassembling a
//! parsed chord never loses characters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Natural note letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// Letters in scale order starting from C.
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    /// Semitones above C of the natural note.
    pub fn natural_pitch_class(&self) -> u8 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// The letter `steps` positions further up the scale, wrapping after B.
    pub fn step(&self, steps: usize) -> Letter {
        let index = Letter::ALL.iter().position(|l| l == self).unwrap_or(0);
        Letter::ALL[(index + steps) % 7]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accidental {
    #[default]
    Natural,
    Sharp,
    Flat,
    DoubleSharp,
    DoubleFlat,
}

impl Accidental {
    /// Semitone offset from the natural letter.
    pub fn offset(&self) -> i8 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
            Accidental::DoubleSharp => 2,
            Accidental::DoubleFlat => -2,
        }
    }

    pub fn from_offset(offset: i8) -> Option<Self> {
        match offset {
            0 => Some(Accidental::Natural),
            1 => Some(Accidental::Sharp),
            -1 => Some(Accidental::Flat),
            2 => Some(Accidental::DoubleSharp),
            -2 => Some(Accidental::DoubleFlat),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
            Accidental::DoubleSharp => "##",
            Accidental::DoubleFlat => "bb",
        }
    }

    fn parse(text: &str) -> Option<Self> {
        match text {
            "" => Some(Accidental::Natural),
            "#" => Some(Accidental::Sharp),
            "b" => Some(Accidental::Flat),
            "##" => Some(Accidental::DoubleSharp),
            "bb" => Some(Accidental::DoubleFlat),
            _ => None,
        }
    }
}

/// A spelled note such as `F#` or `Bb`.
///
/// # Example
/// ```
/// use ireal::chord::NoteName;
///
/// let note: NoteName = "Bb".parse().unwrap();
/// assert_eq!(note.pitch_class(), 10);
/// assert_eq!(note.to_string(), "Bb");
/// assert!("H".parse::<NoteName>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteName {
    pub letter: Letter,
    pub accidental: Accidental,
}

impl NoteName {
    pub fn new(letter: Letter, accidental: Accidental) -> Self {
        Self { letter, accidental }
    }

    /// Semitones above C, 0 to 11. `Cb` is 11, `B#` is 0.
    pub fn pitch_class(&self) -> u8 {
        (self.letter.natural_pitch_class() as i8 + self.accidental.offset()).rem_euclid(12) as u8
    }
}

/// Pitch class of a note written as text, or `None` if it is not a note name.
pub fn pitch_class(name: &str) -> Option<u8> {
    name.parse::<NoteName>().ok().map(|n| n.pitch_class())
}

/// Error returned when text is not a note name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteNameError(pub String);

impl fmt::Display for NoteNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a note name: {:?}", self.0)
    }
}

impl std::error::Error for NoteNameError {}

impl FromStr for NoteName {
    type Err = NoteNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = chars
            .next()
            .and_then(Letter::from_char)
            .ok_or_else(|| NoteNameError(s.to_string()))?;
        let accidental = Accidental::parse(chars.as_str()).ok_or_else(|| NoteNameError(s.to_string()))?;
        Ok(NoteName { letter, accidental })
    }
}

impl TryFrom<String> for NoteName {
    type Error = NoteNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NoteName> for String {
    fn from(note: NoteName) -> Self {
        note.to_string()
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter.as_char(), self.accidental.as_str())
    }
}

/// A chord symbol split into its parts
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChordSymbol {
    pub root: Option<NoteName>,
    /// Everything between the root and the bass, e.g. `-7`, `^7#11`, `7sus`.
    pub quality: String,
    pub bass: Option<NoteName>,
    /// Chord written in parentheses after the main one.
    pub alternate: Option<Box<ChordSymbol>>,
}

impl fmt::Display for ChordSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(root) = &self.root {
            write!(f, "{}", root)?;
        }
        f.write_str(&self.quality)?;
        if let Some(bass) = &self.bass {
            write!(f, "/{}", bass)?;
        }
        if let Some(alternate) = &self.alternate {
            write!(f, "({})", alternate)?;
        }
        Ok(())
    }
}

/// Parse a chord token into a [`ChordSymbol`].
///
/// # Examples
/// ```
/// use ireal::chord::parse_chord;
///
/// let chord = parse_chord("Bb^7/D");
/// assert_eq!(chord.root.unwrap().to_string(), "Bb");
/// assert_eq!(chord.quality, "^7");
/// assert_eq!(chord.bass.unwrap().to_string(), "D");
///
/// let chord = parse_chord("Bb7(A7b9)");
/// assert_eq!(chord.alternate.as_ref().unwrap().quality, "7b9");
/// assert_eq!(chord.to_string(), "Bb7(A7b9)");
///
/// // No leading note name: kept whole
/// let chord = parse_chord("p");
/// assert!(chord.root.is_none());
/// assert_eq!(chord.quality, "p");
/// ```
pub fn parse_chord(token: &str) -> ChordSymbol {
    let (main, alternate) = match token.split_once('(') {
        Some((main, rest)) => {
            let inner = rest.replacen(')', "", 1);
            (main, Some(Box::new(parse_chord(&inner))))
        }
        None => (token, None),
    };

    let Some((root, rest)) = split_root(main) else {
        return ChordSymbol {
            root: None,
            quality: main.to_string(),
            bass: None,
            alternate,
        };
    };

    let (quality, bass) = match rest.split_once('/') {
        Some((quality, bass)) => match bass.parse::<NoteName>() {
            Ok(bass) => (quality, Some(bass)),
            Err(_) => (rest, None),
        },
        None => (rest, None),
    };

    ChordSymbol {
        root: Some(root),
        quality: quality.to_string(),
        bass,
        alternate,
    }
}

/// Split a leading `[A-G][#b]?` off the text.
fn split_root(text: &str) -> Option<(NoteName, &str)> {
    let mut chars = text.chars();
    let letter = chars.next().and_then(Letter::from_char)?;
    let rest = chars.as_str();
    let (accidental, rest) = match rest.chars().next() {
        Some('#') => (Accidental::Sharp, &rest[1..]),
        Some('b') => (Accidental::Flat, &rest[1..]),
        _ => (Accidental::Natural, rest),
    };
    Some((NoteName::new(letter, accidental), rest))
}
