//! Chord-scale lookup: which scales fit a chord quality, and how to spell them.

use crate::chord::{parse_chord, Accidental, NoteName};
use serde::Serialize;

/// Chord quality → candidate scales, most idiomatic first.
static SCALES: &[(&str, &[&str])] = &[
    ("maj", &["Major", "Pentatonic Major", "Blues", "Bebop Major", "Dominant (Mixolydian)", "Lydian"]),
    ("add2", &["Major", "Dominant (Mixolydian)", "Lydian", "Pentatonic Major", "Blues", "Bebop Major"]),
    ("add4", &["Major", "Dominant (Mixolydian)", "Pentatonic Major", "Blues", "Bebop Major"]),
    ("-", &["Dorian", "Minor (Aeolian)", "Pentatonic Minor", "Phrygian", "Blues", "Melodic Minor", "Harmonic Minor", "Bebop Minor"]),
    ("sus2", &["Major", "Pentatonic Major", "Blues", "Dominant (Mixolydian)", "Lydian Dominant", "Lydian", "Minor (Aeolian)", "Pentatonic Minor", "Dorian", "Melodic Minor", "Harmonic Minor", "Bebop Major", "Bebop Minor", "Bebop Dominant"]),
    ("5", &["Major", "Pentatonic Major", "Blues", "Dominant (Mixolydian)", "Lydian Dominant", "Lydian", "Minor (Aeolian)", "Pentatonic Minor", "Dorian", "Melodic Minor", "Harmonic Minor", "Bebop Major", "Bebop Minor", "Bebop Dominant"]),
    ("sus4", &["Dominant (Mixolydian)", "Bebop Dominant"]),
    ("+", &["Whole Tone", "Altered"]),
    ("o7", &["Diminished Whole-Half"]),
    ("o^7", &["Diminished Whole-Half"]),
    ("o", &["Diminished Whole-Half"]),
    ("^7", &["Major", "Pentatonic Major", "Bebop Major", "Lydian"]),
    ("^9", &["Major", "Pentatonic Major", "Bebop Major", "Lydian"]),
    ("^13", &["Major", "Pentatonic Major", "Bebop Major", "Lydian"]),
    ("6", &["Major", "Pentatonic Major", "Blues", "Bebop Major", "Lydian"]),
    ("69", &["Major", "Pentatonic Major", "Blues", "Bebop Major", "Lydian"]),
    ("^7#11", &["Lydian", "Pentatonic Major"]),
    ("^9#11", &["Lydian", "Pentatonic Major"]),
    ("^13#11", &["Lydian", "Pentatonic Major"]),
    ("^7#5", &["Lydian Augmented"]),
    ("^7b5", &["Lydian Augmented"]),
    ("^7#9", &["Lydian #2"]),
    ("-7", &["Dorian", "Pentatonic Minor", "Blues", "Bebop Minor", "Minor (Aeolian)", "Phrygian"]),
    ("-9", &["Dorian", "Pentatonic Minor", "Blues", "Bebop Minor", "Minor (Aeolian)"]),
    ("-add2", &["Dorian", "Pentatonic Minor", "Blues", "Bebop Minor", "Minor (Aeolian)", "Melodic Minor", "Harmonic Minor"]),
    ("-add4", &["Dorian", "Pentatonic Minor", "Blues", "Bebop Minor", "Minor (Aeolian)", "Melodic Minor", "Harmonic Minor"]),
    ("-11", &["Dorian", "Pentatonic Minor", "Blues", "Bebop Minor", "Minor (Aeolian)"]),
    ("-13", &["Dorian", "Pentatonic Minor", "Blues", "Bebop Minor"]),
    ("-6", &["Dorian", "Bebop Minor"]),
    ("-69", &["Dorian", "Bebop Minor"]),
    ("-b6", &["Minor (Aeolian)", "Pentatonic Minor", "Harmonic Minor"]),
    ("-#5", &["Minor (Aeolian)", "Harmonic Minor"]),
    ("-^7", &["Melodic Minor", "Harmonic Minor"]),
    ("-^9", &["Melodic Minor", "Harmonic Minor"]),
    ("-^11", &["Melodic Minor", "Harmonic Minor"]),
    ("-^13", &["Melodic Minor"]),
    ("-7b6", &["Minor (Aeolian)", "Phrygian", "Pentatonic Minor"]),
    ("-9b6", &["Minor (Aeolian)", "Pentatonic Minor"]),
    ("7", &["Dominant (Mixolydian)", "Bebop Dominant", "Lydian Dominant", "Diminished Half-Whole", "Whole Tone", "Altered", "Mixolydian b9 b13", "Pentatonic Major", "Blues"]),
    ("9", &["Dominant (Mixolydian)", "Bebop Dominant", "Lydian Dominant", "Whole Tone", "Pentatonic Major", "Blues"]),
    ("13", &["Dominant (Mixolydian)", "Bebop Dominant", "Lydian Dominant", "Pentatonic Major", "Blues"]),
    ("7add13", &["Dominant (Mixolydian)", "Bebop Dominant", "Lydian Dominant", "Pentatonic Major", "Blues"]),
    ("13#11", &["Lydian Dominant", "Pentatonic Major", "Blues"]),
    ("13#9", &["Diminished Half-Whole"]),
    ("13b9", &["Diminished Half-Whole"]),
    ("h7", &["Locrian", "Locrian Natural 9"]),
    ("h9", &["Locrian Natural 9"]),
    ("13sus", &["Dominant (Mixolydian)", "Bebop Dominant"]),
    ("7#11", &["Lydian Dominant", "Pentatonic Major", "Blues"]),
    ("7b5", &["Lydian Dominant", "Whole Tone", "Altered", "Diminished Half-Whole"]),
    ("7#5", &["Whole Tone", "Altered"]),
    ("7b13", &["Mixolydian b9 b13", "Altered"]),
    ("7#9", &["Altered", "Diminished Half-Whole"]),
    ("7#9#11", &["Altered", "Diminished Half-Whole"]),
    ("7#9b5", &["Altered", "Diminished Half-Whole"]),
    ("7#9#5", &["Altered"]),
    ("7alt", &["Altered"]),
    ("7susb9b13", &["Mixolydian b9 b13"]),
    ("7b9", &["Mixolydian b9 b13", "Altered", "Diminished Half-Whole"]),
    ("7b9#11", &["Altered", "Diminished Half-Whole"]),
    ("7b9b5", &["Altered", "Diminished Half-Whole"]),
    ("7b9#5", &["Altered"]),
    ("7b9b13", &["Mixolydian b9 b13", "Altered"]),
    ("7b9#9", &["Altered", "Diminished Half-Whole"]),
    ("7susb9", &["Mixolydian b9 b13", "Phrygian"]),
    ("7sus", &["Dominant (Mixolydian)", "Bebop Dominant"]),
    ("7susadd3", &["Dominant (Mixolydian)", "Bebop Dominant"]),
    ("9#11", &["Lydian Dominant"]),
    ("9b5", &["Lydian Dominant", "Whole Tone"]),
    ("9#5", &["Whole Tone"]),
    ("9sus", &["Dominant (Mixolydian)", "Bebop Dominant"]),
];

/// Scale name → degrees above the root.
static SCALE_PATTERNS: &[(&str, &[&str])] = &[
    ("Major", &["1", "2", "3", "4", "5", "6", "7"]),
    ("Minor (Aeolian)", &["1", "2", "b3", "4", "5", "b6", "b7"]),
    ("Dominant (Mixolydian)", &["1", "2", "3", "4", "5", "6", "b7"]),
    ("Whole Tone", &["1", "2", "3", "#4", "#5", "b7"]),
    ("Diminished Whole-Half", &["1", "2", "b3", "4", "b5", "b6", "6", "7"]),
    ("Diminished Half-Whole", &["1", "b2", "#2", "3", "#4", "5", "6", "b7"]),
    ("Lydian", &["1", "2", "3", "#4", "5", "6", "7"]),
    ("Lydian Augmented", &["1", "2", "3", "#4", "#5", "6", "7"]),
    ("Lydian #2", &["1", "#2", "3", "#4", "5", "6", "7"]),
    ("Lydian Dominant", &["1", "2", "3", "#4", "5", "6", "b7"]),
    ("Dorian", &["1", "2", "b3", "4", "5", "6", "b7"]),
    ("Melodic Minor", &["1", "2", "b3", "4", "5", "6", "7"]),
    ("Harmonic Minor", &["1", "2", "b3", "4", "5", "b6", "7"]),
    ("Locrian", &["1", "b2", "b3", "4", "b5", "b6", "b7"]),
    ("Locrian Natural 9", &["1", "2", "b3", "4", "b5", "b6", "b7"]),
    ("Altered", &["1", "b2", "#2", "3", "b5", "b6", "b7"]),
    ("Mixolydian b9 b13", &["1", "b2", "3", "4", "5", "b6", "b7"]),
    ("Phrygian", &["1", "b2", "b3", "4", "5", "b6", "b7"]),
    ("Pentatonic Major", &["1", "2", "3", "5", "6"]),
    ("Pentatonic Minor", &["1", "b3", "4", "5", "b7"]),
    ("Blues", &["1", "b3", "4", "#4", "5", "b7"]),
    ("Bebop Major", &["1", "2", "3", "4", "5", "#5", "6", "7"]),
    ("Bebop Dominant", &["1", "2", "3", "4", "5", "6", "b7", "7"]),
    ("Bebop Minor", &["1", "2", "b3", "3", "4", "5", "6", "b7"]),
];

/// Semitones above the root of the natural degrees 1 to 7.
const MAJOR_STEPS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Candidate scales for a chord quality. Empty and unknown qualities get the major list.
pub fn scale_names_for(quality: &str) -> &'static [&'static str] {
    let lookup = |q: &str| SCALES.iter().find(|(name, _)| *name == q).map(|(_, scales)| *scales);
    lookup(quality).or_else(|| lookup("maj")).unwrap_or(&[])
}

pub fn scale_pattern(scale: &str) -> Option<&'static [&'static str]> {
    SCALE_PATTERNS
        .iter()
        .find(|(name, _)| *name == scale)
        .map(|(_, degrees)| *degrees)
}

/// One spelled degree of a scale
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaleTone {
    pub note: NoteName,
    pub degree: String,
    /// Semitones above the root.
    pub semitones: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordScale {
    pub root: NoteName,
    pub quality: String,
    pub scale: String,
    pub tones: Vec<ScaleTone>,
}

/// Spell a degree such as `b3`, `#11` or `13` above `root`.
///
/// The letter comes from the degree number, the accidental from the
/// semitone distance. Returns `None` for degrees that are not `[#b]{0,2}N`
/// or that would need more than a double accidental.
///
/// # Example
/// ```
/// use ireal::scales::note_for_degree;
///
/// let root = "C".parse().unwrap();
/// assert_eq!(note_for_degree(&root, "b3").unwrap().note.to_string(), "Eb");
/// assert_eq!(note_for_degree(&root, "#11").unwrap().note.to_string(), "F#");
/// ```
pub fn note_for_degree(root: &NoteName, degree: &str) -> Option<ScaleTone> {
    let number_start = degree.find(|c: char| c.is_ascii_digit())?;
    let (alterations, number) = degree.split_at(number_start);
    let number: usize = number.parse().ok()?;
    if number == 0 {
        return None;
    }
    if alterations.len() > 2 {
        return None;
    }
    let mut alteration: i8 = 0;
    for c in alterations.chars() {
        match c {
            '#' => alteration += 1,
            'b' => alteration -= 1,
            _ => return None,
        }
    }

    let step = (number - 1) % 7;
    let semitones = (MAJOR_STEPS[step] as i8 + alteration).rem_euclid(12) as u8;
    let letter = root.letter.step(step);
    let pitch = (root.pitch_class() + semitones) % 12;

    let mut diff = (pitch as i8 - letter.natural_pitch_class() as i8).rem_euclid(12);
    if diff > 6 {
        diff -= 12;
    }
    let accidental = Accidental::from_offset(diff)?;

    Some(ScaleTone {
        note: NoteName::new(letter, accidental),
        degree: degree.to_string(),
        semitones,
    })
}

/// The first-choice scale for a chord, spelled from its root.
///
/// Rootless tokens have no scale.
pub fn chord_scale(token: &str) -> Option<ChordScale> {
    let chord = parse_chord(token);
    let root = chord.root?;
    let scale = scale_names_for(&chord.quality).first().copied().unwrap_or("Major");
    let tones = scale_pattern(scale)?
        .iter()
        .filter_map(|degree| note_for_degree(&root, degree))
        .collect();

    Some(ChordScale {
        root,
        quality: chord.quality,
        scale: scale.to_string(),
        tones,
    })
}
