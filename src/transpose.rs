use crate::ast::{Chart, ChartItem, Event};
use crate::chord::{parse_chord, pitch_class, ChordSymbol, NoteName};
use crate::error::IrealError;
use thiserror::Error;
use tracing::{debug, warn};

/// Enharmonic spelling per key, indexed by semitones above the tonic.
/// `i` variants are alternate spellings of the same key.
static KEYS: &[(&str, [&str; 12])] = &[
    ("C", ["C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B"]),
    ("Ci", ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "Bb", "B"]),
    ("Db", ["Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "Cb", "C"]),
    ("Dbi", ["Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "Cb", "C"]),
    ("D", ["D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B", "C", "C#"]),
    ("Di", ["D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B", "C", "C#"]),
    ("Eb", ["Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B", "C", "Db", "D"]),
    ("Ebi", ["Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B", "C", "Db", "D"]),
    ("E", ["E", "F", "F#", "G", "G#", "A", "A#", "B", "C", "C#", "D", "D#"]),
    ("Ei", ["E", "F", "F#", "G", "G#", "A", "A#", "B", "C", "C#", "D", "D#"]),
    ("F", ["F", "Gb", "G", "Ab", "A", "Bb", "B", "C", "Db", "D", "Eb", "E"]),
    ("Fi", ["F", "F#", "G", "Ab", "A", "Bb", "B", "C", "C#", "D", "Eb", "E"]),
    ("Gb", ["Gb", "G", "Ab", "A", "Bb", "Cb", "C", "Db", "D", "Eb", "E", "F"]),
    ("Gbi", ["Gb", "G", "Ab", "A", "Bb", "Cb", "C", "Db", "D", "Eb", "E", "F"]),
    ("G", ["G", "Ab", "A", "Bb", "B", "C", "C#", "D", "Eb", "E", "F", "F#"]),
    ("Gi", ["G", "G#", "A", "Bb", "B", "C", "C#", "D", "D#", "E", "F", "F#"]),
    ("Ab", ["Ab", "A", "Bb", "B", "C", "Db", "D", "Eb", "E", "F", "Gb", "G"]),
    ("Abi", ["Ab", "A", "Bb", "B", "C", "Db", "D", "Eb", "E", "F", "Gb", "G"]),
    ("A", ["A", "Bb", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#"]),
    ("Ai", ["A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#"]),
    ("Bb", ["Bb", "B", "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A"]),
    ("Bbi", ["Bb", "B", "C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A"]),
    ("B", ["B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#"]),
    ("Bi", ["B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#"]),
    ("A-", ["A", "Bb", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#"]),
    ("A-i", ["A", "Bb", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#"]),
    ("Bb-", ["Bb", "B", "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A"]),
    ("Bb-i", ["Bb", "B", "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A"]),
    ("B-", ["B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#"]),
    ("B-i", ["B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#"]),
    ("C-", ["C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B"]),
    ("C-i", ["C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B"]),
    ("C#-", ["C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B", "C"]),
    ("C#-i", ["C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B", "C"]),
    ("D-", ["D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B", "C", "C#"]),
    ("D-i", ["D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B", "C", "C#"]),
    ("Eb-", ["Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B", "C", "Db", "D"]),
    ("Eb-i", ["Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B", "C", "Db", "D"]),
    ("E-", ["E", "F", "F#", "G", "G#", "A", "A#", "B", "C", "C#", "D", "D#"]),
    ("E-i", ["E", "F", "F#", "G", "G#", "A", "A#", "B", "C", "C#", "D", "D#"]),
    ("F-", ["F", "Gb", "G", "Ab", "A", "Bb", "B", "C", "Db", "D", "Eb", "E"]),
    ("F-i", ["F", "Gb", "G", "Ab", "A", "Bb", "B", "C", "Db", "D", "Eb", "E"]),
    ("F#-", ["F#", "G", "G#", "A", "A#", "B", "C", "C#", "D", "D#", "E", "F"]),
    ("F#-i", ["F#", "G", "G#", "A", "A#", "B", "C", "C#", "D", "D#", "E", "F"]),
    ("G-", ["G", "Ab", "A", "Bb", "B", "C", "C#", "D", "Eb", "E", "F", "F#"]),
    ("G-i", ["G", "Ab", "A", "Bb", "B", "C", "C#", "D", "Eb", "E", "F", "F#"]),
    ("G#-", ["G#", "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G"]),
    ("G#-i", ["G#", "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G"]),
];

/// Key names accepted by [`transpose_chart`], in table order.
pub fn supported_keys() -> impl Iterator<Item = &'static str> {
    KEYS.iter().map(|(name, _)| *name)
}

pub fn is_supported_key(key: &str) -> bool {
    spelling(key).is_some()
}

fn spelling(key: &str) -> Option<&'static [&'static str; 12]> {
    KEYS.iter().find(|(name, _)| *name == key).map(|(_, table)| table)
}

/// Pitch class of a key's tonic: the note name it starts with (`Bb-i` → 10).
pub fn key_tonic_pitch_class(key: &str) -> Option<u8> {
    let bytes = key.as_bytes();
    let len = match bytes.get(1) {
        Some(b'#') | Some(b'b') => 2,
        _ => 1,
    };
    key.get(..len).and_then(pitch_class)
}

/// Why a chart came back unchanged
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransposeWarning {
    #[error("Target key {key} not found in spelling table")]
    UnknownTargetKey { key: String },
    #[error("Source key {key} not found in spelling table")]
    UnknownSourceKey { key: String },
}

impl From<TransposeWarning> for IrealError {
    fn from(warning: TransposeWarning) -> Self {
        match warning {
            TransposeWarning::UnknownTargetKey { key } | TransposeWarning::UnknownSourceKey { key } => {
                IrealError::UnknownKey { key }
            }
        }
    }
}

/// Result of [`transpose_chart`]
#[derive(Debug, Clone, PartialEq)]
pub struct Transposed {
    pub chart: Chart,
    pub warning: Option<TransposeWarning>,
}

impl Transposed {
    /// Turn a warning into a hard error.
    pub fn into_result(self) -> Result<Chart, IrealError> {
        match self.warning {
            Some(warning) => Err(warning.into()),
            None => Ok(self.chart),
        }
    }
}

/// Re-key a chart.
///
/// Every chord root and bass moves by the interval between the chart's key
/// and `target_key`, and is respelled with the target key's table. Unknown
/// keys leave the chart unchanged and report a [`TransposeWarning`].
///
/// # Example
/// ```
/// use ireal::{parse_progression, transpose_chart, Chart};
///
/// let chart = Chart {
///     key: "F".to_string(),
///     items: parse_progression("[T44F7   |Bb7   Z"),
///     ..Chart::default()
/// };
/// let result = transpose_chart(&chart, "Gb");
/// assert!(result.warning.is_none());
/// assert_eq!(result.chart.key, "Gb");
/// let first = result.chart.measures().next().unwrap();
/// assert_eq!(first.chords().next(), Some("Gb7"));
/// ```
pub fn transpose_chart(chart: &Chart, target_key: &str) -> Transposed {
    let target_tonic = match (is_supported_key(target_key), key_tonic_pitch_class(target_key)) {
        (true, Some(pc)) => pc,
        _ => {
            warn!(key = target_key, "target key not found in spelling table");
            return Transposed {
                chart: chart.clone(),
                warning: Some(TransposeWarning::UnknownTargetKey {
                    key: target_key.to_string(),
                }),
            };
        }
    };
    let source_tonic = match (is_supported_key(&chart.key), key_tonic_pitch_class(&chart.key)) {
        (true, Some(pc)) => pc,
        _ => {
            warn!(key = %chart.key, "source key not found in spelling table");
            return Transposed {
                chart: chart.clone(),
                warning: Some(TransposeWarning::UnknownSourceKey {
                    key: chart.key.clone(),
                }),
            };
        }
    };

    let delta = (target_tonic + 12 - source_tonic) % 12;
    debug!(from = %chart.key, to = target_key, delta, "transposing chart");

    let items = chart
        .items
        .iter()
        .map(|item| match item {
            ChartItem::Measure(measure) => {
                let mut measure = measure.clone();
                for event in measure.events.iter_mut() {
                    if let Event::Chord(text) = event {
                        *text = transpose_chord(text, delta, target_key);
                    }
                }
                ChartItem::Measure(measure)
            }
            ChartItem::SystemBreak => ChartItem::SystemBreak,
        })
        .collect();

    Transposed {
        chart: Chart {
            key: target_key.to_string(),
            items,
            ..chart.clone()
        },
        warning: None,
    }
}

/// Move a chord token up `delta` semitones, spelled for `target_key`.
///
/// Rootless tokens come back unchanged.
pub fn transpose_chord(token: &str, delta: u8, target_key: &str) -> String {
    let mut chord = parse_chord(token);
    transpose_symbol(&mut chord, delta, target_key);
    chord.to_string()
}

fn transpose_symbol(chord: &mut ChordSymbol, delta: u8, target_key: &str) {
    if let Some(root) = chord.root.as_mut() {
        *root = transpose_note_name(*root, delta, target_key);
    }
    if let Some(bass) = chord.bass.as_mut() {
        *bass = transpose_note_name(*bass, delta, target_key);
    }
    if let Some(alternate) = chord.alternate.as_deref_mut() {
        transpose_symbol(alternate, delta, target_key);
    }
}

/// Move a note name up `delta` semitones, spelled for `target_key`.
///
/// Text that is not a note name passes through unchanged. An unknown
/// target key spells with the C table.
///
/// # Example
/// ```
/// use ireal::transpose::transpose_note;
///
/// assert_eq!(transpose_note("F", 1, "Gb"), "Gb");
/// assert_eq!(transpose_note("F", 1, "D"), "F#");
/// assert_eq!(transpose_note("p", 3, "C"), "p");
/// ```
pub fn transpose_note(note: &str, delta: u8, target_key: &str) -> String {
    match note.parse::<NoteName>() {
        Ok(name) => transpose_note_name(name, delta, target_key).to_string(),
        Err(_) => note.to_string(),
    }
}

fn transpose_note_name(note: NoteName, delta: u8, target_key: &str) -> NoteName {
    let (table, tonic) = match (spelling(target_key), key_tonic_pitch_class(target_key)) {
        (Some(table), Some(tonic)) => (table, tonic),
        _ => (&KEYS[0].1, 0),
    };
    let pc = (note.pitch_class() + delta % 12) % 12;
    let index = ((pc + 12 - tonic) % 12) as usize;
    table[index].parse().unwrap_or(note)
}
