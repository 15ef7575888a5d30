//! # Chart Model
//!
//! This module defines the decoded chart: the value type produced by the
//! grammar, rewritten by the transposer and handed to whatever renders it.
//!
//! ## Type Hierarchy
//! ```text
//! Chart
//!   ├── title, composer, style, key, tempo
//!   └── Vec<ChartItem>
//!         ├── Measure
//!         │     ├── start_bar: BarStyle
//!         │     ├── end_bar: BarStyle
//!         │     └── Vec<Event>
//!         │           ├── Chord(text) | NoChord | RepeatOneBar | RepeatTwoBar | Space   (content)
//!         │           └── TimeSignature | RehearsalMark | Ending | StaffText | SizeHint (annotations)
//!         └── SystemBreak
//! ```
//!
//! ## Key Concepts
//!
//! ### Shared barlines
//! Adjacent measures share a barline: within a run of measures not separated
//! by a `SystemBreak`, `measure[i].end_bar == measure[i + 1].start_bar`.
//!
//! ### Content vs. annotations
//! Chords, rests, bar repeats and spaces are *content*: a measure is only
//! emitted once it holds some. Annotations decorate a measure but never
//! cause it to be emitted on their own.
//!
//! ## Related Modules
//! - `parser` - Builds charts from plaintext notation
//! - `transpose` - Produces re-keyed copies of charts
//! - `metadata` - Fills in title, composer, style, key and tempo

use serde::{Deserialize, Serialize};

/// Barline style, one per reserved notation character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BarStyle {
    #[default]
    Single,      // |
    DoubleStart, // [
    DoubleEnd,   // ]
    RepeatStart, // {
    RepeatEnd,   // }
    Final,       // Z
}

impl BarStyle {
    /// Map a notation character to its barline style.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '|' => Some(Self::Single),
            '[' => Some(Self::DoubleStart),
            ']' => Some(Self::DoubleEnd),
            '{' => Some(Self::RepeatStart),
            '}' => Some(Self::RepeatEnd),
            'Z' => Some(Self::Final),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Single => '|',
            Self::DoubleStart => '[',
            Self::DoubleEnd => ']',
            Self::RepeatStart => '{',
            Self::RepeatEnd => '}',
            Self::Final => 'Z',
        }
    }
}

/// Chord size requested by the `s` / `l` notation hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeHint {
    Small,
    Normal,
}

/// One occurrence inside a measure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Event {
    /// Raw chord text, e.g. `C-7`, `Bb^7/D` or `Bb7(A7b9)`.
    Chord(String),
    NoChord,
    RepeatOneBar,
    RepeatTwoBar,
    Space,
    /// Two digits, numerator then denominator (`"44"`, `"34"`, `"12"` for 12/8).
    TimeSignature(String),
    RehearsalMark(char),
    Ending(char),
    StaffText(String),
    SizeHint(SizeHint),
}

impl Event {
    /// Whether this event counts as measure content.
    pub fn is_content(&self) -> bool {
        matches!(
            self,
            Event::Chord(_) | Event::NoChord | Event::RepeatOneBar | Event::RepeatTwoBar | Event::Space
        )
    }
}

/// A single bar of music
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Measure {
    pub start_bar: BarStyle,
    pub end_bar: BarStyle,
    pub events: Vec<Event>,
}

impl Measure {
    pub fn new(start_bar: BarStyle) -> Self {
        Self {
            start_bar,
            end_bar: BarStyle::Single,
            events: Vec::new(),
        }
    }

    /// Chord texts in order of appearance.
    pub fn chords(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            Event::Chord(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn time_signature(&self) -> Option<&str> {
        self.events.iter().find_map(|e| match e {
            Event::TimeSignature(ts) => Some(ts.as_str()),
            _ => None,
        })
    }
}

/// Top-level chart entry: a measure, or a forced line break between measures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartItem {
    Measure(Measure),
    SystemBreak,
}

impl ChartItem {
    pub fn as_measure(&self) -> Option<&Measure> {
        match self {
            ChartItem::Measure(m) => Some(m),
            ChartItem::SystemBreak => None,
        }
    }
}

/// A decoded chord chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub composer: String,
    pub style: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<String>,
    pub items: Vec<ChartItem>,
}

impl Default for Chart {
    fn default() -> Self {
        Self {
            title: "Unknown".to_string(),
            composer: "Unknown".to_string(),
            style: "Unknown".to_string(),
            key: "C".to_string(),
            tempo: None,
            items: Vec::new(),
        }
    }
}

impl Chart {
    /// Measures in order, skipping system breaks.
    pub fn measures(&self) -> impl Iterator<Item = &Measure> {
        self.items.iter().filter_map(ChartItem::as_measure)
    }

    pub fn measure_count(&self) -> usize {
        self.measures().count()
    }

    /// Runs of measures between system breaks. Empty runs are skipped.
    pub fn systems(&self) -> Vec<Vec<&Measure>> {
        let mut systems = Vec::new();
        let mut current = Vec::new();
        for item in &self.items {
            match item {
                ChartItem::Measure(m) => current.push(m),
                ChartItem::SystemBreak => {
                    if !current.is_empty() {
                        systems.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            systems.push(current);
        }
        systems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_style_round_trips_through_char() {
        for c in ['|', '[', ']', '{', '}', 'Z'] {
            let style = BarStyle::from_char(c).unwrap();
            assert_eq!(style.as_char(), c);
        }
        assert_eq!(BarStyle::from_char('Y'), None);
    }

    #[test]
    fn test_content_events() {
        assert!(Event::Chord("C".to_string()).is_content());
        assert!(Event::Space.is_content());
        assert!(Event::RepeatTwoBar.is_content());
        assert!(!Event::TimeSignature("44".to_string()).is_content());
        assert!(!Event::SizeHint(SizeHint::Small).is_content());
    }

    #[test]
    fn test_systems_split_on_breaks() {
        let chart = Chart {
            items: vec![
                ChartItem::SystemBreak,
                ChartItem::Measure(Measure::new(BarStyle::Single)),
                ChartItem::Measure(Measure::new(BarStyle::Single)),
                ChartItem::SystemBreak,
                ChartItem::Measure(Measure::new(BarStyle::RepeatStart)),
            ],
            ..Chart::default()
        };
        let systems = chart.systems();
        assert_eq!(systems.len(), 2);
        assert_eq!(systems[0].len(), 2);
        assert_eq!(systems[1][0].start_bar, BarStyle::RepeatStart);
        assert_eq!(chart.measure_count(), 3);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_string(&Event::Chord("F7".to_string())).unwrap();
        assert_eq!(json, r#"{"type":"chord","value":"F7"}"#);
        let json = serde_json::to_string(&Event::NoChord).unwrap();
        assert_eq!(json, r#"{"type":"no-chord"}"#);
    }
}
