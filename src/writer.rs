//! # Notation Writer
//!
//! Turns chart items back into plaintext iReal notation. Parsing the output
//! with [`parse_progression`](crate::parser::parse_progression) gives back
//! the same items, though not necessarily the same text: separators are
//! only written where a symbol would otherwise run into the next token,
//! and a shared barline is written once.

use crate::ast::{ChartItem, Event, Measure, SizeHint};

/// Write chart items as plaintext notation.
///
/// # Example
/// ```
/// use ireal::{parse_progression, writer::write_progression};
///
/// let items = parse_progression("[T44C^7 |A-7 D7 |G7,C^7 Z");
/// let notation = write_progression(&items);
/// assert_eq!(notation, "[T44C^7 |A-7 D7 |G7,C^7 Z");
/// assert_eq!(parse_progression(&notation), items);
/// ```
pub fn write_progression(items: &[ChartItem]) -> String {
    let mut notation = String::new();
    let mut previous: Option<&Measure> = None;

    for item in items {
        match item {
            ChartItem::SystemBreak => {
                notation.push('Y');
                previous = None;
            }
            ChartItem::Measure(measure) => {
                // Adjacent measures share one barline
                if previous.map_or(true, |p| p.end_bar != measure.start_bar) {
                    notation.push(measure.start_bar.as_char());
                }
                write_events(&mut notation, &measure.events);
                notation.push(measure.end_bar.as_char());
                previous = Some(measure);
            }
        }
    }
    notation
}

fn write_events(notation: &mut String, events: &[Event]) {
    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Chord(text) => notation.push_str(text),
            Event::NoChord => notation.push('n'),
            Event::RepeatOneBar => notation.push('x'),
            Event::RepeatTwoBar => notation.push('r'),
            Event::Space => notation.push(' '),
            Event::TimeSignature(digits) => {
                notation.push('T');
                notation.push_str(digits);
            }
            Event::RehearsalMark(mark) => {
                notation.push('*');
                notation.push(*mark);
            }
            Event::Ending(ending) => {
                notation.push('N');
                notation.push(*ending);
            }
            Event::StaffText(text) => {
                notation.push('<');
                notation.push_str(text);
                notation.push('>');
            }
            Event::SizeHint(SizeHint::Small) => notation.push('s'),
            Event::SizeHint(SizeHint::Normal) => notation.push('l'),
        }

        let next = events.get(i + 1);
        if is_symbol(event) && next.is_some_and(|n| *n != Event::Space) {
            notation.push(',');
        }
    }
}

/// Events written as bare text, which would merge with a following token.
fn is_symbol(event: &Event) -> bool {
    matches!(
        event,
        Event::Chord(_) | Event::NoChord | Event::RepeatOneBar | Event::RepeatTwoBar
    )
}
