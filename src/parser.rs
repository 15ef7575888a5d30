//! # Measure Grammar
//!
//! Assembles lexer tokens into the chart's measures and system breaks.
//!
//! ## State
//! - **open measure**: collects events until a barline closes it. It is only
//!   emitted once it has *content* (a chord, rest, bar repeat or space).
//! - **pending annotations**: a time signature or rehearsal mark that shows
//!   up after content belongs to the measure about to open, so it waits here
//!   until the next barline.
//! - **held measure**: the most recently closed measure. Barlines before any
//!   content (`][`, `||`) refine the shared line between it and the open
//!   measure, so it is only appended once that line can no longer change.
//!
//! ## Attachment rules
//! | Token | Open measure has content | Open measure is empty |
//! |---|---|---|
//! | barline | close it, open next with this start bar | set start bar (and held end bar) |
//! | time signature, rehearsal mark | queue as pending | attach |
//! | ending, staff text, size hint | attach | attach |
//! | system break | close it, then break | break |
//!
//! End of input closes an open measure that has content; annotations in an
//! empty trailing measure are dropped.

use crate::ast::{BarStyle, ChartItem, Event, Measure};
use crate::lexer::{Lexer, LocatedToken, Token};
use tracing::{debug, trace};

/// Parse plaintext notation into chart items.
///
/// # Example
/// ```
/// use ireal::{parse_progression, BarStyle};
///
/// let items = parse_progression("[T44C^7 |A-7 |D-7 |G7 Z");
/// assert_eq!(items.len(), 4);
/// let last = items[3].as_measure().unwrap();
/// assert_eq!(last.end_bar, BarStyle::Final);
/// ```
pub fn parse_progression(notation: &str) -> Vec<ChartItem> {
    let tokens = Lexer::new(notation.trim_end()).tokenize();
    let mut parser = Parser::new(tokens);
    parser.parse()
}

/// Grammar for iReal notation
pub struct Parser {
    tokens: Vec<LocatedToken>,
    position: usize,
    items: Vec<ChartItem>,
    open: Measure,
    has_content: bool,
    pending: Vec<Event>,
    held: Option<Measure>,
}

impl Parser {
    pub fn new(tokens: Vec<LocatedToken>) -> Self {
        Self {
            tokens,
            position: 0,
            items: Vec::new(),
            open: Measure::new(BarStyle::Single),
            has_content: false,
            pending: Vec::new(),
            held: None,
        }
    }

    fn advance(&mut self) -> Option<LocatedToken> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    /// Consume all tokens and return the chart items.
    pub fn parse(&mut self) -> Vec<ChartItem> {
        while let Some(located) = self.advance() {
            self.apply(located);
        }

        if self.has_content {
            let last = std::mem::take(&mut self.open);
            self.flush_held();
            self.items.push(ChartItem::Measure(last));
            self.has_content = false;
        } else {
            self.flush_held();
        }
        trace!(items = self.items.len(), "parsed progression");
        std::mem::take(&mut self.items)
    }

    fn apply(&mut self, located: LocatedToken) {
        match located.token {
            Token::SystemBreak => {
                if self.has_content {
                    self.close_measure(BarStyle::Single, BarStyle::Single);
                }
                self.flush_held();
                self.items.push(ChartItem::SystemBreak);
            }
            Token::Bar(style) => {
                if self.has_content {
                    self.close_measure(style, style);
                } else {
                    self.open.start_bar = style;
                    self.open.events.append(&mut self.pending);
                    if let Some(held) = self.held.as_mut() {
                        held.end_bar = style;
                    }
                }
            }
            Token::TimeSignature(digits) => self.annotate_next(Event::TimeSignature(digits)),
            Token::RehearsalMark(mark) => self.annotate_next(Event::RehearsalMark(mark)),
            Token::Ending(ending) => self.open.events.push(Event::Ending(ending)),
            Token::StaffText(text) => self.open.events.push(Event::StaffText(text)),
            Token::SizeHint(hint) => self.open.events.push(Event::SizeHint(hint)),
            Token::Separator => {}
            Token::Space => self.push_content(Event::Space),
            Token::NoChord => self.push_content(Event::NoChord),
            Token::RepeatOneBar => self.push_content(Event::RepeatOneBar),
            Token::RepeatTwoBar => self.push_content(Event::RepeatTwoBar),
            Token::Symbol(text) => self.push_content(Event::Chord(text)),
            Token::Unrecognized(c) => {
                debug!(offset = located.offset, character = %c, "skipping unrecognized notation character");
            }
        }
    }

    fn push_content(&mut self, event: Event) {
        self.open.events.push(event);
        self.has_content = true;
    }

    /// Time signatures and rehearsal marks written after content belong to the next measure.
    fn annotate_next(&mut self, event: Event) {
        if self.has_content {
            self.pending.push(event);
        } else {
            self.open.events.push(event);
        }
    }

    fn close_measure(&mut self, end_bar: BarStyle, next_start: BarStyle) {
        let mut next = Measure::new(next_start);
        next.events.append(&mut self.pending);
        let mut closed = std::mem::replace(&mut self.open, next);
        closed.end_bar = end_bar;
        self.flush_held();
        self.held = Some(closed);
        self.has_content = false;
    }

    fn flush_held(&mut self) {
        if let Some(measure) = self.held.take() {
            self.items.push(ChartItem::Measure(measure));
        }
    }
}
