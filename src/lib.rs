pub mod ast;
pub mod chord;
pub mod cipher;
pub mod error;
pub mod lexer;
pub mod metadata;
pub mod parser;
pub mod scales;
pub mod transpose;
pub mod writer;

pub use ast::*;
pub use chord::{parse_chord, ChordSymbol, NoteName};
pub use cipher::{scramble, unscramble};
pub use error::*;
pub use metadata::{encode_playlist, parse_playlist, Playlist};
pub use parser::parse_progression;
pub use scales::chord_scale;
pub use transpose::{supported_keys, transpose_chart, TransposeWarning, Transposed};
pub use writer::write_progression;

/// Decode every chart in an `irealb://` link, raw song string or text dump.
/// This is the main entry point for the library.
pub fn decode(input: &str) -> Result<Vec<Chart>, IrealError> {
    Ok(parse_playlist(input)?.charts)
}

/// Decode and re-key every chart. An unknown key is an error here, unlike
/// [`transpose_chart`] which only warns.
pub fn decode_transposed(input: &str, key: &str) -> Result<Vec<Chart>, IrealError> {
    decode(input)?
        .iter()
        .map(|chart| transpose_chart(chart, key).into_result())
        .collect()
}
