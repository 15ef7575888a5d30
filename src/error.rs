//! # Error Types
//!
//! This module defines the error type for the outer layers of the decoder.
//!
//! The decoding core (cipher, lexer, grammar, chord grammar and transposer) is
//! total: malformed input degrades to a best-effort chart instead of failing.
//! Errors only appear where a caller asks for something the input cannot
//! provide, such as a chart that is not there or a key the spelling table
//! does not know.
//!
//! ## Error Types
//! - `UnknownKey` - Transposition to or from a key missing from the spelling table
//! - `NoCharts` - The input contained no decodable chart
//! - `ChartIndex` - A chart was requested by index past the end of a playlist
//!
//! ## Usage
//! ```rust
//! use ireal::{decode_transposed, IrealError};
//!
//! let link = "irealb://Blues=Me=Swing=F=n=[T44F7   |Bb7   Z";
//! match decode_transposed(link, "H") {
//!     Ok(charts) => println!("{} charts", charts.len()),
//!     Err(IrealError::UnknownKey { key }) => eprintln!("no such key: {}", key),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrealError {
    /// A key name absent from the spelling table.
    ///
    /// # Example
    /// ```
    /// # use ireal::IrealError;
    /// let err = IrealError::UnknownKey { key: "H".to_string() };
    /// assert_eq!(err.to_string(), "Unknown key: H");
    /// ```
    #[error("Unknown key: {key}")]
    UnknownKey { key: String },

    /// The input held no song with a music payload.
    ///
    /// # Example
    /// ```
    /// # use ireal::IrealError;
    /// assert_eq!(IrealError::NoCharts.to_string(), "No charts found in input");
    /// ```
    #[error("No charts found in input")]
    NoCharts,

    /// A chart index outside the playlist.
    ///
    /// # Example
    /// ```
    /// # use ireal::IrealError;
    /// let err = IrealError::ChartIndex { index: 4, count: 2 };
    /// assert_eq!(err.to_string(), "Chart index 4 out of range (playlist has 2 charts)");
    /// ```
    #[error("Chart index {index} out of range (playlist has {count} charts)")]
    ChartIndex { index: usize, count: usize },
}
