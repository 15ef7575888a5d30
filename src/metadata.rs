//! # Playlist Links
//!
//! Splits `irealb://` links and plain-text dumps into songs and reads each
//! song's header fields. [`encode_playlist`] writes charts back as a link.
//!
//! ## Link layout
//! A link is percent-encoded. Songs are separated by `===`; an optional
//! trailing entry without any `=` names the playlist. Within a song, fields
//! are separated by `=`:
//!
//! ```text
//! Title=Composer==Style=Key==1r34LbKcu7...=Style=Tempo=Repeats   (current)
//! Title=Composer=Style=Key=n=Music[=Tempo]                      (legacy)
//! ```
//!
//! Field positions drift between app versions, so the current layout is
//! located relative to the scrambled payload rather than by index.
//!
//! ## Text dumps
//! ```text
//! --- Song 1 ---
//! Title: Blues for Alice
//! Composer: Parker Charlie
//! Raw Unscrambled Music: [T44F^7 |Eh7 A7b9 |...
//! ```

use crate::ast::Chart;
use crate::cipher::{scramble, unscramble, MAGIC};
use crate::error::IrealError;
use crate::parser::parse_progression;
use crate::transpose::is_supported_key;
use crate::writer::write_progression;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

const SONG_SEPARATOR: &str = "===";
const DUMP_SONG_HEADER: &str = "--- Song";

/// Songs decoded from one link or dump
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub charts: Vec<Chart>,
}

impl Playlist {
    /// Chart at `index`, or [`IrealError::ChartIndex`] past the end.
    pub fn chart(&self, index: usize) -> Result<&Chart, IrealError> {
        self.charts.get(index).ok_or(IrealError::ChartIndex {
            index,
            count: self.charts.len(),
        })
    }
}

/// Decode `%XX` escapes. Malformed escapes are kept as written; invalid
/// UTF-8 becomes U+FFFD.
///
/// # Example
/// ```
/// use ireal::metadata::percent_decode;
///
/// assert_eq!(percent_decode("Walkin%27%20Thing"), "Walkin' Thing");
/// assert_eq!(percent_decode("100%"), "100%");
/// ```
pub fn percent_decode(input: &str) -> Cow<'_, str> {
    if !input.contains('%') {
        return Cow::Borrowed(input);
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                .and_then(|h| std::str::from_utf8(h).ok());
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}

/// Percent-encode everything outside the URI component unreserved set
/// (`A-Z a-z 0-9 - _ . ! ~ * ' ( )`).
///
/// # Example
/// ```
/// use ireal::metadata::percent_encode;
///
/// assert_eq!(percent_encode("Walkin' Thing"), "Walkin'%20Thing");
/// assert_eq!(percent_encode("été"), "%C3%A9t%C3%A9");
/// ```
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// Remove a leading `irealbook://` or `irealb://`.
pub fn strip_scheme(input: &str) -> &str {
    input
        .strip_prefix("irealbook://")
        .or_else(|| input.strip_prefix("irealb://"))
        .unwrap_or(input)
}

/// Decode every song in a link, a raw `=`-separated song string, or a
/// plain-text dump.
///
/// Entries without a music payload are skipped. Fails with
/// [`IrealError::NoCharts`] when nothing is left.
pub fn parse_playlist(input: &str) -> Result<Playlist, IrealError> {
    let playlist = if input.contains(DUMP_SONG_HEADER) {
        parse_text_dump(input)
    } else {
        parse_link(input)
    };

    if playlist.charts.is_empty() {
        return Err(IrealError::NoCharts);
    }
    debug!(charts = playlist.charts.len(), name = ?playlist.name, "parsed playlist");
    Ok(playlist)
}

fn parse_link(input: &str) -> Playlist {
    let decoded = percent_decode(input.trim());
    let body = strip_scheme(&decoded);

    let entries: Vec<&str> = body
        .split(SONG_SEPARATOR)
        .filter(|entry| !entry.trim().is_empty())
        .collect();

    let mut playlist = Playlist::default();
    for (i, entry) in entries.iter().enumerate() {
        let fields: Vec<&str> = entry.split('=').collect();
        if fields.len() == 1 && i + 1 == entries.len() && i > 0 {
            playlist.name = Some(entry.trim().to_string());
            continue;
        }
        match parse_song(&fields) {
            Some(chart) => playlist.charts.push(chart),
            None => debug!(entry = i, fields = fields.len(), "skipping entry without music"),
        }
    }
    playlist
}

/// Build a chart from one song's `=`-separated fields.
///
/// Returns `None` when no music payload can be located.
pub fn parse_song(fields: &[&str]) -> Option<Chart> {
    let mut chart = Chart::default();
    if let Some(title) = fields.first() {
        chart.title = title.to_string();
    }
    if let Some(composer) = fields.get(1) {
        chart.composer = composer.to_string();
    }

    let raw_music = match fields.iter().position(|f| f.starts_with(MAGIC)) {
        Some(index) => {
            if index >= 1 && is_supported_key(fields[index - 1]) {
                chart.key = fields[index - 1].to_string();
            } else if index >= 2 && is_supported_key(fields[index - 2]) {
                chart.key = fields[index - 2].to_string();
            }
            if index >= 3 {
                chart.style = fields[index - 3].to_string();
            }
            // trailing style is the more descriptive one ("Jazz-Medium Up Swing")
            if let Some(style) = fields.get(index + 1).filter(|s| !s.trim().is_empty()) {
                chart.style = style.to_string();
            }
            chart.tempo = fields.get(index + 2).and_then(|t| tempo(t));
            fields[index].to_string()
        }
        None if fields.len() >= 6 => {
            chart.style = fields[2].to_string();
            let mut music_end = fields.len();
            if let Some(last) = fields.last().filter(|l| is_tempo(l)) {
                chart.tempo = Some(last.to_string());
                music_end -= 1;
            }
            chart.key = if is_supported_key(fields[4]) {
                fields[4].to_string()
            } else {
                fields[3].to_string()
            };
            fields[5..music_end.max(5)].join("=")
        }
        None => return None,
    };

    if raw_music.is_empty() {
        return None;
    }

    chart.items = parse_progression(&unscramble(&raw_music));
    debug!(
        title = %chart.title,
        key = %chart.key,
        measures = chart.measure_count(),
        "decoded chart"
    );
    Some(chart)
}

/// Encode one chart in the current song layout with a scrambled payload.
///
/// Fields are not percent-encoded here. A field containing `=` cannot be
/// read back, and a key outside the transposition table reads back as `C`.
/// An empty composer or style is written as `Unknown`, since it would
/// otherwise join its neighbours into a song separator.
pub fn encode_song(chart: &Chart) -> String {
    let music = scramble(&write_progression(&chart.items));
    let composer = non_empty(&chart.composer);
    let style = non_empty(&chart.style);
    let tempo = chart.tempo.as_deref().unwrap_or("0");
    [
        chart.title.as_str(),
        composer,
        "",
        style,
        chart.key.as_str(),
        "",
        music.as_str(),
        style,
        tempo,
        "1",
    ]
    .join("=")
}

fn non_empty(field: &str) -> &str {
    if field.trim().is_empty() {
        "Unknown"
    } else {
        field
    }
}

/// Encode a playlist as a percent-encoded `irealb://` link that
/// [`parse_playlist`] reads back.
///
/// # Example
/// ```
/// use ireal::metadata::{encode_playlist, parse_playlist};
///
/// let playlist = parse_playlist("irealb://Blues=Doe John=Jazz=F=n=[T44F7 |Bb7 Z").unwrap();
/// let link = encode_playlist(&playlist);
/// assert!(link.starts_with("irealb://Blues=Doe%20John==Jazz=F==1r34LbKcu7"));
/// assert_eq!(parse_playlist(&link).unwrap(), playlist);
/// ```
pub fn encode_playlist(playlist: &Playlist) -> String {
    let mut entries: Vec<String> = playlist.charts.iter().map(encode_song).collect();
    if let Some(name) = &playlist.name {
        entries.push(name.clone());
    }
    let body: Vec<String> = entries
        .iter()
        .map(|entry| entry.split('=').map(percent_encode).collect::<Vec<_>>().join("="))
        .collect();
    format!("irealb://{}", body.join(SONG_SEPARATOR))
}

/// Two or three ASCII digits.
fn is_tempo(field: &str) -> bool {
    (2..=3).contains(&field.len()) && field.bytes().all(|b| b.is_ascii_digit())
}

fn tempo(field: &str) -> Option<String> {
    let field = field.trim();
    if field.is_empty() || field == "0" {
        None
    } else {
        Some(field.to_string())
    }
}

fn parse_text_dump(text: &str) -> Playlist {
    let mut playlist = Playlist::default();
    let mut current: Option<Chart> = None;
    let mut music = String::new();

    for line in text.lines().map(str::trim) {
        if line.starts_with(DUMP_SONG_HEADER) {
            finish_dump_song(&mut playlist, current.take(), &music);
            current = Some(Chart::default());
            music.clear();
        } else if let Some(title) = line.strip_prefix("Title: ") {
            if let Some(chart) = current.as_mut() {
                chart.title = title.to_string();
            }
        } else if let Some(composer) = line.strip_prefix("Composer: ") {
            if let Some(chart) = current.as_mut() {
                chart.composer = composer.to_string();
            }
        } else if let Some(raw) = line.strip_prefix("Raw Unscrambled Music: ") {
            music = raw.to_string();
        }
    }
    finish_dump_song(&mut playlist, current.take(), &music);

    playlist
}

fn finish_dump_song(playlist: &mut Playlist, chart: Option<Chart>, music: &str) {
    if let Some(mut chart) = chart {
        if !music.is_empty() {
            chart.items = parse_progression(&unscramble(music));
            playlist.charts.push(chart);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUES: &str = "[T44F7   |Bb7   |F7   |C-7 F7 |Bb7   |Bo7   |F7   |A-7 D7 |G-7   |C7   |F7 D7 |G-7 C7 Z ";

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("plain"), "plain");
        assert!(matches!(percent_decode("plain"), Cow::Borrowed(_)));
        assert_eq!(percent_decode("a%20b%3Dc"), "a b=c");
        assert_eq!(percent_decode("%C3%A9t%C3%A9"), "été");
        assert_eq!(percent_decode("%zz%4"), "%zz%4");
        assert_eq!(percent_decode("a+b"), "a+b");
        assert_eq!(percent_decode("a%+1b"), "a%+1b");
        assert_eq!(percent_decode("%-1%+F"), "%-1%+F");
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("Blues For Me"), "Blues%20For%20Me");
        assert_eq!(percent_encode("[C |D Z"), "%5BC%20%7CD%20Z");
        assert_eq!(percent_encode("a=b%c"), "a%3Db%25c");
        assert_eq!(percent_encode("Bb7(A7b9)*A~!'"), "Bb7(A7b9)*A~!'");
        for text in ["Walkin' Thing", "été", "100%", "a+b"] {
            assert_eq!(percent_decode(&percent_encode(text)), text);
        }
    }

    #[test]
    fn test_encoded_playlist_reads_back() {
        let link = format!(
            "irealb://Blues%20For%20Me=Doe%20John==Jazz=F=={}=Jazz-Medium%20Swing=120=3===\
             Tune=Roe%20Jane==Bossa=Eb-=={}=Bossa%20Nova=0=1===My%20Set",
            scramble(BLUES),
            scramble("{*AT34Eb-,sC7,lF-7 |N1x }Y|N2<Fine>n Z")
        );
        let playlist = parse_playlist(&link).unwrap();
        assert_eq!(playlist.charts.len(), 2);

        let encoded = encode_playlist(&playlist);
        assert!(encoded.starts_with("irealb://Blues%20For%20Me=Doe%20John==Jazz-Medium%20Swing=F==1r34LbKcu7"));
        assert!(encoded.ends_with("===My%20Set"));
        assert_eq!(parse_playlist(&encoded).unwrap(), playlist);
    }

    #[test]
    fn test_encode_song_layout() {
        let chart = Chart {
            title: "Tune".to_string(),
            composer: String::new(),
            style: String::new(),
            key: "G".to_string(),
            tempo: Some("160".to_string()),
            items: parse_progression("[G |C Z"),
        };

        let song = encode_song(&chart);
        let fields: Vec<&str> = song.split('=').collect();
        assert_eq!(fields.len(), 10);
        assert_eq!(&fields[..6], &["Tune", "Unknown", "", "Unknown", "G", ""]);
        assert!(fields[6].starts_with(MAGIC));
        assert_eq!(&fields[7..], &["Unknown", "160", "1"]);
        assert!(!song.contains(SONG_SEPARATOR));
    }

    #[test]
    fn test_strip_scheme() {
        assert_eq!(strip_scheme("irealb://abc"), "abc");
        assert_eq!(strip_scheme("irealbook://abc"), "abc");
        assert_eq!(strip_scheme("abc"), "abc");
    }

    #[test]
    fn test_current_layout() {
        let link = format!(
            "irealb://Blues For Me=Doe John==Medium Swing=F==\
             {}=Jazz-Medium Swing=140=3",
            scramble(BLUES)
        );
        let playlist = parse_playlist(&link).unwrap();
        assert_eq!(playlist.charts.len(), 1);
        let chart = &playlist.charts[0];
        assert_eq!(chart.title, "Blues For Me");
        assert_eq!(chart.composer, "Doe John");
        assert_eq!(chart.key, "F");
        assert_eq!(chart.style, "Jazz-Medium Swing");
        assert_eq!(chart.tempo.as_deref(), Some("140"));
        assert_eq!(chart.measure_count(), 12);
    }

    #[test]
    fn test_key_directly_before_payload() {
        let payload = scramble("[C |D Z");
        let fields = ["Tune", "Someone", "Bossa Nova", "x", "Eb-", payload.as_str()];
        let chart = parse_song(&fields).unwrap();
        assert_eq!(chart.key, "Eb-");
        assert_eq!(chart.style, "Bossa Nova");
        assert_eq!(chart.tempo, None);
    }

    #[test]
    fn test_empty_trailing_style_keeps_leading_one() {
        let payload = scramble("[C |D Z");
        let fields = ["Tune", "Someone", "", "Ballad", "G", "", payload.as_str(), "", "0", "0"];
        let chart = parse_song(&fields).unwrap();
        assert_eq!(chart.style, "Ballad");
        assert_eq!(chart.key, "G");
        assert_eq!(chart.tempo, None);
    }

    #[test]
    fn test_unknown_key_falls_back_to_default() {
        let payload = scramble("[C |D Z");
        let fields = ["Tune", "Someone", "Ballad", "H", payload.as_str()];
        let chart = parse_song(&fields).unwrap();
        assert_eq!(chart.key, "C");
    }

    #[test]
    fn test_legacy_layout() {
        let chart = parse_song(&["Blues", "Me", "Swing", "F", "n", "[T44F7   |Bb7   Z"]).unwrap();
        assert_eq!(chart.style, "Swing");
        assert_eq!(chart.key, "F");
        assert_eq!(chart.tempo, None);
        assert_eq!(chart.measure_count(), 2);

        let chart = parse_song(&["Blues", "Me", "Swing", "x", "Bb", "[F7 |Bb7 Z", "120"]).unwrap();
        assert_eq!(chart.key, "Bb");
        assert_eq!(chart.tempo.as_deref(), Some("120"));
        assert_eq!(chart.measure_count(), 2);
    }

    #[test]
    fn test_legacy_music_may_contain_equals() {
        let chart = parse_song(&["T", "C", "S", "F", "n", "[F7 ", " |Bb7 Z"]).unwrap();
        let chords: Vec<&str> = chart.measures().flat_map(|m| m.chords()).collect();
        assert_eq!(chords, vec!["F7", "=", "Bb7"]);
    }

    #[test]
    fn test_entries_without_music_are_skipped() {
        assert!(parse_song(&["Only", "Three", "Fields"]).is_none());
        assert!(parse_song(&["a", "b", "c", "d", "e", ""]).is_none());
    }

    #[test]
    fn test_playlist_with_name() {
        let song = |title: &str| format!("{}=Someone==Swing=C=={}=Swing=0=1", title, scramble("[C |G Z"));
        let link = format!("irealb://{}==={}===My Standards", song("One"), song("Two"));
        let playlist = parse_playlist(&link).unwrap();
        assert_eq!(playlist.name.as_deref(), Some("My Standards"));
        let titles: Vec<&str> = playlist.charts.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two"]);
        assert_eq!(playlist.chart(1).unwrap().title, "Two");
        assert_eq!(
            playlist.chart(2),
            Err(IrealError::ChartIndex { index: 2, count: 2 })
        );
    }

    #[test]
    fn test_percent_encoded_link() {
        let link = "irealb://Blues%20Me=Doe%20John=Swing=F=n=%5BT44F7%20%20%20%7CBb7%20%20%20Z";
        let playlist = parse_playlist(link).unwrap();
        assert_eq!(playlist.charts[0].title, "Blues Me");
        assert_eq!(playlist.charts[0].measure_count(), 2);
    }

    #[test]
    fn test_no_charts() {
        assert_eq!(parse_playlist(""), Err(IrealError::NoCharts));
        assert_eq!(parse_playlist("irealb://"), Err(IrealError::NoCharts));
        assert_eq!(parse_playlist("irealb://just=a=title"), Err(IrealError::NoCharts));
    }

    #[test]
    fn test_text_dump() {
        let dump = "\
--- Song 1 ---
Title: First
Composer: Someone
Raw Unscrambled Music: [T44C |G Z

--- Song 2 ---
Title: Empty
Composer: Nobody

--- Song 3 ---
Title: Third
Raw Unscrambled Music: {D- |A7 }
";
        let playlist = parse_playlist(dump).unwrap();
        assert_eq!(playlist.charts.len(), 2);
        assert_eq!(playlist.charts[0].title, "First");
        assert_eq!(playlist.charts[0].composer, "Someone");
        assert_eq!(playlist.charts[0].key, "C");
        assert_eq!(playlist.charts[0].style, "Unknown");
        assert_eq!(playlist.charts[0].measure_count(), 2);
        assert_eq!(playlist.charts[1].title, "Third");
        assert_eq!(playlist.charts[1].composer, "Unknown");
    }
}
