//! Synthetic tag resolution
//!
//! [`resolve`] turns any key into a value for one record. Real keys are
//! looked up (with title and sort-key fallbacks), tied keys are resolved
//! part by part, and internal keys are parsed into a [`Synthetic`] and
//! computed from stored values.
//!
//! Resolution is pure: it never mutates the record, and malformed stored
//! values (an unparseable track number, a garbage replay gain) produce the
//! caller's default instead of an error. The only outside read is the
//! external lyrics file.

use super::{
    language_name, record::parse_number, tag_for_sort, TagKey, TagRecord, TagValue, PEOPLE,
    PEOPLE_SORT, VARIOUS_ARTISTS_VALUES,
};
use crate::config::settings;
use crate::human::{date_key, format_bitrate, format_rating, format_size, format_time_display};
use std::collections::HashMap;
use std::path::Path;

/// Connector placed between the parts of a tied key
pub const DEFAULT_CONNECTOR: &str = " - ";

/// Joiner placed between the values of one part of a tied key
pub const DEFAULT_JOINER: &str = ", ";

/// Internal keys with their own resolution rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Synthetic<'a> {
    /// `~#track`: leading number of `tracknumber` (`3/12` → 3)
    TrackNumber,
    /// `~#disc`: leading number of `discnumber`
    DiscNumber,
    /// `~#tracks`: trailing number of `tracknumber` (`3/12` → 12)
    TrackTotal,
    /// `~#discs`: trailing number of `discnumber`
    DiscTotal,
    /// `~length`
    Length,
    /// `~#cue_in`, milliseconds
    CueIn,
    /// `~#cue_out`, milliseconds
    CueOut,
    /// `~#rating`
    RatingValue,
    /// `~rating`
    Rating,
    /// `~people`
    People,
    /// `~people:real`
    PeopleReal,
    /// `~people:roles`
    PeopleRoles,
    /// `~peoplesort`
    PeopleSort,
    /// `~peoplesort:roles`
    PeopleSortRoles,
    /// `~performer`, `~performers`
    Performers,
    /// `~performersort`, `~performerssort`
    PerformersSort,
    /// `~performer:roles`, `~performers:roles`
    PerformersRoles,
    /// `~performersort:roles`, `~performerssort:roles`
    PerformersSortRoles,
    Basename,
    Dirname,
    Uri,
    Format,
    Codec,
    Encoding,
    Language,
    /// `~bitrate`
    Bitrate,
    /// `~filesize`
    Filesize,
    /// `~#date`
    DateValue,
    /// `~year`
    Year,
    /// `~#year`
    YearValue,
    /// `~originalyear`
    OriginalYear,
    /// `~#originalyear`
    OriginalYearValue,
    Lyrics,
    /// `~#replaygain_*`; holds the stored key (`replaygain_track_gain`)
    ReplayGain(&'a str),
    /// Any other `~#name`; holds `name`
    OtherNumeric(&'a str),
    /// Any other `~name`; holds `name`
    Stored(&'a str),
}

impl<'a> Synthetic<'a> {
    /// Classify an internal key body (the key without its leading `~`)
    pub fn parse(body: &'a str) -> Self {
        match body {
            "#track" => Synthetic::TrackNumber,
            "#disc" => Synthetic::DiscNumber,
            "#tracks" => Synthetic::TrackTotal,
            "#discs" => Synthetic::DiscTotal,
            "length" => Synthetic::Length,
            "#cue_in" => Synthetic::CueIn,
            "#cue_out" => Synthetic::CueOut,
            "#rating" => Synthetic::RatingValue,
            "rating" => Synthetic::Rating,
            "people" => Synthetic::People,
            "people:real" => Synthetic::PeopleReal,
            "people:roles" => Synthetic::PeopleRoles,
            "peoplesort" => Synthetic::PeopleSort,
            "peoplesort:roles" => Synthetic::PeopleSortRoles,
            "performer" | "performers" => Synthetic::Performers,
            "performersort" | "performerssort" => Synthetic::PerformersSort,
            "performer:roles" | "performers:roles" => Synthetic::PerformersRoles,
            "performersort:roles" | "performerssort:roles" => Synthetic::PerformersSortRoles,
            "basename" => Synthetic::Basename,
            "dirname" => Synthetic::Dirname,
            "uri" => Synthetic::Uri,
            "format" => Synthetic::Format,
            "codec" => Synthetic::Codec,
            "encoding" => Synthetic::Encoding,
            "language" => Synthetic::Language,
            "bitrate" => Synthetic::Bitrate,
            "filesize" => Synthetic::Filesize,
            "#date" => Synthetic::DateValue,
            "year" => Synthetic::Year,
            "#year" => Synthetic::YearValue,
            "originalyear" => Synthetic::OriginalYear,
            "#originalyear" => Synthetic::OriginalYearValue,
            "lyrics" => Synthetic::Lyrics,
            _ => match body.strip_prefix('#') {
                Some(name) if name.starts_with("replaygain_") => Synthetic::ReplayGain(name),
                Some(name) => Synthetic::OtherNumeric(name),
                None => Synthetic::Stored(body),
            },
        }
    }
}

/// Resolve `key` against `record`.
///
/// - real keys: the stored value; a missing `title` becomes
///   `"<basename> [Unknown]"`, a missing sort key falls back to its display key
/// - tied keys: values of each part joined with `joiner`, parts joined with
///   `connector`, empty parts dropped
/// - internal keys: see [`Synthetic`]
///
/// Anything that cannot be produced yields `default`.
pub fn resolve(
    record: &TagRecord,
    key: &str,
    default: &TagValue,
    connector: &str,
    joiner: &str,
) -> TagValue {
    match TagKey::parse(key) {
        TagKey::Real(name) => resolve_real(record, name, default),
        TagKey::Tied(parts) => resolve_tied(record, &parts, default, connector, joiner),
        TagKey::Internal(_) | TagKey::Numeric { .. } => {
            resolve_synthetic(record, Synthetic::parse(&key[1..]), default, connector)
        }
    }
}

fn resolve_real(record: &TagRecord, name: &str, default: &TagValue) -> TagValue {
    if let Some(value) = record.get(name) {
        return value.clone();
    }
    if name == "title" {
        let basename = record.call("~basename");
        return TagValue::Text(format!("{} [Unknown]", basename.to_text()));
    }
    tag_for_sort(name)
        .and_then(|display| record.get(display))
        .cloned()
        .unwrap_or_else(|| default.clone())
}

fn resolve_tied(
    record: &TagRecord,
    parts: &[String],
    default: &TagValue,
    connector: &str,
    joiner: &str,
) -> TagValue {
    // "~~people" is a single part: keep its own values newline-separated
    let joiner = if parts.len() > 1 { joiner } else { "\n" };
    let values: Vec<String> = parts
        .iter()
        .map(|part| record.list(part).join(joiner))
        .filter(|v| !v.is_empty())
        .collect();
    text_or(values.join(connector), default)
}

fn resolve_synthetic(
    record: &TagRecord,
    key: Synthetic<'_>,
    default: &TagValue,
    connector: &str,
) -> TagValue {
    match key {
        Synthetic::TrackNumber => slash_number(record, "tracknumber", 0, default),
        Synthetic::DiscNumber => slash_number(record, "discnumber", 0, default),
        Synthetic::TrackTotal => slash_number(record, "tracknumber", 1, default),
        Synthetic::DiscTotal => slash_number(record, "discnumber", 1, default),
        Synthetic::Length => match record.get("~#length").and_then(TagValue::as_f64) {
            Some(length) => TagValue::Text(format_time_display(length)),
            None => default.clone(),
        },
        Synthetic::CueIn => match record.get_text("qldj_cue_in") {
            None => TagValue::Float(0.0),
            Some(text) => parse_float(text).map_or_else(|| default.clone(), TagValue::Float),
        },
        Synthetic::CueOut => match record.get_text("qldj_cue_out") {
            None => {
                let length = numeric(record, "~#length").unwrap_or(0.0);
                TagValue::Float(length * 1000.0)
            }
            Some(text) => parse_float(text).map_or_else(|| default.clone(), TagValue::Float),
        },
        Synthetic::RatingValue => record
            .get("~#rating")
            .cloned()
            .unwrap_or_else(|| TagValue::Float(settings().default_rating)),
        Synthetic::Rating => {
            let rating = numeric(record, "~#rating").unwrap_or(0.0);
            TagValue::Text(format_rating(rating, settings().rating_stars))
        }
        Synthetic::People => text_or(record.list_unique(PEOPLE).join("\n"), default),
        Synthetic::PeopleReal => {
            let mut unique = record.list_unique(PEOPLE);
            for various in VARIOUS_ARTISTS_VALUES {
                if unique.len() > 1 {
                    unique.retain(|name| name != various);
                }
            }
            text_or(unique.join("\n"), default)
        }
        Synthetic::PeopleRoles => text_or(role_call(record, "performer", Some(&PEOPLE[..])), default),
        Synthetic::PeopleSort => {
            let joined = record.list_unique(PEOPLE_SORT).join("\n");
            if joined.is_empty() {
                resolve_synthetic(record, Synthetic::People, default, connector)
            } else {
                TagValue::Text(joined)
            }
        }
        Synthetic::PeopleSortRoles => {
            let described = role_call(record, "performersort", Some(&PEOPLE_SORT[..]));
            if described.is_empty() {
                resolve_synthetic(record, Synthetic::PeopleSort, default, connector)
            } else {
                TagValue::Text(described)
            }
        }
        Synthetic::Performers => text_or(prefix_value(record, "performer"), default),
        Synthetic::PerformersSort => {
            let joined = prefix_value(record, "performersort");
            if joined.is_empty() {
                resolve_synthetic(record, Synthetic::Performers, default, connector)
            } else {
                TagValue::Text(joined)
            }
        }
        Synthetic::PerformersRoles => text_or(role_call(record, "performer", None), default),
        Synthetic::PerformersSortRoles => {
            let described = role_call(record, "performersort", None);
            if described.is_empty() {
                resolve_synthetic(record, Synthetic::PerformersRoles, default, connector)
            } else {
                TagValue::Text(described)
            }
        }
        Synthetic::Basename => match record.filename() {
            Some(path) => TagValue::Path(
                path.file_name()
                    .map(Path::new)
                    .unwrap_or(path)
                    .to_path_buf(),
            ),
            None => default.clone(),
        },
        Synthetic::Dirname => match record.filename() {
            Some(path) => {
                let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
                TagValue::Path(parent.unwrap_or(path).to_path_buf())
            }
            None => default.clone(),
        },
        Synthetic::Uri => match (record.get("~uri"), record.filename()) {
            (Some(uri), _) => uri.clone(),
            (None, Some(path)) => TagValue::Text(file_uri(path)),
            (None, None) => default.clone(),
        },
        Synthetic::Format => record
            .get("~format")
            .cloned()
            .unwrap_or_else(|| TagValue::Text(record.format().to_string())),
        Synthetic::Codec => match record.get("~codec") {
            Some(codec) => codec.clone(),
            None => resolve_synthetic(record, Synthetic::Format, default, connector),
        },
        Synthetic::Encoding => {
            let parts: Vec<&str> = ["~encoding", "encodedby"]
                .iter()
                .filter_map(|k| record.get_text(k))
                .filter(|v| !v.is_empty())
                .collect();
            text_or(parts.join("\n"), default)
        }
        Synthetic::Language => {
            let codes = record.list("language");
            let names: Vec<&str> = codes
                .iter()
                .map(|code| language_name(code).unwrap_or(code.as_str()))
                .collect();
            text_or(names.join("\n"), default)
        }
        Synthetic::Bitrate => {
            TagValue::Text(format_bitrate(numeric(record, "~#bitrate").unwrap_or(0.0)))
        }
        Synthetic::Filesize => {
            let size = numeric(record, "~#filesize").unwrap_or(0.0);
            TagValue::Text(format_size(size as i64))
        }
        Synthetic::DateValue => record
            .get_text("date")
            .and_then(date_key)
            .map(TagValue::Int)
            .unwrap_or_else(|| default.clone()),
        Synthetic::Year => year_text(record, "date", default),
        Synthetic::YearValue => year_number(record, "date", default),
        Synthetic::OriginalYear => year_text(record, "originaldate", default),
        Synthetic::OriginalYearValue => year_number(record, "originaldate", default),
        Synthetic::Lyrics => {
            if let Some(embedded) = record.get("lyrics") {
                return embedded.clone();
            }
            match std::fs::read(record.lyric_filename()) {
                Ok(bytes) => TagValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
                Err(_) => default.clone(),
            }
        }
        Synthetic::ReplayGain(name) => record
            .get_text(name)
            .and_then(|v| v.split(' ').next())
            .and_then(parse_float)
            .map_or_else(
                || default.clone(),
                |gain| TagValue::Float((gain * 100.0).round() / 100.0),
            ),
        Synthetic::OtherNumeric(name) => {
            let stored_key = format!("~#{}", name);
            if let Some(value) = record.get(&stored_key) {
                return value.clone();
            }
            if super::is_zero_default(&stored_key) {
                return TagValue::Int(0);
            }
            record
                .get_text(name)
                .and_then(parse_number)
                .unwrap_or_else(|| default.clone())
        }
        Synthetic::Stored(name) => record
            .get(&format!("~{}", name))
            .cloned()
            .unwrap_or_else(|| default.clone()),
    }
}

/// Empty text becomes `default`
fn text_or(text: String, default: &TagValue) -> TagValue {
    if text.is_empty() {
        default.clone()
    } else {
        TagValue::Text(text)
    }
}

/// Numeric value of a `~#` key as resolved (zero defaults applied)
fn numeric(record: &TagRecord, key: &str) -> Option<f64> {
    record.call(key).as_f64()
}

fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Part `index` of an `N/M` field as an integer
fn slash_number(record: &TagRecord, key: &str, index: usize, default: &TagValue) -> TagValue {
    record
        .get_text(key)
        .and_then(|v| v.split('/').nth(index))
        .and_then(|part| part.trim().parse::<i64>().ok())
        .map_or_else(|| default.clone(), TagValue::Int)
}

fn year_prefix(text: &str) -> String {
    text.chars().take(4).collect()
}

fn year_text(record: &TagRecord, key: &str, default: &TagValue) -> TagValue {
    match record.get_text(key) {
        Some(date) => TagValue::Text(year_prefix(date)),
        None => default.clone(),
    }
}

fn year_number(record: &TagRecord, key: &str, default: &TagValue) -> TagValue {
    record
        .get_text(key)
        .and_then(|date| year_prefix(date).parse::<i64>().ok())
        .map_or_else(|| default.clone(), TagValue::Int)
}

/// Unique values of `prefix` and every `prefix:role` key
fn prefix_value(record: &TagRecord, prefix: &str) -> String {
    record.list_unique(record.prefixkeys(prefix)).join("\n")
}

/// Render contributors as `Name (Role1, Role2)`.
///
/// Roles come from `role_tag:role` keys and, when `sub_keys` is given, from
/// the implied role of each sub-key (`composer` → Composition). Names are
/// taken from `sub_keys` if given, else from the `role_tag` keys.
fn role_call(record: &TagRecord, role_tag: &str, sub_keys: Option<&[&str]>) -> String {
    let role_tag_keys = record.prefixkeys(role_tag);

    let mut role_map: HashMap<String, Vec<String>> = HashMap::new();
    for key in role_tag_keys.iter().filter(|k| k.as_str() != role_tag) {
        let role = key.rsplit(':').next().unwrap_or(key);
        for name in record.list(key) {
            role_map.entry(name).or_default().push(role.to_string());
        }
    }

    let names = match sub_keys {
        None => record.list_unique(&role_tag_keys),
        Some(keys) => {
            for (name, role) in record.implied_roles(keys) {
                role_map.entry(name).or_default().push(role.to_string());
            }
            record.list_unique(keys)
        }
    };

    names
        .into_iter()
        .map(|name| match role_map.get(&name) {
            Some(roles) if !roles.is_empty() => {
                let mut roles: Vec<String> = roles.iter().map(|r| capitalize(r)).collect();
                roles.sort();
                format!("{} ({})", name, roles.join(", "))
            }
            _ => name,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `file://` URI with every path segment percent-encoded
fn file_uri(path: &Path) -> String {
    let text = path.to_string_lossy();
    let encoded: Vec<String> = text
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    let joined = encoded.join("/");
    if joined.starts_with('/') {
        format!("file://{}", joined)
    } else {
        format!("file:///{}", joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn record(pairs: &[(&str, TagValue)]) -> TagRecord {
        TagRecord::from_pairs(pairs.iter().cloned()).unwrap()
    }

    fn text(s: &str) -> TagValue {
        TagValue::from(s)
    }

    fn call(r: &TagRecord, key: &str) -> TagValue {
        r.call_or(key, text("DEFAULT"))
    }

    #[test]
    fn test_real_key_and_default() {
        let r = record(&[("artist", text("Alice"))]);
        assert_eq!(call(&r, "artist"), text("Alice"));
        assert_eq!(call(&r, "genre"), text("DEFAULT"));
    }

    #[test]
    fn test_title_fallback() {
        let r = record(&[("~filename", text("/music/x/Some File.ogg"))]);
        assert_eq!(r.call("title"), text("Some File.ogg [Unknown]"));
    }

    #[test]
    fn test_sort_key_fallback() {
        let r = record(&[("artist", text("The Band"))]);
        assert_eq!(r.call("artistsort"), text("The Band"));
        let r = record(&[("artist", text("The Band")), ("artistsort", text("Band, The"))]);
        assert_eq!(r.call("artistsort"), text("Band, The"));
    }

    #[test]
    fn test_tied_key() {
        let r = record(&[("artist", text("Alice\nBob")), ("title", text("Song Title"))]);
        assert_eq!(
            r.resolve("~artist~title", &TagValue::empty(), " - ", ", "),
            text("Alice, Bob - Song Title")
        );
    }

    #[test]
    fn test_tied_key_drops_empty_parts() {
        let r = record(&[("title", text("Solo"))]);
        assert_eq!(r.call("~artist~title"), text("Solo"));
        let empty = TagRecord::new();
        assert_eq!(call(&empty, "~artist~album"), text("DEFAULT"));
    }

    #[test]
    fn test_tied_key_with_synthetic_and_numeric_parts() {
        let r = record(&[
            ("artist", text("Alice")),
            ("tracknumber", text("4/10")),
            ("title", text("Four")),
        ]);
        assert_eq!(r.call("~#track~title"), text("4 - Four"));
        assert_eq!(r.call("~people~title"), text("Alice - Four"));
        assert_eq!(r.call("~~people"), text("Alice"));
    }

    #[test]
    fn test_track_and_disc_numbers() {
        let r = record(&[("tracknumber", text("3/12")), ("discnumber", text("x/2"))]);
        assert_eq!(call(&r, "~#track"), TagValue::Int(3));
        assert_eq!(call(&r, "~#tracks"), TagValue::Int(12));
        assert_eq!(call(&r, "~#disc"), text("DEFAULT"));
        assert_eq!(call(&r, "~#discs"), TagValue::Int(2));

        let r = record(&[("tracknumber", text("7"))]);
        assert_eq!(call(&r, "~#track"), TagValue::Int(7));
        assert_eq!(call(&r, "~#tracks"), text("DEFAULT"));
    }

    #[test]
    fn test_length() {
        let r = record(&[("~#length", TagValue::Int(200))]);
        assert_eq!(r.call("~length"), text("3:20"));
        assert_eq!(call(&TagRecord::new(), "~length"), text("DEFAULT"));
    }

    #[test]
    fn test_cue_points() {
        let r = record(&[("~#length", TagValue::Int(200))]);
        assert_eq!(r.call("~#cue_in"), TagValue::Float(0.0));
        assert_eq!(r.call("~#cue_out"), TagValue::Float(200_000.0));

        let r = record(&[("qldj_cue_in", text("1500")), ("qldj_cue_out", text("oops"))]);
        assert_eq!(r.call("~#cue_in"), TagValue::Float(1500.0));
        assert_eq!(call(&r, "~#cue_out"), text("DEFAULT"));
    }

    #[test]
    #[serial]
    fn test_rating_default_and_display() {
        let r = TagRecord::new();
        assert_eq!(r.call("~#rating"), TagValue::Float(settings().default_rating));

        let r = record(&[("~#rating", TagValue::Float(0.75))]);
        assert_eq!(r.call("~#rating"), TagValue::Float(0.75));
        assert_eq!(r.call("~rating"), text("★★★☆"));
    }

    #[test]
    fn test_people_union_is_ordered_and_unique() {
        let r = record(&[
            ("artist", text("Alice\nBob")),
            ("albumartist", text("Bob")),
            ("composer", text("Carol")),
            ("performer:vocals", text("Dave")),
        ]);
        assert_eq!(r.call("~people"), text("Alice\nBob\nCarol\nDave"));
    }

    #[test]
    fn test_people_real_drops_various_artists() {
        let r = record(&[("albumartist", text("Various Artists")), ("artist", text("Alice"))]);
        assert_eq!(r.call("~people:real"), text("Alice"));

        let r = record(&[("albumartist", text("Various Artists"))]);
        assert_eq!(r.call("~people:real"), text("Various Artists"));
    }

    #[test]
    fn test_people_roles() {
        let r = record(&[
            ("artist", text("Alice")),
            ("composer", text("Carol")),
            ("performer:vocals", text("Alice")),
            ("performer:guitar", text("Alice\nBob")),
        ]);
        assert_eq!(
            r.call("~people:roles"),
            text("Alice (Guitar, Vocals)\nCarol (Composition)\nBob (Guitar)")
        );
    }

    #[test]
    fn test_performer_roles_fall_back() {
        let r = record(&[("performer", text("Eve"))]);
        assert_eq!(r.call("~performers:roles"), text("Eve"));
        assert_eq!(r.call("~performers"), text("Eve"));
        assert_eq!(r.call("~performerssort"), text("Eve"));
        assert_eq!(r.call("~performerssort:roles"), text("Eve"));

        let r = record(&[("performersort", text("Eve, X")), ("performersort:bass", text("Eve, X"))]);
        assert_eq!(r.call("~performerssort:roles"), text("Eve, X (Bass)"));
    }

    #[test]
    fn test_peoplesort_falls_back_to_people() {
        let r = record(&[("artist", text("The Band"))]);
        assert_eq!(r.call("~peoplesort"), text("The Band"));
        assert_eq!(r.call("~peoplesort:roles"), text("The Band"));
        let r = record(&[("artist", text("The Band")), ("artistsort", text("Band, The"))]);
        assert_eq!(r.call("~peoplesort"), text("Band, The"));
    }

    #[test]
    fn test_path_derived_keys() {
        let r = record(&[("~filename", text("/music/My Album/01 intro.flac"))]);
        assert_eq!(r.call("~basename").to_string(), "01 intro.flac");
        assert_eq!(r.call("~dirname").to_string(), "/music/My Album");
        assert_eq!(r.call("~uri"), text("file:///music/My%20Album/01%20intro.flac"));
        assert_eq!(call(&TagRecord::new(), "~basename"), text("DEFAULT"));
    }

    #[test]
    fn test_format_codec_encoding() {
        let mut r = TagRecord::with_format("FLAC");
        assert_eq!(r.call("~format"), text("FLAC"));
        assert_eq!(r.call("~codec"), text("FLAC"));
        r.set("~codec", "FLAC 24bit").unwrap();
        assert_eq!(r.call("~codec"), text("FLAC 24bit"));

        assert_eq!(call(&r, "~encoding"), text("DEFAULT"));
        r.set("~encoding", "LAME").unwrap();
        r.set("encodedby", "Someone").unwrap();
        assert_eq!(r.call("~encoding"), text("LAME\nSomeone"));
    }

    #[test]
    fn test_language_names() {
        let r = record(&[("language", text("eng\nxx"))]);
        assert_eq!(r.call("~language"), text("English\nxx"));
        assert_eq!(call(&TagRecord::new(), "~language"), text("DEFAULT"));
    }

    #[test]
    fn test_bitrate_and_filesize() {
        let r = record(&[("~#bitrate", TagValue::Int(320)), ("~#filesize", TagValue::Int(2048))]);
        assert_eq!(r.call("~bitrate"), text("320 kbps"));
        assert_eq!(r.call("~filesize"), text("2.00 KB"));
        assert_eq!(TagRecord::new().call("~filesize"), text("0 B"));
    }

    #[test]
    fn test_dates_and_years() {
        let r = record(&[("date", text("2004-05-06")), ("originaldate", text("19xx"))]);
        assert_eq!(r.call("~#date"), TagValue::Int(20040506));
        assert_eq!(r.call("~year"), text("2004"));
        assert_eq!(r.call("~#year"), TagValue::Int(2004));
        assert_eq!(r.call("~originalyear"), text("19xx"));
        assert_eq!(call(&r, "~#originalyear"), text("DEFAULT"));
        assert_eq!(call(&TagRecord::new(), "~year"), text("DEFAULT"));
    }

    #[test]
    fn test_oversized_date_gives_default() {
        let r = record(&[("date", text("99999999999999999"))]);
        assert_eq!(call(&r, "~#date"), text("DEFAULT"));
    }

    #[test]
    fn test_replaygain() {
        let r = record(&[
            ("replaygain_track_gain", text("-7.456 dB")),
            ("replaygain_album_gain", text("loud")),
        ]);
        assert_eq!(r.call("~#replaygain_track_gain"), TagValue::Float(-7.46));
        assert_eq!(call(&r, "~#replaygain_album_gain"), text("DEFAULT"));
        assert_eq!(call(&r, "~#replaygain_track_peak"), text("DEFAULT"));
    }

    #[test]
    fn test_generic_numeric() {
        let r = record(&[
            ("~#playcount", TagValue::Int(4)),
            ("bpm", text("128")),
            ("gain", text("1.5")),
            ("mood", text("happy")),
        ]);
        assert_eq!(call(&r, "~#playcount"), TagValue::Int(4));
        assert_eq!(call(&r, "~#skipcount"), TagValue::Int(0));
        assert_eq!(call(&r, "~#lastplayed"), TagValue::Int(0));
        assert_eq!(call(&r, "~#bpm"), TagValue::Int(128));
        assert_eq!(call(&r, "~#gain"), TagValue::Float(1.5));
        assert_eq!(call(&r, "~#mood"), text("DEFAULT"));
        assert_eq!(call(&r, "~#nothing"), text("DEFAULT"));
    }

    #[test]
    fn test_stored_internal() {
        let r = record(&[("~bookmark", text("0:10 intro"))]);
        assert_eq!(call(&r, "~bookmark"), text("0:10 intro"));
        assert_eq!(call(&r, "~unknown"), text("DEFAULT"));
    }

    #[test]
    fn test_embedded_lyrics() {
        let r = record(&[("lyrics", text("la la"))]);
        assert_eq!(r.call("~lyrics"), text("la la"));
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let r = record(&[
            ("artist", text("Alice")),
            ("performer:vocals", text("Bob")),
            ("tracknumber", text("1/2")),
        ]);
        for key in ["~people:roles", "~#track", "~artist~title", "~#playcount", "title"] {
            assert_eq!(r.call(key), r.call(key));
        }
    }

    #[test]
    fn test_synthetic_parse() {
        assert_eq!(Synthetic::parse("#track"), Synthetic::TrackNumber);
        assert_eq!(Synthetic::parse("performers:roles"), Synthetic::PerformersRoles);
        assert_eq!(
            Synthetic::parse("#replaygain_album_peak"),
            Synthetic::ReplayGain("replaygain_album_peak")
        );
        assert_eq!(Synthetic::parse("#bpm"), Synthetic::OtherNumeric("bpm"));
        assert_eq!(Synthetic::parse("bookmark"), Synthetic::Stored("bookmark"));
    }
}
