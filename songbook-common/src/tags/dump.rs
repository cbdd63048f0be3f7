//! Line-based record interchange format
//!
//! ```text
//! artist=Alice
//! artist=Bob
//! ~#length=200
//! ~#rating=0.500000
//! ~format=Unknown Audio File
//! ```
//!
//! Multi-valued text keys take one line per value. Every zero-default
//! numeric key is written even when unset, followed by the rating (when not
//! stored) and the format name.

use super::{record::parse_number, TagRecord, TagValue, NUMERIC_ZERO_DEFAULT};
use tracing::debug;

const FORMAT_KEY: &str = "~format";

impl TagRecord {
    /// Serialize to the dump format; the result always ends with a newline
    pub fn to_dump(&self) -> String {
        let mut lines = Vec::new();
        for (key, value) in self.iter() {
            match value {
                TagValue::Int(i) => lines.push(format!("{}={}", key, i)),
                TagValue::Float(f) => lines.push(format!("{}={:.6}", key, f)),
                TagValue::Path(p) => lines.push(format!("{}={}", key, p.to_string_lossy())),
                // An empty value still gets its `key=` line
                TagValue::Text(text) => {
                    for v in text.split('\n') {
                        lines.push(format!("{}={}", key, v));
                    }
                }
            }
        }

        for key in NUMERIC_ZERO_DEFAULT {
            if !self.contains(key) {
                lines.push(format!("{}=0", key));
            }
        }
        if !self.has_rating() {
            let rating = self.call("~#rating").as_f64().unwrap_or(0.0);
            lines.push(format!("~#rating={:.6}", rating));
        }
        lines.push(format!("{}={}", FORMAT_KEY, self.format()));
        lines.push(String::new());
        lines.join("\n")
    }

    /// Parse the dump format
    ///
    /// Lines without `=`, with an empty key, or with a numeric key whose
    /// value is not a number are skipped. Repeated text keys accumulate.
    pub fn from_dump(text: &str) -> TagRecord {
        let mut record = TagRecord::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                debug!(line, "Skipping dump line without '='");
                continue;
            };

            if key == FORMAT_KEY {
                record.set_format(value);
                continue;
            }

            let result = if key.starts_with("~#") {
                match parse_number(value) {
                    Some(number) => record.set(key, number),
                    None => {
                        debug!(key, value, "Skipping non-numeric dump value");
                        continue;
                    }
                }
            } else if record.contains(key) {
                record.add(key, value)
            } else {
                record.set(key, value)
            };

            if let Err(e) = result {
                debug!(line, error = %e, "Skipping malformed dump line");
            }
        }
        record
    }
}
