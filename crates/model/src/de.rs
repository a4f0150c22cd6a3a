//! Lenient field decoders for spreadsheet-sourced records.
//!
//! Record sources hand over loosely typed JSON: counts can be integers,
//! floats, numeric strings or `null`, labels can be numbers or blank
//! strings. Missing values collapse to `0` / `None`.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

fn to_count(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Int(value) => value.clamp(0, u32::MAX as i64) as u32,
        Loose::Float(value) => to_count(value),
        Loose::Text(value) => value.trim().parse::<f64>().map(to_count).unwrap_or(0),
        Loose::Bool(_) | Loose::Null => 0,
    })
}

pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(value) => {
            let value = value.trim();
            if value.is_empty() {
                None
            } else {
                Some(value.to_owned())
            }
        }
        Loose::Int(value) => Some(value.to_string()),
        Loose::Float(value) => Some(value.to_string()),
        Loose::Bool(value) => Some(value.to_string()),
        Loose::Null => None,
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize, Default)]
    #[serde(default)]
    struct Row {
        #[serde(deserialize_with = "super::count")]
        n: u32,
        #[serde(deserialize_with = "super::text")]
        s: Option<String>,
    }

    fn row(json: &str) -> Row {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_count() {
        assert_eq!(row(r#"{"n": 7}"#).n, 7);
        assert_eq!(row(r#"{"n": 7.0}"#).n, 7);
        assert_eq!(row(r#"{"n": "12"}"#).n, 12);
        assert_eq!(row(r#"{"n": -3}"#).n, 0);
        assert_eq!(row(r#"{"n": null}"#).n, 0);
        assert_eq!(row(r#"{"n": "abc"}"#).n, 0);
        assert_eq!(row(r#"{}"#).n, 0);
    }

    #[test]
    fn test_text() {
        assert_eq!(row(r#"{"s": " Cycle "}"#).s.as_deref(), Some("Cycle"));
        assert_eq!(row(r#"{"s": ""}"#).s, None);
        assert_eq!(row(r#"{"s": null}"#).s, None);
        assert_eq!(row(r#"{"s": 42}"#).s.as_deref(), Some("42"));
        assert_eq!(row(r#"{}"#).s, None);
    }
}
