//! Permissive field decoders for upstream catalog data.
//!
//! The upstream feed is not consistent about scalar types: numeric ids arrive
//! as numbers or strings, flags as booleans or `"Y"`/`"N"`, and so on. Each
//! decoder here accepts the representations seen in practice, maps `null`
//! and blank strings to `None`, and rejects everything else so that the
//! enclosing record fails validation.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

/// A number that may also be sent as a numeric string.
pub fn number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<N> {
        Number(N),
        Text(String),
    }

    match Option::<Raw<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid number '{text}': {e}"))),
    }
}

/// Free text that may also be sent as a bare number.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(
        Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
            Raw::Text(text) => text,
            Raw::Integer(n) => n.to_string(),
            Raw::Float(n) => n.to_string(),
        }),
    )
}

/// A boolean flag, sent either as a JSON boolean or as `Y`/`N`.
pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Bool(value)) => Ok(Some(value)),
        Some(Raw::Text(text)) => match text.trim().to_ascii_uppercase().as_str() {
            "" => Ok(None),
            "Y" | "YES" | "TRUE" => Ok(Some(true)),
            "N" | "NO" | "FALSE" => Ok(Some(false)),
            _ => Err(D::Error::custom(format!("invalid flag '{text}'"))),
        },
    }
}

/// A list where `null` means empty.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
struct InstructorIn {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Serialize)]
struct InstructorOut<'a> {
    name: &'a str,
}

/// Instructor entries arrive as `[{"name": ...}]`; entries without a name are
/// skipped.
pub fn instructor_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(list::<D, InstructorIn>(deserializer)?
        .into_iter()
        .filter_map(|instructor| instructor.name)
        .filter(|name| !name.trim().is_empty())
        .collect())
}

/// Writes instructor names back in the upstream `[{"name": ...}]` shape.
pub fn serialize_instructor_names<S>(names: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(names.iter().map(|name| InstructorOut { name }))
}
