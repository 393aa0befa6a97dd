//! Decoders for fields the capture pipeline writes inconsistently.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
}

impl NumberLike {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            NumberLike::Number(value) => Ok(value),
            NumberLike::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("expected a number, found {text:?}"))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagLike {
    Bool(bool),
    Number(i64),
}

pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberLike::deserialize(deserializer)?.into_f64()
}

pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberLike>::deserialize(deserializer)? {
        Some(value) => value.into_f64().map(Some),
        None => Ok(None),
    }
}

pub fn optional_number_map<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<BTreeMap<String, NumberLike>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    raw.into_iter()
        .map(|(label, value)| value.into_f64().map(|number| (label, number)))
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map(Some)
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match FlagLike::deserialize(deserializer)? {
        FlagLike::Bool(value) => value,
        FlagLike::Number(value) => value != 0,
    })
}
