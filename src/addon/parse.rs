//! JSON → [`Snapshot`] parsing and the lenient field readers it relies on.
//!
//! The export is produced by a Lua JSON encoder, which cannot tell an empty
//! table from an empty list and is loose about numbers. The helpers here
//! absorb exactly those quirks; anything else that does not fit the schema
//! is a [`ParseError`] and fails the cycle.

use super::error::ParseError;
use super::model::{AdventureTable, FollowerType, Snapshot};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Parse decoded export bytes into a fresh snapshot.
///
/// # Errors
///
/// [`ParseError`] when the bytes are not JSON or violate the schema.
/// Unreadable reward entries do not fail the parse.
pub fn parse_snapshot(raw: &[u8]) -> Result<Snapshot, ParseError> {
    let mut snapshot: Snapshot = serde_json::from_slice(raw)?;
    snapshot.assign_keys();
    Ok(snapshot)
}

/// An object-valued collection that may also arrive as `[]` or `null`.
pub(crate) fn object_or_empty_list<'de, D, M>(deserializer: D) -> Result<M, D::Error>
where
    D: Deserializer<'de>,
    M: Deserialize<'de> + Default,
{
    struct ObjectVisitor<M>(PhantomData<M>);

    impl<'de, M> Visitor<'de> for ObjectVisitor<M>
    where
        M: Deserialize<'de> + Default,
    {
        type Value = M;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object or an empty array")
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<M, A::Error> {
            M::deserialize(de::value::MapAccessDeserializer::new(map))
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<M, A::Error> {
            if seq.next_element::<IgnoredAny>()?.is_some() {
                return Err(de::Error::invalid_length(1, &self));
            }
            Ok(M::default())
        }

        fn visit_unit<E: de::Error>(self) -> Result<M, E> {
            Ok(M::default())
        }
    }

    deserializer.deserialize_any(ObjectVisitor(PhantomData))
}

/// `AdventureTables`, keyed by the follower type id written as a string.
pub(crate) fn tables_by_type<'de, D>(
    deserializer: D,
) -> Result<HashMap<FollowerType, AdventureTable>, D::Error>
where
    D: Deserializer<'de>,
{
    let by_key: HashMap<String, AdventureTable> = object_or_empty_list(deserializer)?;
    by_key
        .into_iter()
        .map(|(key, table)| {
            let id = key.trim().parse::<u32>().map_err(|_| {
                <D::Error as de::Error>::invalid_value(
                    de::Unexpected::Str(&key),
                    &"a follower type id",
                )
            })?;
            Ok((FollowerType::from(id), table))
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

/// An integer that may be encoded as a JSON number or a numeric string.
pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Scalar::deserialize(deserializer)? {
        Scalar::Int(v) => Ok(v),
        // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
        Scalar::Float(v) if v.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&v) => {
            Ok(v as i64)
        }
        Scalar::Float(v) => Err(de::Error::invalid_value(
            de::Unexpected::Float(v),
            &"an integer",
        )),
        Scalar::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&s), &"an integer")),
    }
}

/// An identifier that may be encoded as a string or a number.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Int(v) => v.to_string(),
        Scalar::Float(v) => v.to_string(),
        Scalar::Text(s) => s,
    })
}

/// A list of identifiers; an empty object counts as an empty list.
pub(crate) fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Id(#[serde(deserialize_with = "lenient_string")] String);

    struct ListVisitor;

    impl<'de> Visitor<'de> for ListVisitor {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an array of ids")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut ids = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(Id(id)) = seq.next_element()? {
                ids.push(id);
            }
            Ok(ids)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            if map.next_key::<IgnoredAny>()?.is_some() {
                return Err(de::Error::invalid_length(1, &self));
            }
            Ok(Vec::new())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(ListVisitor)
}
