//! Response-envelope normalization.
//!
//! The content API has shipped two envelope conventions for the same data:
//! v4 wraps every record as `{ "id": n, "attributes": { ... } }` and every
//! relation as `{ "data": ... }`; v5 returns flat objects with `id` and
//! `documentId` inline. Rather than probing optional fields at every call
//! site, responses are classified into a [`RecordShape`] and normalized once,
//! and the typed models only ever deserialize the flat form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::CmsError;

/// The two record shapes the API can serve.
#[derive(Debug)]
pub enum RecordShape {
    /// v4: numeric id beside a nested `attributes` object.
    Nested {
        id: Value,
        attributes: Map<String, Value>,
    },
    /// v5: one flat object, `id` and `documentId` inline.
    Flat(Map<String, Value>),
}

impl RecordShape {
    /// Classify a raw record value.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Shape`] if the value is not a JSON object.
    pub fn classify(value: Value) -> Result<Self, CmsError> {
        let Value::Object(mut map) = value else {
            return Err(CmsError::Shape(format!(
                "expected a record object, got {value}"
            )));
        };

        if let Some(attributes) = map.remove("attributes") {
            let Value::Object(attributes) = attributes else {
                return Err(CmsError::Shape(
                    "record has a non-object attributes field".to_owned(),
                ));
            };
            let id = map.remove("id").unwrap_or(Value::Null);
            return Ok(Self::Nested { id, attributes });
        }

        Ok(Self::Flat(map))
    }

    /// Normalize this record to the flat form.
    #[must_use]
    pub fn normalize(self) -> Value {
        match self {
            Self::Nested { id, attributes } => normalize_nested(id, attributes),
            Self::Flat(map) => Value::Object(map),
        }
    }
}

/// Normalize a v4 record: merge `id` into the attributes and unwrap every
/// relation wrapper found among the values.
fn normalize_nested(id: Value, attributes: Map<String, Value>) -> Value {
    let mut flat = Map::with_capacity(attributes.len() + 1);
    flat.insert("id".to_owned(), id);
    for (key, value) in attributes {
        flat.insert(key, normalize_relation(value));
    }
    Value::Object(flat)
}

/// Unwrap a v4 relation wrapper (`{ "data": ... }`), normalizing the wrapped
/// record(s) recursively. Values that are not relation wrappers pass through
/// unchanged.
#[must_use]
pub fn normalize_relation(value: Value) -> Value {
    let Value::Object(map) = &value else {
        return value;
    };
    // A relation wrapper is exactly { "data": ... } (optionally with meta).
    if !map.contains_key("data") || map.keys().any(|k| k != "data" && k != "meta") {
        return value;
    }
    let Value::Object(mut map) = value else {
        return value;
    };
    match map.remove("data") {
        Some(Value::Array(records)) => Value::Array(
            records
                .into_iter()
                .filter_map(|r| RecordShape::classify(r).ok().map(RecordShape::normalize))
                .collect(),
        ),
        Some(record @ Value::Object(_)) => RecordShape::classify(record)
            .map(RecordShape::normalize)
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Normalize a single raw record (either shape) to the flat form.
///
/// # Errors
///
/// Returns [`CmsError::Shape`] for non-object input.
pub fn normalize_record(value: Value) -> Result<Value, CmsError> {
    RecordShape::classify(value).map(RecordShape::normalize)
}

/// Pagination metadata from a list response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

/// Split a list envelope into its normalized records and pagination info.
///
/// # Errors
///
/// Returns [`CmsError::Shape`] if the envelope has no `data` array.
pub fn normalize_list(envelope: Value) -> Result<(Vec<Value>, Option<PageInfo>), CmsError> {
    let Value::Object(mut map) = envelope else {
        return Err(CmsError::Shape("list response is not an object".to_owned()));
    };
    let Some(Value::Array(records)) = map.remove("data") else {
        return Err(CmsError::Shape(
            "list response has no data array".to_owned(),
        ));
    };

    let pagination = map
        .remove("meta")
        .and_then(|meta| meta.get("pagination").cloned())
        .and_then(|p| serde_json::from_value(p).ok());

    let items = records
        .into_iter()
        .map(normalize_record)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((items, pagination))
}

/// Extract and normalize the single record of a `{ "data": { ... } }`
/// envelope (create/update/get responses).
///
/// # Errors
///
/// Returns [`CmsError::Shape`] if the envelope has no `data` object.
pub fn normalize_single(envelope: Value) -> Result<Value, CmsError> {
    let Value::Object(mut map) = envelope else {
        return Err(CmsError::Shape(
            "record response is not an object".to_owned(),
        ));
    };
    match map.remove("data") {
        Some(record @ Value::Object(_)) => normalize_record(record),
        Some(Value::Null) | None => Err(CmsError::Shape(
            "record response has no data object".to_owned(),
        )),
        Some(other) => Err(CmsError::Shape(format!(
            "record response data is not an object: {other}"
        ))),
    }
}
