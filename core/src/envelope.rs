//! The `{result:{data:{json: T}}}` response envelope and the `{json: T}`
//! request wrapper.
//!
//! # Design
//! Every query response nests its payload three levels deep. Any level may
//! be missing or null; that degrades to "no payload" rather than an error.
//! Only a body that is not JSON at all is a hard decode failure.
//!
//! Field names are matched ASCII case-insensitively at every struct level,
//! so `{"Result":{"DATA":{"json":{"Projects":[]}}}}` decodes the same as the
//! canonical camelCase form. Matching happens in `CaseInsensitive`, a thin
//! deserializer over `serde_json::Value` that rewrites object keys to the
//! field names the target struct declares. Null struct members are dropped
//! on the way through so they fall back to the field's default instead of
//! failing a non-optional field.
//!
//! Requests only ever carry the innermost layer: `{"json": payload}`, either
//! as the POST body or percent-encoded into the `input` query parameter.

use serde::de::value::StringDeserializer;
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor,
};
use serde::{forward_to_deserialize_any, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::ApiError;

/// Outer layer of a response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope<T> {
    pub result: Option<EnvelopeResult<T>>,
}

/// Middle layer of a response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvelopeResult<T> {
    pub data: Option<EnvelopeData<T>>,
}

/// Inner layer of a response; `json` is the payload itself.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvelopeData<T> {
    pub json: Option<T>,
}

impl<T> Envelope<T> {
    /// The payload, if every layer is present.
    pub fn into_payload(self) -> Option<T> {
        self.result?.data?.json
    }
}

/// The request-side wrapper: only the innermost layer is ever sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody<T> {
    pub json: T,
}

/// Decode a response body and extract its payload.
///
/// Returns `Err(ApiError::Decode)` only when `body` is not valid JSON. A
/// missing layer, a null payload, or a payload whose shape does not fit `T`
/// all yield `Ok(None)`.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<Option<T>, ApiError> {
    let value: Value = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    match Envelope::<T>::deserialize(CaseInsensitive(value)) {
        Ok(envelope) => Ok(envelope.into_payload()),
        Err(err) => {
            tracing::warn!(error = %err, "response payload does not match the expected shape");
            Ok(None)
        }
    }
}

/// Serialize `payload` as a `{"json": payload}` request body.
pub fn encode<T: Serialize>(payload: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string(&RequestBody { json: payload })?)
}

/// Serialize `payload` as a percent-encoded `input={"json": payload}` query
/// string (without the leading `?`).
pub fn encode_query_input<T: Serialize>(payload: &T) -> Result<String, ApiError> {
    let input = encode(payload)?;
    Ok(form_urlencoded::Serializer::new(String::new())
        .append_pair("input", &input)
        .finish())
}

/// `serde_json::Value` deserializer with case-insensitive struct fields.
struct CaseInsensitive(Value);

impl<'de> Deserializer<'de> for CaseInsensitive {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Array(items) => visitor.visit_seq(Elements(items.into_iter())),
            Value::Object(map) => visitor.visit_map(Fields::new(map, None)),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(CaseInsensitive(other)),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Object(map) => visitor.visit_map(Fields::new(map, Some(fields))),
            other => other.deserialize_struct(name, fields, visitor),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.0.deserialize_enum(name, variants, visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map identifier
        ignored_any
    }
}

struct Elements(std::vec::IntoIter<Value>);

impl<'de> SeqAccess<'de> for Elements {
    type Error = serde_json::Error;

    fn next_element_seed<S: DeserializeSeed<'de>>(
        &mut self,
        seed: S,
    ) -> Result<Option<S::Value>, Self::Error> {
        self.0.next().map(|item| seed.deserialize(CaseInsensitive(item))).transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.0.len())
    }
}

/// Object entries, keys rewritten to the declared field names when known.
struct Fields {
    entries: std::vec::IntoIter<(String, Value)>,
    pending: Option<Value>,
}

impl Fields {
    fn new(map: Map<String, Value>, declared: Option<&'static [&'static str]>) -> Self {
        let entries = match declared {
            Some(declared) => resolve(map, declared),
            None => map.into_iter().collect(),
        };
        Self {
            entries: entries.into_iter(),
            pending: None,
        }
    }
}

/// Map struct members onto `declared` names, one value per field.
///
/// An exact key beats any case-folded spelling of it; among folded
/// spellings the first wins. Null members are dropped so the field keeps
/// its default.
fn resolve(map: Map<String, Value>, declared: &'static [&'static str]) -> Vec<(String, Value)> {
    let mut resolved: Vec<(String, Value, bool)> = Vec::with_capacity(map.len());
    for (key, value) in map {
        if value.is_null() {
            continue;
        }
        let exact = declared.contains(&key.as_str());
        let name = if exact {
            key
        } else {
            declared
                .iter()
                .find(|field| field.eq_ignore_ascii_case(&key))
                .map_or(key, |field| (*field).to_string())
        };
        match resolved.iter_mut().find(|(seen, _, _)| *seen == name) {
            Some(slot) if exact && !slot.2 => *slot = (name, value, true),
            Some(_) => {}
            None => resolved.push((name, value, exact)),
        }
    }
    resolved.into_iter().map(|(name, value, _)| (name, value)).collect()
}

impl<'de> MapAccess<'de> for Fields {
    type Error = serde_json::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        let Some((key, value)) = self.entries.next() else {
            return Ok(None);
        };
        self.pending = Some(value);
        let key: StringDeserializer<serde_json::Error> = key.into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, Self::Error> {
        match self.pending.take() {
            Some(value) => seed.deserialize(CaseInsensitive(value)),
            None => Err(de::Error::custom("object value requested before its key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}
