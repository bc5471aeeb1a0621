//! Sparse request payloads for mutations.
//!
//! # Design
//! Mutation bodies only carry what the caller actually supplied. A value
//! counts as "not supplied" when it is at its type's default: empty string,
//! zero, `false`, `None`, null, or an empty collection (`FieldValue`).
//!
//! Required fields are always written verbatim and always come first.
//! Optional fields and groups follow in the order they were added. A group
//! (a nested object such as resource limits) is written as a whole as soon
//! as one member is set, with the untouched members as zero placeholders, so
//! the remote side always receives a complete sub-object.
//!
//! `serde_json` is built with `preserve_order`, so serialized field order is
//! insertion order and request bodies are reproducible byte for byte.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A value that knows whether it is still at its default.
pub trait FieldValue: Serialize {
    fn is_unset(&self) -> bool;

    /// The value written for an unset member of a group that is being
    /// emitted anyway.
    fn placeholder(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl<T: FieldValue + ?Sized> FieldValue for &T {
    fn is_unset(&self) -> bool {
        (**self).is_unset()
    }

    fn placeholder(&self) -> Result<Value, serde_json::Error> {
        (**self).placeholder()
    }
}

impl FieldValue for str {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl FieldValue for String {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl FieldValue for bool {
    fn is_unset(&self) -> bool {
        !*self
    }
}

macro_rules! integer_field_value {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn is_unset(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

integer_field_value!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl FieldValue for f64 {
    fn is_unset(&self) -> bool {
        *self == 0.0
    }
}

impl<T: Serialize> FieldValue for Vec<T> {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Serialize> FieldValue for [T] {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl<T: FieldValue + Default> FieldValue for Option<T> {
    fn is_unset(&self) -> bool {
        self.as_ref().map_or(true, FieldValue::is_unset)
    }

    fn placeholder(&self) -> Result<Value, serde_json::Error> {
        match self {
            Some(value) => value.placeholder(),
            None => T::default().placeholder(),
        }
    }
}

impl FieldValue for Value {
    fn is_unset(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(flag) => !flag,
            Value::Number(number) => number.as_f64() == Some(0.0),
            Value::String(text) => text.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
        }
    }
}

/// An ordered field map for one mutation body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SparseFields(Map<String, Value>);

impl SparseFields {
    pub fn builder() -> SparseFieldsBuilder {
        SparseFieldsBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Builder for `SparseFields`.
///
/// Serialization failures are held until `build` so calls can be chained.
#[derive(Debug, Default)]
pub struct SparseFieldsBuilder {
    required: Map<String, Value>,
    optional: Map<String, Value>,
    error: Option<serde_json::Error>,
}

impl SparseFieldsBuilder {
    /// Always include `name`, whatever its value.
    pub fn required<V: Serialize + ?Sized>(mut self, name: &str, value: &V) -> Self {
        if self.error.is_none() {
            match serde_json::to_value(value) {
                Ok(value) => {
                    self.required.insert(name.to_string(), value);
                }
                Err(err) => self.error = Some(err),
            }
        }
        self
    }

    /// Include `name` only if `value` is not at its default.
    pub fn optional<V: FieldValue + ?Sized>(mut self, name: &str, value: &V) -> Self {
        if self.error.is_some() || value.is_unset() {
            return self;
        }
        match serde_json::to_value(value) {
            Ok(value) => {
                self.optional.insert(name.to_string(), value);
            }
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Include `group` as the object `name` if any member is set.
    pub fn group(mut self, name: &str, group: FieldGroup) -> Self {
        if self.error.is_some() {
            return self;
        }
        if let Some(err) = group.error {
            self.error = Some(err);
            return self;
        }
        if group.any_set {
            self.optional.insert(name.to_string(), Value::Object(group.members));
        }
        self
    }

    pub fn build(self) -> Result<SparseFields, ApiError> {
        if let Some(err) = self.error {
            return Err(err.into());
        }
        let mut fields = self.required;
        for (name, value) in self.optional {
            fields.entry(name).or_insert(value);
        }
        Ok(SparseFields(fields))
    }
}

/// Members of a nested object that is emitted all-or-nothing.
#[derive(Debug, Default)]
pub struct FieldGroup {
    members: Map<String, Value>,
    any_set: bool,
    error: Option<serde_json::Error>,
}

impl FieldGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn member<V: FieldValue + ?Sized>(mut self, name: &str, value: &V) -> Self {
        if self.error.is_some() {
            return self;
        }
        let encoded = if value.is_unset() {
            value.placeholder()
        } else {
            self.any_set = true;
            serde_json::to_value(value)
        };
        match encoded {
            Ok(value) => {
                self.members.insert(name.to_string(), value);
            }
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Whether the group would be emitted.
    pub fn is_set(&self) -> bool {
        self.any_set
    }
}
