//! Case-insensitive field matching on top of `serde_json::Value`.
//!
//! Object keys are matched against a struct's field names ignoring ASCII
//! case. A key that matches a field exactly always wins, so an object
//! carrying both `name` and `Name` still deserializes `name` from `name`.

use serde::de::value::StringDeserializer;
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, Deserializer, IntoDeserializer, MapAccess, SeqAccess,
    Visitor,
};
use serde::forward_to_deserialize_any;
use serde_json::{Map, Value};

/// Deserializes `value` into `T`, matching struct fields case-insensitively.
///
/// # Errors
///
/// Returns an error if `value` does not have the shape of `T`.
///
/// # Example
///
/// ```
/// use resilient_http::decode::from_value;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     user_name: String,
/// }
///
/// let user: User = from_value(serde_json::json!({ "USER_NAME": "ada" })).unwrap();
/// assert_eq!(user.user_name, "ada");
/// ```
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    T::deserialize(CaseInsensitive(value))
}

/// A JSON value whose objects are matched to struct fields ignoring case.
struct CaseInsensitive(Value);

impl<'de> Deserializer<'de> for CaseInsensitive {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Array(items) => visitor.visit_seq(SeqAdapter::new(items)),
            Value::Object(map) => visitor.visit_map(MapAdapter::new(map, &[])),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(Self(other)),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Array(items) => visitor.visit_seq(SeqAdapter::new(items)),
            other => other.deserialize_seq(visitor),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Object(map) => visitor.visit_map(MapAdapter::new(map, &[])),
            other => other.deserialize_map(visitor),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Object(map) => visitor.visit_map(MapAdapter::new(map, fields)),
            Value::Array(items) => visitor.visit_seq(SeqAdapter::new(items)),
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
        bytes byte_buf unit unit_struct identifier ignored_any
    }
}

struct SeqAdapter {
    iter: std::vec::IntoIter<Value>,
}

impl SeqAdapter {
    fn new(items: Vec<Value>) -> Self {
        Self {
            iter: items.into_iter(),
        }
    }
}

impl<'de> SeqAccess<'de> for SeqAdapter {
    type Error = serde_json::Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        self.iter
            .next()
            .map(|value| seed.deserialize(CaseInsensitive(value)))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapAdapter {
    iter: serde_json::map::IntoIter,
    value: Option<Value>,
    fields: &'static [&'static str],
    /// Fields that some key matches exactly.
    exact: Vec<&'static str>,
}

impl MapAdapter {
    fn new(map: Map<String, Value>, fields: &'static [&'static str]) -> Self {
        let exact = fields
            .iter()
            .copied()
            .filter(|field| map.contains_key(*field))
            .collect();
        Self {
            iter: map.into_iter(),
            value: None,
            fields,
            exact,
        }
    }

    fn canonical_key(&self, key: String) -> String {
        if self.fields.iter().any(|field| *field == key) {
            return key;
        }
        match self
            .fields
            .iter()
            .find(|field| field.eq_ignore_ascii_case(&key))
        {
            Some(field) if !self.exact.contains(field) => (*field).to_string(),
            _ => key,
        }
    }
}

impl<'de> MapAccess<'de> for MapAdapter {
    type Error = serde_json::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        let Some((key, value)) = self.iter.next() else {
            return Ok(None);
        };
        self.value = Some(value);
        let key: StringDeserializer<Self::Error> = self.canonical_key(key).into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, Self::Error> {
        match self.value.take() {
            Some(value) => seed.deserialize(CaseInsensitive(value)),
            None => Err(de::Error::custom("value requested before key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}
