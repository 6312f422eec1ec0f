//! Codecs between typed records and their stored JSON shape.
//!
//! [`versioned`] wraps a codec for the bare record so that encoding writes
//! the schema version next to the fields and decoding strips it again before
//! the record shape is checked. The wrapped codec should be strict (for
//! [`JsonCodec`] that means `#[serde(deny_unknown_fields)]` on the record):
//! a version attribute that slipped through is then reported as an unknown
//! field instead of silently ignored.
//!
//! ```
//! use json_evolve::{versioned, Codec, JsonCodec};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! #[serde(deny_unknown_fields)]
//! struct Settings {
//!     enabled: bool,
//! }
//!
//! let codec = versioned(JsonCodec::<Settings>::new(), 2);
//!
//! let stored = codec.encode(&Settings { enabled: true }).unwrap();
//! assert_eq!(stored, json!({ "enabled": true, "version": 2 }));
//! assert_eq!(codec.decode(&stored).unwrap(), Settings { enabled: true });
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::version::{kind_of, parse_version, Version, VERSION_KEY};

/// Error raised by a [`Codec`].
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode {codec}: {source}")]
    Encode {
        codec: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode {codec}: {source}")]
    Decode {
        codec: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{codec} expects a JSON object, got {found}")]
    NotAnObject { codec: String, found: &'static str },
    #[error("{codec} expects a `{key}` attribute")]
    MissingVersion { codec: String, key: String },
    #[error("{codec} expects `{key}` to be a non-negative integer version, got {found}")]
    InvalidVersion {
        codec: String,
        key: String,
        found: Value,
    },
    #[error("{codec} cannot add `{key}`: the encoded record already has that attribute")]
    ReservedKey { codec: String, key: String },
}

/// Two-way mapping between a typed value and its JSON shape.
pub trait Codec {
    /// The decoded, typed value.
    type Value;

    /// Human-readable name used in error messages.
    fn name(&self) -> String;

    fn encode(&self, value: &Self::Value) -> Result<Value, CodecError>;

    /// Validate `input` and decode it.
    fn decode(&self, input: &Value) -> Result<Self::Value, CodecError>;
}

/// [`Codec`] backed by `serde_json` for any serde type.
pub struct JsonCodec<T> {
    name: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    /// Codec named after the Rust type.
    pub fn new() -> Self {
        Self::named(std::any::type_name::<T>())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _record: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::named(self.name.clone())
    }
}

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JsonCodec").field(&self.name).finish()
    }
}

impl<T: Serialize + DeserializeOwned> Codec for JsonCodec<T> {
    type Value = T;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn encode(&self, value: &T) -> Result<Value, CodecError> {
        serde_json::to_value(value).map_err(|source| CodecError::Encode {
            codec: self.name(),
            source,
        })
    }

    fn decode(&self, input: &Value) -> Result<T, CodecError> {
        T::deserialize(input).map_err(|source| CodecError::Decode {
            codec: self.name(),
            source,
        })
    }
}

/// A codec that tags the encoded record with a fixed schema version.
///
/// Built with [`versioned`].
#[derive(Debug, Clone)]
pub struct VersionedCodec<C> {
    inner: C,
    version: Version,
    key: String,
}

/// Wrap `codec` so its records are stored with `version` under the default
/// version key.
pub fn versioned<C: Codec>(codec: C, version: Version) -> VersionedCodec<C> {
    VersionedCodec {
        inner: codec,
        version,
        key: VERSION_KEY.to_string(),
    }
}

impl<C> VersionedCodec<C> {
    /// Store the version under `key` instead of the default.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Version written on encode.
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Codec> Codec for VersionedCodec<C> {
    type Value = C::Value;

    fn name(&self) -> String {
        format!("Versioned<{}>", self.inner.name())
    }

    fn encode(&self, value: &C::Value) -> Result<Value, CodecError> {
        match self.inner.encode(value)? {
            Value::Object(mut object) => {
                if object.contains_key(&self.key) {
                    return Err(CodecError::ReservedKey {
                        codec: self.name(),
                        key: self.key.clone(),
                    });
                }
                object.insert(self.key.clone(), Value::from(self.version));
                Ok(Value::Object(object))
            }
            other => Err(CodecError::NotAnObject {
                codec: self.name(),
                found: kind_of(&other),
            }),
        }
    }

    /// Decode a version-tagged record.
    ///
    /// Only the shape of the version attribute is checked, not its value:
    /// evolve stored records before decoding them with the current codec.
    fn decode(&self, input: &Value) -> Result<C::Value, CodecError> {
        let object = input.as_object().ok_or_else(|| CodecError::NotAnObject {
            codec: self.name(),
            found: kind_of(input),
        })?;

        let raw = object.get(&self.key).ok_or_else(|| CodecError::MissingVersion {
            codec: self.name(),
            key: self.key.clone(),
        })?;
        if parse_version(raw).is_none() {
            return Err(CodecError::InvalidVersion {
                codec: self.name(),
                key: self.key.clone(),
                found: raw.clone(),
            });
        }

        let mut bare = object.clone();
        bare.remove(&self.key);
        self.inner.decode(&Value::Object(bare))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Flags {
        enabled: bool,
        names: Vec<String>,
    }

    fn sample() -> Flags {
        Flags {
            enabled: true,
            names: vec!["a".into()],
        }
    }

    #[test]
    fn encode_adds_version() {
        let codec = versioned(JsonCodec::<Flags>::new(), 3);
        assert_eq!(
            codec.encode(&sample()).unwrap(),
            json!({ "enabled": true, "names": ["a"], "version": 3 })
        );
    }

    #[test]
    fn decode_strips_version() {
        let codec = versioned(JsonCodec::<Flags>::new(), 3);
        let stored = json!({ "enabled": true, "names": ["a"], "version": 3 });
        assert_eq!(codec.decode(&stored).unwrap(), sample());
    }

    #[test]
    fn strict_inner_codec_rejects_unstripped_version() {
        let stored = json!({ "enabled": true, "names": [], "version": 3 });
        let err = JsonCodec::<Flags>::new().decode(&stored).unwrap_err();
        assert!(matches!(err, CodecError::Decode { .. }));
    }

    #[test]
    fn decode_requires_version() {
        let codec = versioned(JsonCodec::<Flags>::named("Flags"), 1);
        let err = codec
            .decode(&json!({ "enabled": true, "names": [] }))
            .unwrap_err();
        assert_eq!(err.to_string(), "Versioned<Flags> expects a `version` attribute");
    }

    #[test]
    fn decode_rejects_malformed_version() {
        let codec = versioned(JsonCodec::<Flags>::new(), 1);
        let err = codec
            .decode(&json!({ "enabled": true, "names": [], "version": "1" }))
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidVersion { .. }));
    }

    #[test]
    fn decode_rejects_non_objects() {
        let codec = versioned(JsonCodec::<Flags>::new(), 1);
        let err = codec.decode(&json!([1])).unwrap_err();
        assert!(matches!(err, CodecError::NotAnObject { found: "array", .. }));
    }

    #[test]
    fn encode_refuses_to_shadow_a_field() {
        #[derive(Serialize, Deserialize)]
        struct HasVersion {
            version: String,
        }

        let codec = versioned(JsonCodec::<HasVersion>::new(), 1);
        let err = codec
            .encode(&HasVersion {
                version: "x".into(),
            })
            .unwrap_err();
        assert!(matches!(err, CodecError::ReservedKey { .. }));

        let renamed = versioned(JsonCodec::<HasVersion>::new(), 1).with_key("_version");
        assert_eq!(
            renamed
                .encode(&HasVersion {
                    version: "x".into()
                })
                .unwrap(),
            json!({ "version": "x", "_version": 1 })
        );
    }

    #[test]
    fn encode_rejects_non_object_shapes() {
        let codec = versioned(JsonCodec::<Vec<u8>>::new(), 1);
        let err = codec.encode(&vec![1, 2]).unwrap_err();
        assert!(matches!(err, CodecError::NotAnObject { .. }));
    }

    #[test]
    fn name_wraps_inner() {
        let codec = versioned(JsonCodec::<Flags>::named("Flags"), 1);
        assert_eq!(codec.name(), "Versioned<Flags>");
        assert_eq!(codec.version(), 1);
        assert_eq!(codec.key(), "version");
    }
}
