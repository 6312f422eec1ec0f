//! A three-version "configuration" schema lineage used across the
//! integration tests.
//!
//! - v0: `{ defaultFields }`
//! - v1: adds `isEnabled: true`
//! - v2: moves `defaultFields` into `fieldConfiguration.{defaultUserFields, defaultCompanyFields}`

#![allow(dead_code)]

use json_evolve::{
    json_patch_changeset, latest_version, versioned, Changelog, Changeset, JsonCodec,
    VersionedCodec,
};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

fn patch(ops: Value) -> json_patch::Patch {
    serde_json::from_value(ops).expect("fixture patch is valid")
}

fn field_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9_ ]{0,8}", 0..6)
}

pub mod v0 {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields, rename_all = "camelCase")]
    pub struct Configuration {
        pub default_fields: Vec<String>,
    }

    pub fn changelog() -> Changelog {
        Changelog::new()
    }

    pub fn codec() -> VersionedCodec<JsonCodec<Configuration>> {
        versioned(JsonCodec::new(), latest_version(&changelog()))
    }

    pub fn configuration() -> impl Strategy<Value = Configuration> {
        field_names().prop_map(|default_fields| Configuration { default_fields })
    }
}

pub mod v1 {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields, rename_all = "camelCase")]
    pub struct Configuration {
        pub default_fields: Vec<String>,
        pub is_enabled: bool,
    }

    pub fn add_is_enabled_field() -> Changeset {
        json_patch_changeset(
            1,
            patch(json!([{ "op": "add", "path": "/isEnabled", "value": true }])),
        )
    }

    pub fn changelog() -> Changelog {
        v0::changelog().with(add_is_enabled_field())
    }

    pub fn codec() -> VersionedCodec<JsonCodec<Configuration>> {
        versioned(JsonCodec::new(), latest_version(&changelog()))
    }

    pub fn configuration() -> impl Strategy<Value = Configuration> {
        (field_names(), any::<bool>()).prop_map(|(default_fields, is_enabled)| Configuration {
            default_fields,
            is_enabled,
        })
    }
}

pub mod v2 {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields, rename_all = "camelCase")]
    pub struct FieldConfiguration {
        pub default_user_fields: Vec<String>,
        pub default_company_fields: Vec<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields, rename_all = "camelCase")]
    pub struct Configuration {
        pub field_configuration: FieldConfiguration,
        pub is_enabled: bool,
    }

    pub fn migrate_default_fields_to_field_configuration() -> Changeset {
        json_patch_changeset(
            2,
            patch(json!([
                {
                    "op": "add",
                    "path": "/fieldConfiguration",
                    "value": { "defaultUserFields": [], "defaultCompanyFields": [] }
                },
                {
                    "op": "copy",
                    "path": "/fieldConfiguration/defaultUserFields",
                    "from": "/defaultFields"
                },
                {
                    "op": "copy",
                    "path": "/fieldConfiguration/defaultCompanyFields",
                    "from": "/defaultFields"
                },
                { "op": "remove", "path": "/defaultFields" }
            ])),
        )
    }

    pub fn changelog() -> Changelog {
        v1::changelog().with(migrate_default_fields_to_field_configuration())
    }

    pub fn codec() -> VersionedCodec<JsonCodec<Configuration>> {
        versioned(JsonCodec::new(), latest_version(&changelog()))
    }

    pub fn configuration() -> impl Strategy<Value = Configuration> {
        (field_names(), field_names(), any::<bool>()).prop_map(
            |(default_user_fields, default_company_fields, is_enabled)| Configuration {
                field_configuration: FieldConfiguration {
                    default_user_fields,
                    default_company_fields,
                },
                is_enabled,
            },
        )
    }
}

/// Serialize `value` and tag it with `version`.
pub fn with_version<T: Serialize>(version: u32, value: &T) -> Value {
    let mut encoded = serde_json::to_value(value).expect("fixture serializes");
    encoded["version"] = json!(version);
    encoded
}
