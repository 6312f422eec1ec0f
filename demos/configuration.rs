//! Read path for a stored configuration record: evolve whatever version was
//! persisted, then decode it with the current schema.
//!
//! Run with `cargo run --example configuration`.

use json_evolve::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct FieldConfiguration {
    default_user_fields: Vec<String>,
    default_company_fields: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct Configuration {
    field_configuration: FieldConfiguration,
    is_enabled: bool,
}

fn main() {
    let changelog: Changelog = serde_json::from_value(json!([
        {
            "type": "JSON_PATCH_CHANGESET",
            "version": 2,
            "patch": [
                {
                    "op": "add",
                    "path": "/fieldConfiguration",
                    "value": { "defaultUserFields": [], "defaultCompanyFields": [] }
                },
                { "op": "copy", "path": "/fieldConfiguration/defaultUserFields", "from": "/defaultFields" },
                { "op": "copy", "path": "/fieldConfiguration/defaultCompanyFields", "from": "/defaultFields" },
                { "op": "remove", "path": "/defaultFields" }
            ]
        },
        {
            "type": "JSON_PATCH_CHANGESET",
            "version": 1,
            "patch": [{ "op": "add", "path": "/isEnabled", "value": true }]
        }
    ]))
    .expect("changelog is valid");

    let evolver = Evolver::new(changelog);
    let codec = versioned(JsonCodec::<Configuration>::new(), evolver.latest_version());

    let stored = [
        json!({ "version": 0, "defaultFields": ["name", "id"] }),
        json!({ "version": 1, "defaultFields": ["email"], "isEnabled": false }),
        json!({ "version": 2, "isEnabled": true, "fieldConfiguration": {
            "defaultUserFields": ["id"], "defaultCompanyFields": []
        }}),
    ];

    for record in &stored {
        match evolver.evolve(record) {
            Ok(current) => match codec.decode(&current) {
                Ok(config) => println!("{record} -> {config:?}"),
                Err(err) => println!("{record} -> decode failed: {err}"),
            },
            Err(err) => println!("{record} -> [{}] {err}", err.code()),
        }
    }

    let written = codec
        .encode(&Configuration {
            field_configuration: FieldConfiguration {
                default_user_fields: vec!["id".into()],
                default_company_fields: vec!["id".into()],
            },
            is_enabled: true,
        })
        .expect("configuration encodes");
    println!("stored as {written}");
}
