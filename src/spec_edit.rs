//! Declarative document editor driven by update specs.
//!
//! A spec mirrors the shape of the document it edits. Keys starting with `$`
//! are commands applied to the value at that position, every other key
//! descends into the matching child:
//!
//! ```
//! use serde_json::json;
//!
//! let doc = json!({ "tags": ["a"], "meta": { "count": 1 } });
//! let spec = json!({
//!     "tags": { "$push": ["b"] },
//!     "meta": { "$merge": { "count": 2, "seen": true } }
//! });
//!
//! let edited = json_evolve::spec_edit::apply(&doc, &spec).unwrap();
//! assert_eq!(edited, json!({ "tags": ["a", "b"], "meta": { "count": 2, "seen": true } }));
//! ```
//!
//! Supported commands:
//!
//! | Command    | Target | Argument                                   |
//! |------------|--------|--------------------------------------------|
//! | `$set`     | any    | replacement value (may create the target)  |
//! | `$unset`   | object | array of keys to remove                    |
//! | `$push`    | array  | array of items to append                   |
//! | `$unshift` | array  | array of items to prepend                  |
//! | `$splice`  | array  | array of `[start, deleteCount, ...items]`, `start` non-negative |
//! | `$merge`   | object | object shallow-merged into the target      |
//! | `$toggle`  | object | array of boolean keys to negate            |
//!
//! Keys apply in the order they are written, so `{"$unset": ["a"], "$merge":
//! {"a": 2}}` leaves `a` set while the reverse order removes it.
//!
//! `$set` cannot be combined with other keys. Every other command requires
//! an existing target: descending into a missing attribute is only valid
//! when the nested spec is a `$set`. Negative `$splice` starts counted from
//! the end of the array are not supported.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::version::kind_of;

/// Error raised while applying an update spec.
///
/// Every variant carries the JSON pointer of the position where the spec
/// could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecEditError {
    /// The spec itself is malformed.
    #[error("invalid spec at `{}`: {reason}", shown(.path))]
    InvalidSpec { path: String, reason: String },
    /// A `$`-prefixed key that is not a known command.
    #[error("unknown command `{command}` at `{}`", shown(.path))]
    UnknownCommand { path: String, command: String },
    /// The target has the wrong type for the command.
    #[error("expected target of `{command}` at `{}` to be {expected}, got {found}", shown(.path))]
    UnexpectedTarget {
        path: String,
        command: String,
        expected: &'static str,
        found: &'static str,
    },
    /// The spec descends into an attribute that does not exist.
    #[error("no value at `{}` to update", shown(.path))]
    MissingTarget { path: String },
    /// An array index or splice position outside the target array.
    #[error("index `{index}` at `{}` is out of bounds", shown(.path))]
    InvalidIndex { path: String, index: String },
}

fn shown(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// Apply `spec` to `target`, returning the edited copy.
///
/// `target` is never modified. On error no partial result is returned.
pub fn apply(target: &Value, spec: &Value) -> Result<Value, SpecEditError> {
    update(Some(target.clone()), spec, "")
}

fn update(target: Option<Value>, spec: &Value, path: &str) -> Result<Value, SpecEditError> {
    let spec = spec.as_object().ok_or_else(|| SpecEditError::InvalidSpec {
        path: path.to_string(),
        reason: format!("expected an object, got {}", kind_of(spec)),
    })?;

    if let Some(value) = spec.get("$set") {
        if spec.len() > 1 {
            return Err(SpecEditError::InvalidSpec {
                path: path.to_string(),
                reason: "`$set` cannot be combined with other keys".to_string(),
            });
        }
        return Ok(value.clone());
    }

    let mut current = target.ok_or_else(|| SpecEditError::MissingTarget {
        path: path.to_string(),
    })?;

    for (key, nested) in spec {
        current = if key.starts_with('$') {
            command(key, current, nested, path)?
        } else {
            update_child(current, key, nested, path)?
        };
    }

    Ok(current)
}

fn update_child(
    mut current: Value,
    key: &str,
    nested: &Value,
    path: &str,
) -> Result<Value, SpecEditError> {
    let child_path = format!("{path}/{}", escape(key));

    match &mut current {
        Value::Object(object) => match object.get_mut(key) {
            Some(slot) => {
                let child = std::mem::take(slot);
                *slot = update(Some(child), nested, &child_path)?;
            }
            None => {
                let created = update(None, nested, &child_path)?;
                object.insert(key.to_string(), created);
            }
        },
        Value::Array(items) => {
            let slot = key
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get_mut(index))
                .ok_or_else(|| SpecEditError::InvalidIndex {
                    path: path.to_string(),
                    index: key.to_string(),
                })?;
            let child = std::mem::take(slot);
            *slot = update(Some(child), nested, &child_path)?;
        }
        other => {
            return Err(SpecEditError::UnexpectedTarget {
                path: child_path,
                command: "nested update".to_string(),
                expected: "an object or array",
                found: kind_of(other),
            })
        }
    }

    Ok(current)
}

fn command(name: &str, target: Value, arg: &Value, path: &str) -> Result<Value, SpecEditError> {
    match name {
        "$unset" => {
            let keys = string_list(name, arg, path)?;
            let mut object = expect_object(name, target, path)?;
            for key in keys {
                object.remove(key);
            }
            Ok(Value::Object(object))
        }
        "$push" => {
            let items = array_arg(name, arg, path)?;
            let mut array = expect_array(name, target, path)?;
            array.extend(items.iter().cloned());
            Ok(Value::Array(array))
        }
        "$unshift" => {
            let items = array_arg(name, arg, path)?;
            let array = expect_array(name, target, path)?;
            let mut result = items.clone();
            result.extend(array);
            Ok(Value::Array(result))
        }
        "$splice" => {
            let splices = array_arg(name, arg, path)?;
            let mut array = expect_array(name, target, path)?;
            for splice in splices {
                splice_one(&mut array, splice, path)?;
            }
            Ok(Value::Array(array))
        }
        "$merge" => {
            let patch = arg.as_object().ok_or_else(|| invalid_arg(name, "an object", arg, path))?;
            let mut object = expect_object(name, target, path)?;
            for (key, value) in patch {
                object.insert(key.clone(), value.clone());
            }
            Ok(Value::Object(object))
        }
        "$toggle" => {
            let keys = string_list(name, arg, path)?;
            let mut object = expect_object(name, target, path)?;
            for key in keys {
                let toggled = match object.get(key) {
                    None | Some(Value::Null) => true,
                    Some(Value::Bool(b)) => !b,
                    Some(other) => {
                        return Err(SpecEditError::UnexpectedTarget {
                            path: format!("{path}/{}", escape(key)),
                            command: name.to_string(),
                            expected: "a boolean",
                            found: kind_of(other),
                        })
                    }
                };
                object.insert(key.to_string(), Value::Bool(toggled));
            }
            Ok(Value::Object(object))
        }
        _ => Err(SpecEditError::UnknownCommand {
            path: path.to_string(),
            command: name.to_string(),
        }),
    }
}

fn splice_one(array: &mut Vec<Value>, splice: &Value, path: &str) -> Result<(), SpecEditError> {
    let parts = splice
        .as_array()
        .ok_or_else(|| invalid_arg("$splice", "an array of arrays", splice, path))?;

    let start = match parts.first() {
        Some(raw) => raw
            .as_u64()
            .and_then(|s| usize::try_from(s).ok())
            .filter(|s| *s <= array.len())
            .ok_or_else(|| SpecEditError::InvalidIndex {
                path: path.to_string(),
                index: raw.to_string(),
            })?,
        None => {
            return Err(SpecEditError::InvalidSpec {
                path: path.to_string(),
                reason: "`$splice` entries need at least a start index".to_string(),
            })
        }
    };

    let remaining = array.len() - start;
    let delete_count = match parts.get(1) {
        None => remaining,
        Some(raw) => raw
            .as_u64()
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX).min(remaining))
            .ok_or_else(|| invalid_arg("$splice", "a non-negative delete count", raw, path))?,
    };

    let inserted = parts.iter().skip(2).cloned();
    array.splice(start..start + delete_count, inserted);
    Ok(())
}

fn expect_object(command: &str, target: Value, path: &str) -> Result<Map<String, Value>, SpecEditError> {
    match target {
        Value::Object(object) => Ok(object),
        other => Err(SpecEditError::UnexpectedTarget {
            path: path.to_string(),
            command: command.to_string(),
            expected: "an object",
            found: kind_of(&other),
        }),
    }
}

fn expect_array(command: &str, target: Value, path: &str) -> Result<Vec<Value>, SpecEditError> {
    match target {
        Value::Array(array) => Ok(array),
        other => Err(SpecEditError::UnexpectedTarget {
            path: path.to_string(),
            command: command.to_string(),
            expected: "an array",
            found: kind_of(&other),
        }),
    }
}

fn array_arg<'a>(command: &str, arg: &'a Value, path: &str) -> Result<&'a Vec<Value>, SpecEditError> {
    arg.as_array()
        .ok_or_else(|| invalid_arg(command, "an array", arg, path))
}

fn string_list<'a>(command: &str, arg: &'a Value, path: &str) -> Result<Vec<&'a str>, SpecEditError> {
    array_arg(command, arg, path)?
        .iter()
        .map(|key| {
            key.as_str()
                .ok_or_else(|| invalid_arg(command, "an array of strings", arg, path))
        })
        .collect()
}

fn invalid_arg(command: &str, expected: &str, arg: &Value, path: &str) -> SpecEditError {
    SpecEditError::InvalidSpec {
        path: path.to_string(),
        reason: format!("`{command}` expects {expected}, got {}", kind_of(arg)),
    }
}

fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
