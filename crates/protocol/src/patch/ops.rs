//! Structural edits on an untyped YAML tree.

use serde_yaml::{Mapping, Value};

use super::path::{PatchPath, Segment};
use crate::error::{ProtocolError, Result};
use crate::schema::raw::scalar_text;
use crate::schema::{Operation, OperationKind};

/// Whether the rest of the patch should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Continue,
    Abort,
}

pub(crate) fn apply(root: &mut Value, op: &Operation) -> Result<Step> {
    let path = &op.path;
    if op.kind == OperationKind::Test {
        let expected = op.value.as_ref().unwrap_or(&Value::Null);
        return Ok(match lookup(root, path.segments()) {
            Some(actual) if actual == expected => Step::Continue,
            _ => Step::Abort,
        });
    }

    let (last, parents) = path
        .segments()
        .split_last()
        .ok_or_else(|| ProtocolError::address(path, "empty path"))?;

    let create = op.kind == OperationKind::Add;
    let mut node = root;
    for (i, segment) in parents.iter().enumerate() {
        let next = parents.get(i + 1).unwrap_or(last);
        node = descend(node, segment, next, create, path)?;
    }

    match op.kind {
        OperationKind::Remove => remove(node, last, path)?,
        kind => {
            let value = op.value.clone().unwrap_or(Value::Null);
            set(node, last, value, kind == OperationKind::Add, path)?;
        }
    }
    Ok(Step::Continue)
}

fn descend<'a>(
    node: &'a mut Value,
    segment: &Segment,
    next: &Segment,
    create: bool,
    path: &PatchPath,
) -> Result<&'a mut Value> {
    match segment {
        Segment::Key { name, optional } => {
            let map = expect_mapping(node, name, path)?;
            let key = Value::String(name.clone());
            let create_here = if *optional {
                map.get(&key).map_or(true, Value::is_null)
            } else {
                create && !map.contains_key(&key)
            };
            if create_here {
                map.insert(key.clone(), empty_container(next));
            }
            map.get_mut(&key)
                .ok_or_else(|| ProtocolError::address(path, format!("missing key '{}'", name)))
        }
        Segment::Index { index, raw } => match node {
            Value::Sequence(seq) => {
                let len = seq.len();
                seq.get_mut(*index).ok_or_else(|| {
                    ProtocolError::address(path, format!("index {} out of range (len {})", index, len))
                })
            }
            Value::Mapping(map) => {
                let key = Value::String(raw.clone());
                if create && !map.contains_key(&key) {
                    map.insert(key.clone(), empty_container(next));
                }
                map.get_mut(&key)
                    .ok_or_else(|| ProtocolError::address(path, format!("missing key '{}'", raw)))
            }
            _ => Err(ProtocolError::address(
                path,
                format!("'{}' does not address a sequence or mapping", raw),
            )),
        },
        Segment::Attribute { key, value } => {
            let seq = expect_sequence(node, path)?;
            seq.iter_mut()
                .find(|element| attribute_matches(element, key, value))
                .ok_or_else(|| {
                    ProtocolError::address(path, format!("no element with {}={}", key, value))
                })
        }
        Segment::Append => Err(ProtocolError::address(path, "'-' must be the final segment")),
    }
}

fn set(node: &mut Value, last: &Segment, value: Value, insert: bool, path: &PatchPath) -> Result<()> {
    match last {
        Segment::Key { name, .. } => {
            expect_mapping(node, name, path)?.insert(Value::String(name.clone()), value);
        }
        Segment::Index { index, raw } => match node {
            Value::Sequence(seq) if insert && *index <= seq.len() => seq.insert(*index, value),
            Value::Sequence(seq) if !insert && *index < seq.len() => seq[*index] = value,
            Value::Sequence(seq) => {
                return Err(ProtocolError::address(
                    path,
                    format!("index {} out of range (len {})", index, seq.len()),
                ))
            }
            Value::Mapping(map) => {
                map.insert(Value::String(raw.clone()), value);
            }
            _ => {
                return Err(ProtocolError::address(
                    path,
                    format!("'{}' does not address a sequence or mapping", raw),
                ))
            }
        },
        Segment::Attribute { key, value: wanted } => {
            let target = expect_sequence(node, path)?
                .iter_mut()
                .find(|element| attribute_matches(element, key, wanted))
                .ok_or_else(|| {
                    ProtocolError::address(path, format!("no element with {}={}", key, wanted))
                })?;
            *target = value;
        }
        Segment::Append => expect_sequence(node, path)?.push(value),
    }
    Ok(())
}

fn remove(node: &mut Value, last: &Segment, path: &PatchPath) -> Result<()> {
    match last {
        Segment::Key { name, .. } => {
            expect_mapping(node, name, path)?
                .remove(name.as_str())
                .ok_or_else(|| ProtocolError::address(path, format!("missing key '{}'", name)))?;
        }
        Segment::Index { index, raw } => match node {
            Value::Sequence(seq) if *index < seq.len() => {
                seq.remove(*index);
            }
            Value::Sequence(seq) => {
                return Err(ProtocolError::address(
                    path,
                    format!("index {} out of range (len {})", index, seq.len()),
                ))
            }
            Value::Mapping(map) => {
                map.remove(raw.as_str())
                    .ok_or_else(|| ProtocolError::address(path, format!("missing key '{}'", raw)))?;
            }
            _ => {
                return Err(ProtocolError::address(
                    path,
                    format!("'{}' does not address a sequence or mapping", raw),
                ))
            }
        },
        Segment::Attribute { key, value } => {
            let seq = expect_sequence(node, path)?;
            let before = seq.len();
            seq.retain(|element| !attribute_matches(element, key, value));
            if seq.len() == before {
                return Err(ProtocolError::address(
                    path,
                    format!("no element with {}={}", key, value),
                ));
            }
        }
        Segment::Append => return Err(ProtocolError::address(path, "cannot remove '-'")),
    }
    Ok(())
}

/// Read-only resolution used by `test`. Optional keys are never created.
fn lookup<'a>(node: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    segments.iter().try_fold(node, |node, segment| match segment {
        Segment::Key { name, .. } => node.as_mapping()?.get(name.as_str()),
        Segment::Index { index, raw } => match node {
            Value::Sequence(seq) => seq.get(*index),
            Value::Mapping(map) => map.get(raw.as_str()),
            _ => None,
        },
        Segment::Attribute { key, value } => node
            .as_sequence()?
            .iter()
            .find(|element| attribute_matches(element, key, value)),
        Segment::Append => None,
    })
}

fn attribute_matches(element: &Value, key: &str, value: &str) -> bool {
    element
        .get(key)
        .and_then(scalar_text)
        .map_or(false, |text| text == value)
}

fn empty_container(next: &Segment) -> Value {
    if next.wants_sequence() {
        Value::Sequence(Vec::new())
    } else {
        Value::Mapping(Mapping::new())
    }
}

fn expect_mapping<'a>(node: &'a mut Value, key: &str, path: &PatchPath) -> Result<&'a mut Mapping> {
    node.as_mapping_mut().ok_or_else(|| {
        ProtocolError::address(path, format!("key '{}' is not inside a mapping", key))
    })
}

fn expect_sequence<'a>(node: &'a mut Value, path: &PatchPath) -> Result<&'a mut Vec<Value>> {
    node.as_sequence_mut()
        .ok_or_else(|| ProtocolError::address(path, "expected a sequence"))
}
