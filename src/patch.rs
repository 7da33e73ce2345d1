//! Property patches
//!
//! A [`PropertyPatch`] is the flat result of a form edit session: a set of
//! [dotted paths](`PropertyPath`) mapped to their new values.
//!
//! Applying a patch walks the target following the path segments and
//! assigns the value at the end of the walk. It is not a deep merge, the
//! walk follows two rules:
//!
//! - if an intermediate property is `null`, the value replaces that `null`
//!   property and the walk stays on the object holding it. The remaining
//!   segments are resolved from there, so the last one is also assigned on
//!   that object.
//! - if an intermediate property does not exist (or is a scalar that cannot
//!   hold properties), the patch is malformed and application fails with
//!   [`MalformedPatchPath`]. No intermediate objects are ever created.
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::ops::Deref;

use thiserror::Error;

use crate::errors::MalformedPatchPath;
use crate::path::{InvalidPath, PropertyPath};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidPatch {
    #[error("patches must be JSON objects, got {0}")]
    NotAnObject(&'static str),

    #[error(transparent)]
    Path(#[from] InvalidPath),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyPatch(BTreeMap<PropertyPath, Value>);

impl PropertyPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value for a path, replacing any previous value for the
    /// same path
    pub fn set(mut self, path: PropertyPath, value: impl Into<Value>) -> Self {
        self.0.insert(path, value.into());
        self
    }

    pub fn insert(&mut self, path: PropertyPath, value: Value) -> Option<Value> {
        self.0.insert(path, value)
    }

    /// Apply the patch to a JSON object
    ///
    /// Entries are applied shortest path first, although results should
    /// not depend on it.
    pub fn apply(&self, target: &mut Value) -> Result<(), MalformedPatchPath> {
        if !target.is_object() {
            return Err(MalformedPatchPath::new("", "patch target is not an object"));
        }

        for (path, value) in self.0.iter() {
            assign(target, path, value.clone())?;
        }
        Ok(())
    }

    pub(crate) fn apply_to_object(
        &self,
        target: &mut Map<String, Value>,
    ) -> Result<(), MalformedPatchPath> {
        let mut root = Value::Object(std::mem::take(target));
        let res = self.apply(&mut root);

        // assignments never replace the root
        if let Value::Object(map) = root {
            *target = map;
        }
        res
    }
}

fn assign(root: &mut Value, path: &PropertyPath, value: Value) -> Result<(), MalformedPatchPath> {
    let (parents, last) = path.split_last();

    // segments leading from the root to the object being walked
    let mut walked: Vec<&str> = Vec::new();
    for segment in parents {
        let child = child_mut(resolve_mut(root, &walked, path)?, segment, path)?;

        // stop early on null properties, the walk stays on this object
        if child.is_null() {
            *child = value.clone();
        } else {
            walked.push(segment.as_ref());
        }
    }

    set(resolve_mut(root, &walked, path)?, last, value, path)
}

fn resolve_mut<'a>(
    root: &'a mut Value,
    segments: &[&str],
    path: &PropertyPath,
) -> Result<&'a mut Value, MalformedPatchPath> {
    segments
        .iter()
        .try_fold(root, |cur, segment| child_mut(cur, segment, path))
}

fn child_mut<'a>(
    value: &'a mut Value,
    segment: &str,
    path: &PropertyPath,
) -> Result<&'a mut Value, MalformedPatchPath> {
    let child = match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
        scalar => {
            return Err(MalformedPatchPath::new(
                path.to_string(),
                format!("cannot read '{segment}' from {}", kind(scalar)),
            ))
        }
    };

    child.ok_or_else(|| MalformedPatchPath::new(path.to_string(), format!("'{segment}' does not exist")))
}

fn set(
    target: &mut Value,
    segment: &str,
    value: Value,
    path: &PropertyPath,
) -> Result<(), MalformedPatchPath> {
    match target {
        Value::Object(map) => {
            map.insert(segment.to_string(), value);
            Ok(())
        }
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(i) if i < items.len() => {
                items[i] = value;
                Ok(())
            }
            Ok(i) if i == items.len() => {
                items.push(value);
                Ok(())
            }
            _ => Err(MalformedPatchPath::new(
                path.to_string(),
                format!("'{segment}' is not a valid index"),
            )),
        },
        scalar => Err(MalformedPatchPath::new(
            path.to_string(),
            format!("cannot set '{segment}' on {}", kind(scalar)),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Deref for PropertyPatch {
    type Target = BTreeMap<PropertyPath, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<(PropertyPath, Value)> for PropertyPatch {
    fn from_iter<I: IntoIterator<Item = (PropertyPath, Value)>>(iter: I) -> Self {
        PropertyPatch(iter.into_iter().collect())
    }
}

impl TryFrom<Map<String, Value>> for PropertyPatch {
    type Error = InvalidPath;

    fn try_from(changes: Map<String, Value>) -> Result<Self, Self::Error> {
        changes
            .into_iter()
            .map(|(path, value)| PropertyPath::parse(&path).map(|path| (path, value)))
            .collect()
    }
}

impl TryFrom<Value> for PropertyPatch {
    type Error = InvalidPatch;

    /// Read a patch from a flat JSON object of `path: value` entries
    fn try_from(changes: Value) -> Result<Self, Self::Error> {
        match changes {
            Value::Object(map) => Ok(PropertyPatch::try_from(map)?),
            other => Err(InvalidPatch::NotAnObject(kind(&other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn patch(changes: Value) -> PropertyPatch {
        PropertyPatch::try_from(changes).unwrap()
    }

    #[test]
    fn it_sets_top_level_properties_directly() {
        let mut target = json!({"name": "Unnamed Folder", "type": "folder"});
        patch(json!({"name": "My Folder", "notes": "some notes"}))
            .apply(&mut target)
            .unwrap();

        assert_eq!(
            target,
            json!({"name": "My Folder", "type": "folder", "notes": "some notes"})
        );
    }

    #[test]
    fn it_descends_into_nested_objects() {
        let mut target = json!({
            "configuration": {"style": {"fillColor": "#000", "border": "1px"}}
        });
        patch(json!({"configuration.style.fillColor": "#fff"}))
            .apply(&mut target)
            .unwrap();

        assert_eq!(
            target,
            json!({
                "configuration": {"style": {"fillColor": "#fff", "border": "1px"}}
            })
        );
    }

    #[test]
    fn it_creates_the_leaf_property_if_missing() {
        let mut target = json!({"configuration": {}});
        patch(json!({"configuration.layout": "grid"}))
            .apply(&mut target)
            .unwrap();

        assert_eq!(target, json!({"configuration": {"layout": "grid"}}));
    }

    #[test]
    fn it_stops_at_null_intermediate_properties() {
        let mut target = json!({"configuration": null, "other": {"a": null}});
        patch(json!({
            "configuration.fillColor": "#fff",
            "other.a.b": 1
        }))
        .apply(&mut target)
        .unwrap();

        // the null is replaced and the leaf is set on the object holding it
        assert_eq!(
            target,
            json!({
                "configuration": "#fff",
                "fillColor": "#fff",
                "other": {"a": 1, "b": 1}
            })
        );
    }

    #[test]
    fn it_resolves_the_remaining_segments_after_a_null() {
        let mut target = json!({"configuration": null, "style": {"color": "red"}});
        patch(json!({"configuration.style.color": "blue"}))
            .apply(&mut target)
            .unwrap();

        assert_eq!(
            target,
            json!({"configuration": "blue", "style": {"color": "blue"}})
        );

        // the next segment does not exist on the object holding the null
        let mut target = json!({"configuration": null});
        let err = patch(json!({"configuration.style.fillColor": "#fff"}))
            .apply(&mut target)
            .unwrap_err();
        assert_eq!(err.path, "configuration.style.fillColor");
    }

    #[test]
    fn it_fails_on_missing_intermediate_properties() {
        let mut target = json!({"configuration": {}});
        let err = patch(json!({"configuration.style.fillColor": "#fff"}))
            .apply(&mut target)
            .unwrap_err();

        assert_eq!(err.path, "configuration.style.fillColor");

        let mut target = json!({});
        assert!(patch(json!({"configuration.style": "x"}))
            .apply(&mut target)
            .is_err());
    }

    #[test]
    fn it_fails_on_scalar_intermediate_properties() {
        let mut target = json!({"name": "folder"});
        assert!(patch(json!({"name.first": "x"})).apply(&mut target).is_err());

        let mut target = json!({"a": {"b": 3}});
        assert!(patch(json!({"a.b.c": "x"})).apply(&mut target).is_err());
    }

    #[test]
    fn it_addresses_array_items_by_index() {
        let mut target = json!({"series": [{"color": "red"}, {"color": "blue"}]});
        patch(json!({"series.1.color": "green", "series.2": {"color": "pink"}}))
            .apply(&mut target)
            .unwrap();

        assert_eq!(
            target,
            json!({"series": [{"color": "red"}, {"color": "green"}, {"color": "pink"}]})
        );

        assert!(patch(json!({"series.7.color": "x"})).apply(&mut target).is_err());
        assert!(patch(json!({"series.9": "x"})).apply(&mut target).is_err());
    }

    #[test]
    fn it_rejects_non_object_targets() {
        let mut target = json!([1, 2, 3]);
        assert!(patch(json!({"0": 1})).apply(&mut target).is_err());
    }

    #[test]
    fn it_rejects_invalid_paths() {
        assert!(matches!(
            PropertyPatch::try_from(json!({"a..b": 1})),
            Err(InvalidPatch::Path(_))
        ));
    }

    #[test]
    fn it_rejects_patches_that_are_not_objects() {
        assert_eq!(
            PropertyPatch::try_from(json!(["name", "My Folder"])),
            Err(InvalidPatch::NotAnObject("an array"))
        );
        assert_eq!(
            PropertyPatch::try_from(Value::Null),
            Err(InvalidPatch::NotAnObject("null"))
        );
    }
}
