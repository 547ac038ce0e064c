// crates/toolscope-core/src/bridge.rs
// ============================================================================
// Module: Form/JSON Bridge
// Description: Converts between the field tree and its JSON representation.
// Purpose: Keep form mode and JSON mode of a session interchangeable.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Two directions with asymmetric contracts. [`collect`] produces the minimal
//! argument object: fields without a value are omitted rather than emitted as
//! null, so collecting an untouched optional field adds nothing. [`populate`]
//! merges a JSON document into an existing tree: recognized keys overwrite
//! control state, unknown keys are ignored, and unparseable or non-object
//! documents leave the tree exactly as it was.
//!
//! ## Invariants
//! - `populate` never fails and never partially applies a malformed document.
//! - Collecting then populating then collecting again yields the same object.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::form::ArrayItemKind;
use crate::form::ArrayRow;
use crate::form::Field;
use crate::form::FieldControl;
use crate::form::FormTree;
use crate::form::ObjectGroupControl;
use crate::form::choice_text;
use crate::form::number_text;
use crate::form::parse_number_text;
use crate::form::pretty_text;
use crate::form::scalar_text;
use crate::form::truthy;

// ============================================================================
// SECTION: Collect
// ============================================================================

/// Collects the tree into the minimal argument object.
///
/// Fields whose control yields no value are omitted entirely.
#[must_use]
pub fn collect(tree: &FormTree) -> Map<String, Value> {
    collect_fields(&tree.fields)
}

/// Collects a field list into an object, omitting absent values.
fn collect_fields(fields: &[Field]) -> Map<String, Value> {
    let mut data = Map::new();
    for field in fields {
        if let Some(value) = collect_control(&field.control) {
            data.insert(field.name.clone(), value);
        }
    }
    data
}

/// Collects one control into a value, or nothing when the control is blank.
fn collect_control(control: &FieldControl) -> Option<Value> {
    match control {
        FieldControl::Const { literal } => Some(literal.clone()),
        FieldControl::Null => Some(Value::Null),
        FieldControl::OneOf(control) => collect_control(&control.current),
        FieldControl::Enum(control) => {
            control.selected.and_then(|index| control.choices.get(index).cloned())
        }
        FieldControl::Boolean(control) => Some(Value::Bool(control.checked)),
        FieldControl::Number(control) => parse_number_text(&control.text, control.integer),
        FieldControl::Array(control) => {
            let mut items = Vec::new();
            for row in &control.rows {
                if let Some(item) = collect_row(&control.item, row) {
                    items.push(item);
                }
            }
            Some(Value::Array(items))
        }
        FieldControl::ArrayObject(control) => {
            let mut items = Vec::new();
            for row in &control.rows {
                let object = collect_fields(&row.fields);
                if !object.is_empty() {
                    items.push(Value::Object(object));
                }
            }
            Some(Value::Array(items))
        }
        FieldControl::ObjectGroup(group) => {
            let nested = collect_fields(&group.fields);
            if nested.is_empty() { None } else { Some(Value::Object(nested)) }
        }
        FieldControl::JsonText(control) => {
            let trimmed = control.text.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(
                serde_json::from_str(trimmed)
                    .unwrap_or_else(|_| Value::String(control.text.clone())),
            )
        }
        FieldControl::Text(control) => {
            if control.value.is_empty() {
                None
            } else {
                Some(Value::String(control.value.clone()))
            }
        }
    }
}

/// Collects one primitive row, or nothing when the row is blank.
///
/// Boolean rows always collect; blank enum, number, and text rows are
/// skipped so stray empty rows never pollute the argument array.
fn collect_row(kind: &ArrayItemKind, row: &ArrayRow) -> Option<Value> {
    match (kind, row) {
        (ArrayItemKind::Enum(choices), ArrayRow::Enum(selected)) => {
            selected.and_then(|index| choices.get(index).cloned())
        }
        (ArrayItemKind::Boolean, ArrayRow::Boolean(checked)) => Some(Value::Bool(*checked)),
        (ArrayItemKind::Number { integer, .. }, ArrayRow::Number(text)) => {
            parse_number_text(text, *integer)
        }
        (ArrayItemKind::Text, ArrayRow::Text(text)) => {
            if text.is_empty() { None } else { Some(Value::String(text.clone())) }
        }
        // Row/kind mismatch cannot be constructed through the control API.
        _ => None,
    }
}

// ============================================================================
// SECTION: Populate
// ============================================================================

/// Merges a JSON document into the tree.
///
/// Unparseable text and non-object documents are ignored wholesale; keys
/// without a matching field are ignored individually. Read-only controls
/// never change, and variant selectors keep their selection while the active
/// sub-control is populated in place.
pub fn populate(json_text: &str, tree: &mut FormTree) {
    let source = if json_text.is_empty() { "{}" } else { json_text };
    let Ok(Value::Object(values)) = serde_json::from_str::<Value>(source) else {
        return;
    };
    populate_fields(&mut tree.fields, &values);
}

/// Applies matching keys of `values` to a field list.
fn populate_fields(fields: &mut [Field], values: &Map<String, Value>) {
    for field in fields {
        if let Some(value) = values.get(&field.name) {
            populate_control(&mut field.control, value);
        }
    }
}

/// Applies one value to one control.
fn populate_control(control: &mut FieldControl, value: &Value) {
    match control {
        FieldControl::Const { .. } | FieldControl::Null => {}
        FieldControl::OneOf(control) => populate_control(&mut control.current, value),
        FieldControl::Enum(control) => control.select_text(&choice_text(value)),
        FieldControl::Boolean(control) => control.checked = truthy(value),
        FieldControl::Number(control) => control.text = number_text(value),
        FieldControl::Array(control) => {
            control.rows.clear();
            if let Value::Array(items) = value {
                for item in items {
                    control.rows.push(seed_row(&control.item, item));
                }
            }
        }
        FieldControl::ArrayObject(control) => {
            control.rows.clear();
            if let Value::Array(items) = value {
                for item in items {
                    let index = control.add_row();
                    if let (Some(row), Value::Object(values)) =
                        (control.rows.get_mut(index), item)
                    {
                        populate_group(row, values);
                    }
                }
            }
        }
        FieldControl::ObjectGroup(group) => {
            if let Value::Object(values) = value {
                populate_group(group, values);
            }
        }
        FieldControl::JsonText(control) => {
            control.text = match value {
                Value::Null => "null".to_string(),
                Value::Array(_) | Value::Object(_) => pretty_text(value),
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
        }
        FieldControl::Text(control) => {
            control.value = match value {
                Value::Array(_) | Value::Object(_) => pretty_text(value),
                other => scalar_text(other),
            };
        }
    }
}

/// Applies matching keys of `values` to a nested field group.
fn populate_group(group: &mut ObjectGroupControl, values: &Map<String, Value>) {
    populate_fields(&mut group.fields, values);
}

/// Builds one primitive row seeded from a JSON value.
fn seed_row(kind: &ArrayItemKind, value: &Value) -> ArrayRow {
    match kind {
        ArrayItemKind::Enum(choices) => {
            let wanted = choice_text(value);
            ArrayRow::Enum(choices.iter().position(|choice| choice_text(choice) == wanted))
        }
        ArrayItemKind::Boolean => ArrayRow::Boolean(truthy(value)),
        ArrayItemKind::Number { .. } => ArrayRow::Number(number_text(value)),
        ArrayItemKind::Text => ArrayRow::Text(scalar_text(value)),
    }
}
