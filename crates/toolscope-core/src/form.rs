// crates/toolscope-core/src/form.rs
// ============================================================================
// Module: Form Synthesizer
// Description: Builds an in-memory editable field tree from a schema node.
// Purpose: Mirror schema structure as typed controls independent of any UI.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Synthesizes a [`FormTree`] from a normalized schema: one [`Field`] per
//! declared property, each holding a typed [`FieldControl`] that mirrors the
//! property's resolved shape. The tree is plain data; rendering it to a
//! concrete surface is a separate projection and mutating it is ordinary
//! method calls, so the same tree backs tests, a terminal outline, or a GUI.
//!
//! ## Invariants
//! - Control choice is decided once per node from its resolved shape.
//! - Fields appear in schema property order.
//! - Defaults seed control state at build time; they are never re-applied.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::schema::ObjectSchema;
use crate::schema::SchemaNode;
use crate::schema::SchemaShape;
use crate::template::FORMAT_COLOR;
use crate::template::FORMAT_MONTH;
use crate::template::FORMAT_WEEK;

// ============================================================================
// SECTION: Field Tree
// ============================================================================

/// Editable field tree synthesized from an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FormTree {
    /// Top-level fields in schema property order.
    pub fields: Vec<Field>,
}

/// One named field with its typed control.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Property name the field binds to.
    pub name: String,
    /// Whether the schema lists the property as required.
    pub required: bool,
    /// Optional description shown alongside the field.
    pub description: Option<String>,
    /// Typed control holding the field's editable state.
    pub control: FieldControl,
}

/// Typed control backing a field, chosen from the resolved schema shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldControl {
    /// Read-only fixed literal.
    Const {
        /// The literal value collected verbatim.
        literal: Value,
    },
    /// Read-only field that always yields `null`.
    Null,
    /// Variant selector over alternative sub-controls.
    OneOf(OneOfControl),
    /// Single choice from a closed value set.
    Enum(EnumControl),
    /// Checkbox-style boolean.
    Boolean(BooleanControl),
    /// Numeric entry kept as text until collected.
    Number(NumberControl),
    /// Growable list of primitive rows.
    Array(ArrayControl),
    /// Growable list of structured object rows.
    ArrayObject(ArrayObjectControl),
    /// Nested group of sub-fields for objects with declared properties.
    ObjectGroup(ObjectGroupControl),
    /// Free-form JSON text for objects or arrays without usable structure.
    JsonText(JsonTextControl),
    /// Single-line text entry, possibly format-specialized.
    Text(TextControl),
}

/// Variant selector state for `oneOf` schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOfControl {
    /// Field name, reused when rebuilding the active sub-control.
    pub field_name: String,
    /// Display label per variant.
    pub options: Vec<String>,
    /// Variant schemas in declaration order.
    pub variants: Vec<SchemaNode>,
    /// Index of the active variant.
    pub selected: usize,
    /// Control synthesized from the active variant.
    pub current: Box<FieldControl>,
}

impl OneOfControl {
    /// Switches the active variant, rebuilding the sub-control from scratch.
    ///
    /// Out-of-range indexes are ignored; state entered under the previous
    /// variant is discarded.
    pub fn select(&mut self, index: usize) {
        let Some(variant) = self.variants.get(index) else {
            return;
        };
        self.selected = index;
        self.current = Box::new(build_control(&self.field_name, variant));
    }
}

/// Closed-choice state for enum schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumControl {
    /// Allowed values in declaration order.
    pub choices: Vec<Value>,
    /// Index of the chosen value, when one is chosen.
    pub selected: Option<usize>,
}

impl EnumControl {
    /// Selects the choice whose display text matches `text`, else clears.
    pub fn select_text(&mut self, text: &str) {
        self.selected = self.choices.iter().position(|choice| choice_text(choice) == text);
    }
}

/// Checkbox state for boolean schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanControl {
    /// Current checked state.
    pub checked: bool,
}

/// Numeric entry state; the raw text is kept until collection parses it.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberControl {
    /// Whether collection truncates to a whole number.
    pub integer: bool,
    /// Inclusive lower bound hint.
    pub minimum: Option<f64>,
    /// Inclusive upper bound hint.
    pub maximum: Option<f64>,
    /// Placeholder shown when the entry is blank.
    pub placeholder: String,
    /// Raw entry text; blank means no value.
    pub text: String,
}

/// Row kind for primitive array controls.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayItemKind {
    /// Rows choose from a closed value set.
    Enum(Vec<Value>),
    /// Rows are checkboxes.
    Boolean,
    /// Rows are numeric entries.
    Number {
        /// Whether rows truncate to whole numbers.
        integer: bool,
        /// Inclusive lower bound hint.
        minimum: Option<f64>,
        /// Inclusive upper bound hint.
        maximum: Option<f64>,
    },
    /// Rows are free text.
    Text,
}

/// One row of a primitive array control.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayRow {
    /// Chosen index into the item enum, when chosen.
    Enum(Option<usize>),
    /// Checked state.
    Boolean(bool),
    /// Raw numeric entry text.
    Number(String),
    /// Raw text entry.
    Text(String),
}

/// Growable list of primitive rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayControl {
    /// Kind every row shares.
    pub item: ArrayItemKind,
    /// Current rows, in order.
    pub rows: Vec<ArrayRow>,
}

impl ArrayControl {
    /// Appends a blank row matching the item kind and returns its index.
    pub fn add_row(&mut self) -> usize {
        let row = match &self.item {
            ArrayItemKind::Enum(_) => ArrayRow::Enum(None),
            ArrayItemKind::Boolean => ArrayRow::Boolean(false),
            ArrayItemKind::Number { .. } => ArrayRow::Number(String::new()),
            ArrayItemKind::Text => ArrayRow::Text(String::new()),
        };
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Removes the row at `index`; out-of-range indexes are ignored.
    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }
}

/// Growable list of structured rows for arrays of property-bearing objects.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayObjectControl {
    /// Schema every row is synthesized from.
    pub item_schema: SchemaNode,
    /// Current rows, each a nested field group.
    pub rows: Vec<ObjectGroupControl>,
}

impl ArrayObjectControl {
    /// Appends a blank row synthesized from the item schema, returns its index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(build_group(&self.item_schema));
        self.rows.len() - 1
    }

    /// Removes the row at `index`; out-of-range indexes are ignored.
    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }
}

/// Nested field group for objects with declared properties.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectGroupControl {
    /// Sub-fields in schema property order.
    pub fields: Vec<Field>,
}

/// Free-form JSON text control for structure-less objects and arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonTextControl {
    /// Whether the schema called for an array rather than an object.
    pub array: bool,
    /// Placeholder shown when the text is blank.
    pub placeholder: String,
    /// Raw JSON text; blank means no value.
    pub text: String,
}

/// Input specialization for text controls, derived from the schema format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputKind {
    /// Plain text.
    Text,
    /// Calendar date.
    Date,
    /// Email address.
    Email,
    /// Telephone number.
    Tel,
    /// Hex color.
    Color,
    /// Local date and time.
    DatetimeLocal,
    /// Year and month.
    Month,
    /// Year and ISO week.
    Week,
    /// Time of day.
    Time,
}

/// Single-line text entry state.
#[derive(Debug, Clone, PartialEq)]
pub struct TextControl {
    /// Input specialization derived from the schema format.
    pub input: TextInputKind,
    /// Placeholder shown when the value is blank.
    pub placeholder: String,
    /// Current text; blank means no value.
    pub value: String,
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Required fields left without a collectible value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("required fields missing values: {}", .fields.join(", "))]
pub struct ValidationError {
    /// Dotted paths of the offending fields.
    pub fields: Vec<String>,
}

impl FormTree {
    /// Returns whether the tree has no fields ("no input parameters").
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the field bound to `name`, when present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns the field bound to `name` mutably, when present.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.name == name)
    }

    /// Checks that every required field holds a collectible value.
    ///
    /// Variant selectors, checkboxes, and list controls always satisfy the
    /// check since they always collect; read-only controls are exempt.
    /// Required sub-fields of nested groups are checked recursively.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing the dotted paths of required
    /// fields whose collected value would be absent.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        collect_missing(&self.fields, "", &mut missing);
        if missing.is_empty() { Ok(()) } else { Err(ValidationError { fields: missing }) }
    }
}

/// Accumulates dotted paths of unsatisfied required fields.
fn collect_missing(fields: &[Field], prefix: &str, missing: &mut Vec<String>) {
    for field in fields {
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{prefix}.{}", field.name)
        };
        if field.required && !control_satisfied(&field.control) {
            missing.push(path.clone());
        }
        if let FieldControl::ObjectGroup(group) = &field.control {
            collect_missing(&group.fields, &path, missing);
        }
    }
}

/// Returns whether a control would collect a value as it stands.
fn control_satisfied(control: &FieldControl) -> bool {
    match control {
        FieldControl::Const { .. }
        | FieldControl::Null
        | FieldControl::OneOf(_)
        | FieldControl::Boolean(_)
        | FieldControl::Array(_)
        | FieldControl::ArrayObject(_) => true,
        FieldControl::Enum(control) => control.selected.is_some(),
        FieldControl::Number(control) => parse_number_text(&control.text, control.integer).is_some(),
        FieldControl::ObjectGroup(group) => {
            group.fields.iter().any(|field| control_satisfied(&field.control))
        }
        FieldControl::JsonText(control) => !control.text.trim().is_empty(),
        FieldControl::Text(control) => !control.value.is_empty(),
    }
}

// ============================================================================
// SECTION: Synthesis
// ============================================================================

/// Synthesizes a field tree from a normalized object schema node.
///
/// Non-object nodes yield an empty tree; [`crate::normalize_input_schema`]
/// guarantees object shape for tool input schemas.
#[must_use]
pub fn build_form(schema: &SchemaNode) -> FormTree {
    schema.as_object().map_or_else(
        || FormTree { fields: Vec::new() },
        |object| FormTree { fields: build_fields(object) },
    )
}

/// Builds the field list for an object schema, in property order.
fn build_fields(object: &ObjectSchema) -> Vec<Field> {
    object
        .properties
        .iter()
        .map(|(name, node)| Field {
            name: name.clone(),
            required: object.required.contains(name),
            description: node.description.clone(),
            control: build_control(name, node),
        })
        .collect()
}

/// Builds a nested group control from an object-shaped item schema.
fn build_group(item_schema: &SchemaNode) -> ObjectGroupControl {
    let fields = item_schema.as_object().map(build_fields).unwrap_or_default();
    ObjectGroupControl { fields }
}

/// Chooses and seeds the control for one schema node.
fn build_control(name: &str, node: &SchemaNode) -> FieldControl {
    match &node.shape {
        SchemaShape::Const(literal) => FieldControl::Const { literal: literal.clone() },
        SchemaShape::OneOf(variants) => FieldControl::OneOf(build_one_of(name, variants)),
        SchemaShape::Null => FieldControl::Null,
        SchemaShape::Enum(choices) => FieldControl::Enum(build_enum(choices, node.default.as_ref())),
        SchemaShape::Boolean => FieldControl::Boolean(BooleanControl {
            checked: node.default.as_ref().is_some_and(truthy),
        }),
        SchemaShape::Number | SchemaShape::Integer => FieldControl::Number(NumberControl {
            integer: matches!(node.shape, SchemaShape::Integer),
            minimum: node.minimum,
            maximum: node.maximum,
            placeholder: entry_placeholder(node, name),
            text: node.default.as_ref().map(number_text).unwrap_or_default(),
        }),
        SchemaShape::Array(item) => build_array_control(node, item.as_deref()),
        SchemaShape::Object(object) if !object.is_empty() => {
            FieldControl::ObjectGroup(ObjectGroupControl { fields: build_fields(object) })
        }
        SchemaShape::Object(_) => FieldControl::JsonText(JsonTextControl {
            array: false,
            placeholder: json_placeholder(node, "{}"),
            text: node.default.as_ref().map(pretty_text).unwrap_or_default(),
        }),
        SchemaShape::Text | SchemaShape::Unknown => FieldControl::Text(TextControl {
            input: text_input_kind(node.format.as_deref()),
            placeholder: entry_placeholder(node, name),
            value: node.default.as_ref().map(scalar_text).unwrap_or_default(),
        }),
    }
}

/// Builds a variant selector with the first variant active.
fn build_one_of(name: &str, variants: &[SchemaNode]) -> OneOfControl {
    let options = variants
        .iter()
        .enumerate()
        .map(|(index, variant)| variant.variant_label(index))
        .collect();
    let current = variants
        .first()
        .map_or(FieldControl::Null, |variant| build_control(name, variant));
    OneOfControl {
        field_name: name.to_string(),
        options,
        variants: variants.to_vec(),
        selected: 0,
        current: Box::new(current),
    }
}

/// Builds a closed-choice control, preselecting a matching default.
fn build_enum(choices: &[Value], default: Option<&Value>) -> EnumControl {
    let selected = default.and_then(|default| {
        let wanted = choice_text(default);
        choices.iter().position(|choice| choice_text(choice) == wanted)
    });
    EnumControl { choices: choices.to_vec(), selected }
}

/// Chooses the list control for an array schema from its item schema.
///
/// Property-bearing object items get structured rows; structure-less object
/// or array items fall back to raw JSON text; everything else gets primitive
/// rows keyed by the item shape.
fn build_array_control(node: &SchemaNode, item: Option<&SchemaNode>) -> FieldControl {
    if let Some(item) = item {
        match &item.shape {
            SchemaShape::Object(object) if !object.is_empty() => {
                return FieldControl::ArrayObject(ArrayObjectControl {
                    item_schema: item.clone(),
                    rows: Vec::new(),
                });
            }
            SchemaShape::Object(_) | SchemaShape::Array(_) => {
                return FieldControl::JsonText(JsonTextControl {
                    array: true,
                    placeholder: json_placeholder(node, "[]"),
                    text: node.default.as_ref().map(pretty_text).unwrap_or_default(),
                });
            }
            _ => {}
        }
    }
    let kind = match item.map(|item| &item.shape) {
        Some(SchemaShape::Enum(values)) => ArrayItemKind::Enum(values.clone()),
        Some(SchemaShape::Boolean) => ArrayItemKind::Boolean,
        Some(shape @ (SchemaShape::Number | SchemaShape::Integer)) => ArrayItemKind::Number {
            integer: matches!(shape, SchemaShape::Integer),
            minimum: item.and_then(|item| item.minimum),
            maximum: item.and_then(|item| item.maximum),
        },
        _ => ArrayItemKind::Text,
    };
    FieldControl::Array(ArrayControl { item: kind, rows: Vec::new() })
}

/// Maps a schema format to a text input specialization.
fn text_input_kind(format: Option<&str>) -> TextInputKind {
    let Some(format) = format else {
        return TextInputKind::Text;
    };
    match format {
        "date" => TextInputKind::Date,
        "email" => TextInputKind::Email,
        "tel" => TextInputKind::Tel,
        FORMAT_COLOR => TextInputKind::Color,
        FORMAT_MONTH => TextInputKind::Month,
        FORMAT_WEEK => TextInputKind::Week,
        _ if format.starts_with("^[0-9]{4}-(0[1-9]|1[0-2])-[0-9]{2}T") => {
            TextInputKind::DatetimeLocal
        }
        _ if format.starts_with("^([01][0-9]|2[0-3]):[0-5][0-9]") => TextInputKind::Time,
        _ => TextInputKind::Text,
    }
}

// ============================================================================
// SECTION: Placeholder and Text Helpers
// ============================================================================

/// Placeholder for scalar entries: first example, else description, else name.
fn entry_placeholder(node: &SchemaNode, name: &str) -> String {
    if let Some(example) = node.examples.first() {
        return format!("e.g. {}", scalar_text(example));
    }
    node.description.clone().unwrap_or_else(|| name.to_string())
}

/// Placeholder for JSON text entries: pretty example, description, or a stub.
fn json_placeholder(node: &SchemaNode, fallback: &str) -> String {
    if let Some(example) = node.examples.first() {
        return format!("e.g. {}", pretty_text(example));
    }
    node.description.clone().unwrap_or_else(|| fallback.to_string())
}

/// Renders a value the way a text entry would display it.
///
/// Strings stay verbatim, null becomes blank, everything else is compact
/// JSON.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Renders a value for a numeric entry; non-numeric text clears the entry.
pub(crate) fn number_text(value: &Value) -> String {
    match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) if text.trim().parse::<f64>().is_ok_and(f64::is_finite) => text.clone(),
        _ => String::new(),
    }
}

/// Renders a value as indented JSON for free-form JSON entries.
pub(crate) fn pretty_text(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Display text for an enum choice; strings verbatim, others compact JSON.
pub(crate) fn choice_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Loose truthiness used for seeding and populating checkboxes.
///
/// Null, `false`, zero, and the empty string are false; every other value,
/// including arrays and objects, is true.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parses numeric entry text; integers truncate the way a step-1 entry does.
pub(crate) fn parse_number_text(text: &str, integer: bool) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed: f64 = trimmed.parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    if integer {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Truncation to the whole part is the intended integer-entry behavior."
        )]
        return Some(Value::from(parsed.trunc() as i64));
    }
    Some(serde_json::Number::from_f64(parsed).map_or(Value::Null, Value::Number))
}
