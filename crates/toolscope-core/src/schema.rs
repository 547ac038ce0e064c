// crates/toolscope-core/src/schema.rs
// ============================================================================
// Module: Schema Model
// Description: Canonical schema nodes and input-schema normalization.
// Purpose: Resolve loosely-typed schema JSON into a fixed tagged union.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Tool input schemas arrive from untrusted pages in whatever shape the host
//! API produced: an object, a JSON-encoded string, a `parameters` mapping
//! instead of `properties`, or outright garbage. This module parses and
//! normalizes that input into [`SchemaNode`] values whose shape is resolved
//! exactly once via a fixed precedence and never re-probed mid-traversal.
//!
//! ## Invariants
//! - [`normalize_input_schema`] always yields an object-shaped node; malformed
//!   input degrades to "no input parameters" rather than failing the caller.
//! - Property order is preserved as encountered in the source document.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Schema Nodes
// ============================================================================

/// Resolved shape of a schema node.
///
/// Resolution precedence (first match wins): `const`, `oneOf`, `type: null`,
/// non-empty `enum`, `boolean`, `number`/`integer`, `array`, `object`, then
/// explicit `string`, and finally [`SchemaShape::Unknown`] for missing or
/// unrecognized `type` values.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaShape {
    /// Fixed literal value.
    Const(Value),
    /// Tagged union of alternative schemas, in declaration order.
    OneOf(Vec<SchemaNode>),
    /// Explicit null type.
    Null,
    /// Closed set of allowed primitive values, in declaration order.
    Enum(Vec<Value>),
    /// Boolean value.
    Boolean,
    /// Floating-point number.
    Number,
    /// Whole number.
    Integer,
    /// Sequence of items described by the optional item schema.
    Array(Option<Box<SchemaNode>>),
    /// Object with declared properties.
    Object(ObjectSchema),
    /// Explicit string type.
    Text,
    /// Missing or unrecognized type.
    Unknown,
}

/// Declared properties and required-name set of an object schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    /// Property name/schema pairs in source order.
    pub properties: Vec<(String, SchemaNode)>,
    /// Names of required properties.
    pub required: BTreeSet<String>,
}

impl ObjectSchema {
    /// Returns the schema for a named property when declared.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties.iter().find(|(key, _)| key == name).map(|(_, node)| node)
    }

    /// Returns whether the object declares no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Schema node with a resolved shape and presentation facets.
///
/// # Invariants
/// - The shape is resolved once at construction and treated as immutable for
///   the lifetime of any form synthesized from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Resolved shape discriminant.
    pub shape: SchemaShape,
    /// Optional display title (used to label `oneOf` variants).
    pub title: Option<String>,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Optional string format discriminator (named or regex-literal).
    pub format: Option<String>,
    /// Declared default value, verbatim.
    pub default: Option<Value>,
    /// Declared example values, in order.
    pub examples: Vec<Value>,
    /// Inclusive lower bound for numeric values.
    pub minimum: Option<f64>,
    /// Inclusive upper bound for numeric values.
    pub maximum: Option<f64>,
}

impl SchemaNode {
    /// Resolves an arbitrary JSON value into a schema node.
    ///
    /// Non-object input yields an [`SchemaShape::Unknown`] node with no
    /// facets, which downstream components treat as a free-text field.
    #[must_use]
    pub fn resolve(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::unknown();
        };
        Self {
            shape: resolve_shape(map),
            title: string_facet(map, "title"),
            description: string_facet(map, "description"),
            format: string_facet(map, "format"),
            default: map.get("default").cloned(),
            examples: array_facet(map, "examples"),
            minimum: number_facet(map, "minimum"),
            maximum: number_facet(map, "maximum"),
        }
    }

    /// Returns an empty object-shaped node ("no input parameters").
    #[must_use]
    pub fn empty_object() -> Self {
        Self::with_shape(SchemaShape::Object(ObjectSchema::default()))
    }

    /// Returns a facet-free node with the given shape.
    #[must_use]
    fn with_shape(shape: SchemaShape) -> Self {
        Self {
            shape,
            title: None,
            description: None,
            format: None,
            default: None,
            examples: Vec::new(),
            minimum: None,
            maximum: None,
        }
    }

    /// Returns a facet-free unknown node.
    #[must_use]
    fn unknown() -> Self {
        Self::with_shape(SchemaShape::Unknown)
    }

    /// Returns the declared object schema when this node is object-shaped.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.shape {
            SchemaShape::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns a short label for the node, used for `oneOf` variant options.
    #[must_use]
    pub fn variant_label(&self, index: usize) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        if let Some(label) = shape_type_label(&self.shape) {
            return label.to_string();
        }
        format!("Option {}", index.saturating_add(1))
    }
}

/// Resolves the shape discriminant from a raw schema mapping.
fn resolve_shape(map: &Map<String, Value>) -> SchemaShape {
    if let Some(literal) = map.get("const") {
        return SchemaShape::Const(literal.clone());
    }
    if let Some(Value::Array(variants)) = map.get("oneOf")
        && !variants.is_empty()
    {
        return SchemaShape::OneOf(variants.iter().map(SchemaNode::resolve).collect());
    }
    let type_name = map.get("type").and_then(Value::as_str);
    if type_name == Some("null") {
        return SchemaShape::Null;
    }
    if let Some(Value::Array(values)) = map.get("enum")
        && !values.is_empty()
    {
        return SchemaShape::Enum(values.clone());
    }
    match type_name {
        Some("boolean") => SchemaShape::Boolean,
        Some("number") => SchemaShape::Number,
        Some("integer") => SchemaShape::Integer,
        Some("array") => {
            SchemaShape::Array(map.get("items").map(|items| Box::new(SchemaNode::resolve(items))))
        }
        Some("object") => SchemaShape::Object(resolve_object(map)),
        Some("string") => SchemaShape::Text,
        _ => SchemaShape::Unknown,
    }
}

/// Resolves declared properties and the required set of an object schema.
fn resolve_object(map: &Map<String, Value>) -> ObjectSchema {
    let properties = map
        .get("properties")
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .map(|(name, value)| (name.clone(), SchemaNode::resolve(value)))
                .collect()
        })
        .unwrap_or_default();
    ObjectSchema { properties, required: required_names(map) }
}

/// Collects required property names from a raw schema mapping.
fn required_names(map: &Map<String, Value>) -> BTreeSet<String> {
    map.get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Returns a stable type label for shapes that have one.
const fn shape_type_label(shape: &SchemaShape) -> Option<&'static str> {
    match shape {
        SchemaShape::Null => Some("null"),
        SchemaShape::Boolean => Some("boolean"),
        SchemaShape::Number => Some("number"),
        SchemaShape::Integer => Some("integer"),
        SchemaShape::Array(_) => Some("array"),
        SchemaShape::Object(_) => Some("object"),
        SchemaShape::Text => Some("string"),
        SchemaShape::Const(_) | SchemaShape::OneOf(_) | SchemaShape::Enum(_)
        | SchemaShape::Unknown => None,
    }
}

/// Extracts an optional string facet from a raw schema mapping.
fn string_facet(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Extracts an optional numeric facet from a raw schema mapping.
fn number_facet(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

/// Extracts an array facet from a raw schema mapping, defaulting to empty.
fn array_facet(map: &Map<String, Value>, key: &str) -> Vec<Value> {
    map.get(key).and_then(Value::as_array).cloned().unwrap_or_default()
}

// ============================================================================
// SECTION: Input Schema Normalization
// ============================================================================

/// Parses a tool input schema that may arrive as a string or an object.
///
/// Missing values, empty strings, and unparseable strings all degrade to an
/// empty object; the caller never observes a failure.
#[must_use]
pub fn parse_input_schema(raw: Option<&Value>) -> Value {
    match raw {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Value::Object(Map::new());
            }
            serde_json::from_str(trimmed).unwrap_or_else(|_| Value::Object(Map::new()))
        }
        Some(value @ Value::Object(_)) => value.clone(),
        Some(_) => Value::Object(Map::new()),
    }
}

/// Normalizes an arbitrary schema value into a canonical object schema node.
///
/// Rules, in order: non-object input degrades to an empty-properties object;
/// a usable `properties` mapping is adopted as-is together with `required`;
/// otherwise a usable `parameters` mapping (API variant naming) is adopted as
/// the property set; anything else degrades to "no input parameters".
#[must_use]
pub fn normalize_input_schema(value: &Value) -> SchemaNode {
    let Value::Object(map) = value else {
        return SchemaNode::empty_object();
    };
    let adopted = map
        .get("properties")
        .and_then(Value::as_object)
        .or_else(|| map.get("parameters").and_then(Value::as_object));
    let Some(entries) = adopted else {
        return SchemaNode::empty_object();
    };
    let properties = entries
        .iter()
        .map(|(name, property)| (name.clone(), SchemaNode::resolve(property)))
        .collect();
    SchemaNode::with_shape(SchemaShape::Object(ObjectSchema {
        properties,
        required: required_names(map),
    }))
}
