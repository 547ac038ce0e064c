// crates/toolscope-core/src/template.rs
// ============================================================================
// Module: Template Generator
// Description: Derives a plausible example JSON value from a schema node.
// Purpose: Seed the JSON editing mode with a value matching the schema.
// Dependencies: serde_json, time
// ============================================================================

//! ## Overview
//! Generates an example value for any [`SchemaNode`] so the JSON mode of a
//! tool session starts from something editable rather than a blank document.
//! Value precedence per node: `const`, first `oneOf` variant, `default`,
//! first example, then a shape-specific placeholder.
//!
//! The generator never reads wall-clock time; the caller passes the instant
//! used for date and time placeholders.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::schema::SchemaNode;
use crate::schema::SchemaShape;

// ============================================================================
// SECTION: Format Discriminators
// ============================================================================

/// Regex-literal format for `yyyy-MM-ddThh:mm:ss.SSS` datetime strings.
pub const FORMAT_DATETIME_MILLIS: &str =
    "^[0-9]{4}-(0[1-9]|1[0-2])-[0-9]{2}T([01][0-9]|2[0-3]):[0-5][0-9](:[0-5][0-9](\\.[0-9]{1,3})?)?$";

/// Regex-literal format for `yyyy-MM-ddThh:mm:ss` datetime strings.
pub const FORMAT_DATETIME_SECONDS: &str =
    "^[0-9]{4}-(0[1-9]|1[0-2])-[0-9]{2}T([01][0-9]|2[0-3]):[0-5][0-9](:[0-5][0-9])?$";

/// Regex-literal format for `yyyy-MM-ddThh:mm` datetime strings.
pub const FORMAT_DATETIME_MINUTES: &str =
    "^[0-9]{4}-(0[1-9]|1[0-2])-[0-9]{2}T([01][0-9]|2[0-3]):[0-5][0-9]$";

/// Regex-literal format for `yyyy-MM` month strings.
pub const FORMAT_MONTH: &str = "^[0-9]{4}-(0[1-9]|1[0-2])$";

/// Regex-literal format for `yyyy-Www` ISO week strings.
pub const FORMAT_WEEK: &str = "^[0-9]{4}-W(0[1-9]|[1-4][0-9]|5[0-3])$";

/// Regex-literal format for `HH:mm:ss.SSS` time strings.
pub const FORMAT_TIME_MILLIS: &str =
    "^([01][0-9]|2[0-3]):[0-5][0-9](:[0-5][0-9](\\.[0-9]{1,3})?)?$";

/// Regex-literal format for `HH:mm:ss` time strings.
pub const FORMAT_TIME_SECONDS: &str = "^([01][0-9]|2[0-3]):[0-5][0-9](:[0-5][0-9])?$";

/// Regex-literal format for `HH:mm` time strings.
pub const FORMAT_TIME_MINUTES: &str = "^([01][0-9]|2[0-3]):[0-5][0-9]$";

/// Regex-literal format for `#rrggbb` color strings.
pub const FORMAT_COLOR: &str = "^#[0-9a-zA-Z]{6}$";

/// Placeholder emitted for strings with no recognized format.
pub const FALLBACK_STRING: &str = "example_string";

// ============================================================================
// SECTION: Template Generation
// ============================================================================

/// Generates an example JSON value for a schema node.
///
/// `now` supplies the instant used for date and time placeholders; it is
/// rendered in UTC to millisecond precision and sliced per format.
#[must_use]
pub fn generate_template(node: &SchemaNode, now: OffsetDateTime) -> Value {
    if let SchemaShape::Const(literal) = &node.shape {
        return literal.clone();
    }
    if let SchemaShape::OneOf(variants) = &node.shape
        && let Some(first) = variants.first()
    {
        return generate_template(first, now);
    }
    if let Some(default) = &node.default {
        return default.clone();
    }
    if let Some(example) = node.examples.first() {
        return example.clone();
    }
    match &node.shape {
        SchemaShape::Object(object) => {
            let mut map = Map::new();
            for (name, property) in &object.properties {
                map.insert(name.clone(), generate_template(property, now));
            }
            Value::Object(map)
        }
        SchemaShape::Array(item) => item
            .as_ref()
            .map_or_else(|| json!([]), |item| json!([generate_template(item, now)])),
        SchemaShape::Enum(values) => values.first().cloned().unwrap_or(Value::Null),
        SchemaShape::Text => Value::String(string_placeholder(node.format.as_deref(), now)),
        SchemaShape::Number | SchemaShape::Integer => numeric_placeholder(node.minimum),
        SchemaShape::Boolean => Value::Bool(false),
        SchemaShape::Null => Value::Null,
        SchemaShape::Const(_) | SchemaShape::OneOf(_) | SchemaShape::Unknown => json!({}),
    }
}

/// Returns the placeholder string for a text node with the given format.
fn string_placeholder(format: Option<&str>, now: OffsetDateTime) -> String {
    let Some(format) = format else {
        return FALLBACK_STRING.to_string();
    };
    match format {
        "date" => iso_slice(now, 0, 10),
        FORMAT_DATETIME_MILLIS => iso_slice(now, 0, 23),
        FORMAT_DATETIME_SECONDS => iso_slice(now, 0, 19),
        FORMAT_DATETIME_MINUTES => iso_slice(now, 0, 16),
        FORMAT_MONTH => iso_slice(now, 0, 7),
        FORMAT_WEEK => format!("{}-W01", iso_slice(now, 0, 4)),
        FORMAT_TIME_MILLIS => iso_slice(now, 11, 23),
        FORMAT_TIME_SECONDS => iso_slice(now, 11, 19),
        FORMAT_TIME_MINUTES => iso_slice(now, 11, 16),
        FORMAT_COLOR => "#ff00ff".to_string(),
        "tel" => "123-456-7890".to_string(),
        "email" => "user@example.com".to_string(),
        _ => FALLBACK_STRING.to_string(),
    }
}

/// Renders `now` in UTC to millisecond precision and returns a slice of it.
///
/// The rendered form is `yyyy-MM-ddThh:mm:ss.SSS` (23 characters); slice
/// bounds are chosen by the caller per format. A formatting failure degrades
/// to the generic string placeholder.
fn iso_slice(now: OffsetDateTime, start: usize, end: usize) -> String {
    let description = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]"
    );
    now.to_offset(time::UtcOffset::UTC)
        .format(&description)
        .ok()
        .and_then(|rendered| rendered.get(start..end).map(str::to_string))
        .unwrap_or_else(|| FALLBACK_STRING.to_string())
}

/// Returns the numeric placeholder: the declared minimum, or zero.
///
/// Whole-valued minima are emitted as integers so integer schemas do not
/// template as `0.0`.
fn numeric_placeholder(minimum: Option<f64>) -> Value {
    let value = minimum.unwrap_or(0.0);
    if value.fract() == 0.0 && value.is_finite() {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Whole-valued f64 minima within i64 range convert exactly."
        )]
        if value >= i64::MIN as f64 && value <= i64::MAX as f64 {
            return json!(value as i64);
        }
    }
    json!(value)
}

#[cfg(test)]
mod tests;
