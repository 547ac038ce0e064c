// crates/toolscope-core/src/template/tests.rs
// ============================================================================
// Module: Template Generator Unit Tests
// Description: Validates example value generation across shapes and formats.
// Purpose: Pin the value precedence and date/time placeholder slicing.
// Dependencies: serde_json, time
// ============================================================================

//! ## Overview
//! Exercises the value precedence chain and each format placeholder against a
//! fixed instant so generated templates are deterministic.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions use panic-based helpers for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;
use time::macros::datetime;

use super::FALLBACK_STRING;
use super::FORMAT_COLOR;
use super::FORMAT_DATETIME_MILLIS;
use super::FORMAT_DATETIME_MINUTES;
use super::FORMAT_DATETIME_SECONDS;
use super::FORMAT_MONTH;
use super::FORMAT_TIME_MILLIS;
use super::FORMAT_TIME_MINUTES;
use super::FORMAT_TIME_SECONDS;
use super::FORMAT_WEEK;
use super::generate_template;
use crate::schema::SchemaNode;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const NOW: OffsetDateTime = datetime!(2024-03-09 16:40:00.123 UTC);

fn template(schema: Value) -> Value {
    generate_template(&SchemaNode::resolve(&schema), NOW)
}

fn string_template(format: &str) -> Value {
    template(json!({"type": "string", "format": format}))
}

// ============================================================================
// SECTION: Precedence Tests
// ============================================================================

#[test]
fn const_takes_precedence_over_default_and_examples() {
    let value = template(json!({
        "const": "pinned",
        "default": "fallback",
        "examples": ["sample"],
        "type": "number"
    }));
    assert_eq!(value, json!("pinned"));
}

#[test]
fn first_one_of_variant_is_used() {
    let value = template(json!({
        "oneOf": [{"type": "integer", "minimum": 7}, {"type": "string"}]
    }));
    assert_eq!(value, json!(7));
}

#[test]
fn default_takes_precedence_over_examples_and_shape() {
    let value = template(json!({
        "type": "string",
        "default": "chosen",
        "examples": ["sample"]
    }));
    assert_eq!(value, json!("chosen"));
}

#[test]
fn first_example_takes_precedence_over_shape() {
    let value = template(json!({"type": "number", "examples": [2.5, 9]}));
    assert_eq!(value, json!(2.5));
}

// ============================================================================
// SECTION: Shape Placeholder Tests
// ============================================================================

#[test]
fn object_template_covers_every_property() {
    let value = template(json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "count": {"type": "integer"},
            "ready": {"type": "boolean"}
        }
    }));
    assert_eq!(value, json!({"name": "example_string", "count": 0, "ready": false}));
}

#[test]
fn array_template_holds_one_item_or_is_empty() {
    assert_eq!(template(json!({"type": "array", "items": {"type": "integer"}})), json!([0]));
    assert_eq!(template(json!({"type": "array"})), json!([]));
}

#[test]
fn enum_template_is_first_choice() {
    assert_eq!(template(json!({"type": "string", "enum": ["red", "green"]})), json!("red"));
}

#[test]
fn numeric_template_uses_minimum_and_keeps_integers_whole() {
    assert_eq!(template(json!({"type": "integer", "minimum": 5})), json!(5));
    assert_eq!(template(json!({"type": "number", "minimum": 1.5})), json!(1.5));
    assert_eq!(template(json!({"type": "number"})), json!(0));
}

#[test]
fn boolean_null_and_unknown_placeholders() {
    assert_eq!(template(json!({"type": "boolean"})), json!(false));
    assert_eq!(template(json!({"type": "null"})), Value::Null);
    assert_eq!(template(json!({"description": "typeless"})), json!({}));
}

// ============================================================================
// SECTION: Format Placeholder Tests
// ============================================================================

#[test]
fn date_and_datetime_placeholders_slice_the_instant() {
    assert_eq!(string_template("date"), json!("2024-03-09"));
    assert_eq!(string_template(FORMAT_DATETIME_MINUTES), json!("2024-03-09T16:40"));
    assert_eq!(string_template(FORMAT_DATETIME_SECONDS), json!("2024-03-09T16:40:00"));
    assert_eq!(string_template(FORMAT_DATETIME_MILLIS), json!("2024-03-09T16:40:00.123"));
}

#[test]
fn month_and_week_placeholders() {
    assert_eq!(string_template(FORMAT_MONTH), json!("2024-03"));
    assert_eq!(string_template(FORMAT_WEEK), json!("2024-W01"));
}

#[test]
fn time_placeholders_slice_the_instant() {
    assert_eq!(string_template(FORMAT_TIME_MINUTES), json!("16:40"));
    assert_eq!(string_template(FORMAT_TIME_SECONDS), json!("16:40:00"));
    assert_eq!(string_template(FORMAT_TIME_MILLIS), json!("16:40:00.123"));
}

#[test]
fn contact_and_color_placeholders() {
    assert_eq!(string_template("tel"), json!("123-456-7890"));
    assert_eq!(string_template("email"), json!("user@example.com"));
    assert_eq!(string_template(FORMAT_COLOR), json!("#ff00ff"));
}

#[test]
fn unrecognized_format_falls_back_to_generic_string() {
    assert_eq!(string_template("uuid"), json!(FALLBACK_STRING));
    assert_eq!(template(json!({"type": "string"})), json!(FALLBACK_STRING));
}

#[test]
fn placeholder_instant_is_rendered_in_utc() {
    let offset = datetime!(2024-03-09 23:40:00.000 -02:00);
    let node = SchemaNode::resolve(&json!({"type": "string", "format": "date"}));
    assert_eq!(generate_template(&node, offset), json!("2024-03-10"));
}
