// crates/toolscope-core/src/render.rs
// ============================================================================
// Module: Outline Renderer
// Description: Renders a field tree as an indented textual outline.
// Purpose: Give tests and the CLI a UI-free projection of synthesized forms.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A deliberately thin projection: the field tree owns all state, and this
//! module only walks it and prints labels, control kinds, and current values.
//! Any richer surface renders the same tree its own way.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use crate::form::ArrayItemKind;
use crate::form::ArrayRow;
use crate::form::Field;
use crate::form::FieldControl;
use crate::form::FormTree;
use crate::form::choice_text;

/// Hint shown for tools whose schema declares no properties.
pub const NO_PARAMETERS_HINT: &str = "This tool has no input parameters.";

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the tree as an indented outline, one line per field or row.
#[must_use]
pub fn render_outline(tree: &FormTree) -> String {
    if tree.is_empty() {
        return format!("{NO_PARAMETERS_HINT}\n");
    }
    let mut out = String::new();
    render_fields(&tree.fields, 0, &mut out);
    out
}

/// Renders a field list at the given indent depth.
fn render_fields(fields: &[Field], depth: usize, out: &mut String) {
    for field in fields {
        let star = if field.required { " *" } else { "" };
        indent(depth, out);
        let _ = writeln!(out, "{}{star}: {}", field.name, control_line(&field.control));
        if let Some(description) = &field.description {
            indent(depth + 1, out);
            let _ = writeln!(out, "({description})");
        }
        render_children(&field.control, depth + 1, out);
    }
}

/// One-line summary of a control's kind and current value.
fn control_line(control: &FieldControl) -> String {
    match control {
        FieldControl::Const { literal } => format!("const {}", choice_text(literal)),
        FieldControl::Null => "null".to_string(),
        FieldControl::OneOf(one_of) => {
            let option = one_of.options.get(one_of.selected).map_or("?", String::as_str);
            format!("one of [{}] -> {option}", one_of.options.join(" | "))
        }
        FieldControl::Enum(choices) => {
            let chosen = choices
                .selected
                .and_then(|index| choices.choices.get(index))
                .map_or_else(|| "(unselected)".to_string(), choice_text);
            format!("choice {chosen}")
        }
        FieldControl::Boolean(boolean) => format!("[{}]", if boolean.checked { "x" } else { " " }),
        FieldControl::Number(number) => {
            if number.text.is_empty() {
                format!("number <{}>", number.placeholder)
            } else {
                format!("number {}", number.text)
            }
        }
        FieldControl::Array(array) => format!("list ({} rows)", array.rows.len()),
        FieldControl::ArrayObject(array) => format!("list ({} rows)", array.rows.len()),
        FieldControl::ObjectGroup(_) => "group".to_string(),
        FieldControl::JsonText(text) => {
            if text.text.is_empty() {
                format!("json <{}>", text.placeholder)
            } else {
                format!("json {}", text.text.replace('\n', " "))
            }
        }
        FieldControl::Text(text) => {
            if text.value.is_empty() {
                format!("text <{}>", text.placeholder)
            } else {
                format!("text {}", text.value)
            }
        }
    }
}

/// Renders the nested lines a control contributes under its own line.
fn render_children(control: &FieldControl, depth: usize, out: &mut String) {
    match control {
        FieldControl::OneOf(one_of) => render_children(&one_of.current, depth, out),
        FieldControl::ObjectGroup(group) => render_fields(&group.fields, depth, out),
        FieldControl::ArrayObject(array) => {
            for (index, row) in array.rows.iter().enumerate() {
                indent(depth, out);
                let _ = writeln!(out, "- row {}", index + 1);
                render_fields(&row.fields, depth + 1, out);
            }
        }
        FieldControl::Array(array) => {
            for row in &array.rows {
                indent(depth, out);
                let _ = writeln!(out, "- {}", row_line(&array.item, row));
            }
        }
        _ => {}
    }
}

/// One-line summary of a primitive row.
fn row_line(kind: &ArrayItemKind, row: &ArrayRow) -> String {
    match (kind, row) {
        (ArrayItemKind::Enum(choices), ArrayRow::Enum(selected)) => selected
            .and_then(|index| choices.get(index))
            .map_or_else(|| "(unselected)".to_string(), choice_text),
        (_, ArrayRow::Boolean(checked)) => {
            format!("[{}]", if *checked { "x" } else { " " })
        }
        (_, ArrayRow::Number(text)) | (_, ArrayRow::Text(text)) => {
            if text.is_empty() {
                "(blank)".to_string()
            } else {
                text.clone()
            }
        }
        (_, ArrayRow::Enum(_)) => "(unselected)".to_string(),
    }
}

/// Appends two spaces per depth level.
fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}
