// crates/toolscope-core/src/lib.rs
// ============================================================================
// Module: Tool Scope Core
// Description: Schema-driven form synthesis engine for tool input parameters.
// Purpose: Turn arbitrary JSON schemas into editable field trees and back.
// Dependencies: serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Tool Scope Core implements the schema engine shared by every render
//! context: a normalizer that coerces arbitrary input schemas into a canonical
//! object shape, a template generator that derives a plausible example value,
//! a form synthesizer that builds an in-memory field tree mirroring the
//! schema, and a bidirectional bridge that converts between the field tree and
//! its JSON representation. The field tree is a plain data structure; rendering
//! it to a concrete UI toolkit is a separate, thin projection (see [`render`]).
//!
//! ## Invariants
//! - Schema shapes are resolved once per node and never re-probed.
//! - The engine never reads wall-clock time; callers supply timestamps.
//! - Malformed schema or JSON input degrades locally and never fails a caller.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bridge;
pub mod form;
pub mod render;
pub mod schema;
pub mod template;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bridge::collect;
pub use bridge::populate;
pub use form::Field;
pub use form::FieldControl;
pub use form::FormTree;
pub use form::ValidationError;
pub use form::build_form;
pub use render::render_outline;
pub use schema::ObjectSchema;
pub use schema::SchemaNode;
pub use schema::SchemaShape;
pub use schema::normalize_input_schema;
pub use schema::parse_input_schema;
pub use template::generate_template;
