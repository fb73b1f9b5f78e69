//! Single test binary entry point.
//!
//! All tests are compiled into one binary to keep linking to a single pass.
//!
//! Structure:
//! - unit: Single-component tests (converter, registry, resolver, persistence)
//! - integration: Multi-component workflows (undo/redo, canvas editing, posters)
