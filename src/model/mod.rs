//! Typed entity records produced by the assembly compiler.
//!
//! This module provides the data types that flow through `patran-forge`:
//!
//! - [`table`] – Sequential identifiers and the insertion-ordered [`Table`] that hands them out.
//! - [`types`] – Small vocabularies: axes, per-axis displacement settings, load kinds.
//! - [`entity`] – One record per emitted entity kind (points, geometries, materials, loads, ...).
//! - [`compiled`] – The complete set of entity tables for one compiler run.
//!
//! Records are built once during extraction and are read-only afterwards; the
//! renderer only ever borrows a [`CompiledModel`].
//!
//! [`Table`]: table::Table
//! [`CompiledModel`]: compiled::CompiledModel

pub mod compiled;
pub mod entity;
pub mod table;
pub mod types;
