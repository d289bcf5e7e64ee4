//! PatternScope - design pattern catalog for TypeScript projects
//!
//! This crate finds the exports of a TypeScript code base that a visual
//! design tool should offer as reusable patterns, and reports each one
//! with its documentation metadata and structural type.

pub mod analysis;
pub mod config;
pub mod export;
pub mod parser;
