//! Pattern analysis for PatternScope.
//!
//! This module decides which top-level exports of a TypeScript module are
//! "patterns" for a visual design tool, and collects their documentation
//! metadata and structural type.
//!
//! # Features
//!
//! - Extract `@name`, `@description`, `@icon`, `@patternType` and `@ignore`
//!   tags from JSDoc blocks
//! - Classify variable, class, export-assignment and export-list statements
//! - Resolve declared types through local declarations, imports and re-exports
//! - Walk a project and report every pattern export per module
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use patternscope::analysis::analyze_project;
//! use patternscope::config::AnalyzerConfig;
//!
//! let project = analyze_project(Path::new("./src"), &AnalyzerConfig::default())?;
//! for module in &project.modules {
//!     for record in &module.exports {
//!         println!("{}: {} ({})", module.path.display(), record.label(), record.pattern_type);
//!     }
//! }
//! ```

pub mod doc_tags;
pub mod exports;
pub mod program;
pub mod project;
pub mod scope;
pub mod types;

// Re-export main types for convenience
pub use doc_tags::{extract_tags, DocumentationTags};
pub use exports::{classify, classify_statements, first_typed_declaration, ExportInfo, PatternTypeKind};
pub use program::{ModuleId, ModuleResolver, Program};
pub use project::{
    analyze_project, AnalysisError, AnalysisResult, ModulePatterns, PatternRecord, ProjectPatterns,
};
pub use scope::ModuleScope;
pub use types::{
    Declaration, DeclarationRef, DeclarationResolver, TypeDescriptor, TypeKind, TypeMember,
    TypeResolver,
};
