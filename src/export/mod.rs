//! Report output for pattern analysis results.
//!
//! This module provides exporters for writing a project's pattern catalog
//! in JSON (machine-readable) or Markdown (human-readable) form.

pub mod json;
pub mod markdown;

use crate::analysis::ProjectPatterns;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// JSON format - machine-readable, full data
    #[default]
    Json,
    /// Markdown format - documentation/reporting
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Data container for export operations.
#[derive(Debug, Clone)]
pub struct ExportData {
    /// Project name, usually the analyzed directory's name
    pub project_name: String,
    pub project: ProjectPatterns,
}

impl ExportData {
    pub fn new(project_name: String, project: ProjectPatterns) -> Self {
        Self {
            project_name,
            project,
        }
    }

    pub fn module_count(&self) -> usize {
        self.project.modules.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.project.pattern_count()
    }

    pub fn ignored_count(&self) -> usize {
        self.project.ignored_count()
    }

    pub fn count_by_pattern_type(&self) -> BTreeMap<String, usize> {
        self.project.count_by_pattern_type()
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    data: &ExportData,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Json => json::JsonExporter.export(data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(data, writer),
    }
}

/// Export data to a string.
pub fn export_to_string(format: ExportFormat, data: &ExportData) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
