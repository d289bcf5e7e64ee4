//! JSON export implementation.
//!
//! Exports the pattern catalog in JSON format for machine-readable output.

use super::{ExportData, Exporter};
use crate::analysis::PatternRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    modules_analyzed: usize,
    modules_failed: usize,
    modules_with_patterns: usize,
    patterns: usize,
    ignored: usize,
    by_pattern_type: BTreeMap<String, usize>,
}

/// One module's patterns for JSON output.
#[derive(Serialize)]
struct JsonModule<'a> {
    path: String,
    exports: &'a [PatternRecord],
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport<'a> {
    project: &'a str,
    summary: JsonSummary,
    modules: Vec<JsonModule<'a>>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let modules: Vec<JsonModule> = data
            .project
            .modules
            .iter()
            .map(|m| JsonModule {
                // forward slashes keep reports stable across platforms
                path: m.path.to_string_lossy().replace('\\', "/"),
                exports: &m.exports,
            })
            .collect();

        let export = JsonExport {
            project: &data.project_name,
            summary: JsonSummary {
                modules_analyzed: data.project.modules_analyzed,
                modules_failed: data.project.modules_failed,
                modules_with_patterns: data.module_count(),
                patterns: data.pattern_count(),
                ignored: data.ignored_count(),
                by_pattern_type: data.count_by_pattern_type(),
            },
            modules,
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}
