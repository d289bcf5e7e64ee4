//! Project-wide pattern analysis.
//!
//! Walks a source tree, parses every supported module into one
//! [`Program`] and classifies each module's statements. The result is an
//! owned [`ProjectPatterns`] report that outlives the parsed syntax.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

use super::exports::{ExportInfo, PatternTypeKind};
use super::program::Program;
use super::types::TypeDescriptor;
use crate::config::AnalyzerConfig;
use crate::parser::{ModuleParser, ParseError, SourceLanguage};

/// Errors that abort a project analysis.
///
/// Failures on individual files are logged and skipped instead.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Project root is not a directory: {0}")]
    InvalidRoot(PathBuf),
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Owned copy of one classified export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub description: String,
    pub icon: String,
    pub pattern_type: PatternTypeKind,
    pub ignore: bool,
    #[serde(rename = "type")]
    pub export_type: TypeDescriptor,
    /// Shape of the originating statement (`variable`, `class`, ...).
    pub statement_kind: String,
    /// 1-based line of the originating statement.
    pub line: usize,
}

impl PatternRecord {
    /// Name shown to catalog users: `@name`, then the export name, then `default`.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.export_name.as_deref())
            .unwrap_or("default")
    }
}

impl From<&ExportInfo<'_>> for PatternRecord {
    fn from(info: &ExportInfo<'_>) -> Self {
        Self {
            export_name: info.export_name.clone(),
            display_name: info.display_name.clone(),
            description: info.description.clone(),
            icon: info.icon.clone(),
            pattern_type: info.pattern_type.clone(),
            ignore: info.ignore,
            export_type: info.export_type.clone(),
            statement_kind: info.statement.kind_label().to_string(),
            line: info.statement.span.line,
        }
    }
}

/// Pattern exports of one module, in statement order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModulePatterns {
    /// Path relative to the project root.
    pub path: PathBuf,
    pub exports: Vec<PatternRecord>,
}

/// Pattern exports of a whole project.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectPatterns {
    /// Modules with at least one pattern export, sorted by path.
    pub modules: Vec<ModulePatterns>,
    /// Number of modules parsed.
    pub modules_analyzed: usize,
    /// Number of files that could not be parsed.
    pub modules_failed: usize,
}

impl ProjectPatterns {
    /// All records across modules.
    pub fn records(&self) -> impl Iterator<Item = &PatternRecord> {
        self.modules.iter().flat_map(|m| m.exports.iter())
    }

    pub fn pattern_count(&self) -> usize {
        self.records().count()
    }

    /// Number of records tagged `@ignore` (zero unless they were kept).
    pub fn ignored_count(&self) -> usize {
        self.records().filter(|r| r.ignore).count()
    }

    /// Record counts keyed by pattern type.
    pub fn count_by_pattern_type(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in self.records() {
            *counts.entry(record.pattern_type.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Analyze all supported source files below `root`.
pub fn analyze_project(root: &Path, config: &AnalyzerConfig) -> AnalysisResult<ProjectPatterns> {
    if !root.is_dir() {
        return Err(AnalysisError::InvalidRoot(root.to_path_buf()));
    }

    let mut parser = ModuleParser::new()?;
    let mut modules = Vec::new();
    let mut failed = 0;

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_ignored_dir(e, config))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !entry.file_type().is_file() || !is_supported_file(path, config) {
            continue;
        }

        match parser.parse_file(path) {
            Ok(module) => modules.push(module),
            Err(e) => {
                log::warn!("Failed to analyze {}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    let program = Program::new(modules);
    let mut project = ProjectPatterns {
        modules: Vec::new(),
        modules_analyzed: program.modules().len(),
        modules_failed: failed,
    };

    for id in program.module_ids() {
        let path = &program.module(id).path;
        let exports: Vec<PatternRecord> = program
            .classify_module(id)
            .iter()
            .filter(|info| config.include_ignored || !info.ignore)
            .map(PatternRecord::from)
            .collect();

        log::debug!("{}: {} pattern export(s)", path.display(), exports.len());

        if !exports.is_empty() {
            project.modules.push(ModulePatterns {
                path: path.strip_prefix(root).unwrap_or(path).to_path_buf(),
                exports,
            });
        }
    }

    project.modules.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(project)
}

/// Check if a directory should be skipped during traversal.
fn is_ignored_dir(entry: &walkdir::DirEntry, config: &AnalyzerConfig) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }

    config.is_ignored_dir(&entry.file_name().to_string_lossy())
}

fn is_supported_file(path: &Path, config: &AnalyzerConfig) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    SourceLanguage::from_extension(ext).is_some() && config.accepts_extension(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        write(
            root,
            "src/props.ts",
            "export interface ButtonProps { label: string; disabled?: boolean }",
        );
        write(
            root,
            "src/button.tsx",
            r#"
import { ButtonProps } from './props';

/**
 * @name Button
 * @description Primary call to action
 * @icon button
 */
export const Button: React.FC<ButtonProps> = (props) => null;

/** @ignore */
export const InternalButton: React.FC<ButtonProps> = (props) => null;
"#,
        );
        write(
            root,
            "src/page.ts",
            r#"
/** @patternType synthetic:page */
export default class Page {}
"#,
        );
        write(root, "src/util.js", "export function helper() {}");
        write(
            root,
            "node_modules/lib/index.ts",
            "export class Hidden {}",
        );
        write(root, "README.md", "# not code");

        dir
    }

    // ===== Project Walk =====

    #[test]
    fn test_analyze_project() {
        let dir = fixture();
        let project = analyze_project(dir.path(), &AnalyzerConfig::default()).unwrap();

        let paths: Vec<_> = project.modules.iter().map(|m| m.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("src/button.tsx"), PathBuf::from("src/page.ts")]
        );
        assert_eq!(project.modules_analyzed, 4);
        assert_eq!(project.modules_failed, 0);

        let button = &project.modules[0].exports;
        assert_eq!(button.len(), 1);
        assert_eq!(button[0].export_name.as_deref(), Some("Button"));
        assert_eq!(button[0].label(), "Button");
        assert_eq!(button[0].description, "Primary call to action");
        assert_eq!(button[0].statement_kind, "variable");
        assert_eq!(button[0].export_type.name.as_deref(), Some("React.FC"));
        let props = &button[0].export_type.type_arguments[0];
        assert_eq!(props.name.as_deref(), Some("ButtonProps"));
        assert!(props.member("disabled").unwrap().optional);

        let page = &project.modules[1].exports;
        assert_eq!(page[0].export_name, None);
        assert_eq!(page[0].label(), "default");
        assert_eq!(page[0].pattern_type, PatternTypeKind::SyntheticPage);
        assert_eq!(page[0].line, 3);
    }

    #[test]
    fn test_include_ignored() {
        let dir = fixture();
        let config = AnalyzerConfig {
            include_ignored: true,
            ..AnalyzerConfig::default()
        };
        let project = analyze_project(dir.path(), &config).unwrap();

        assert_eq!(project.pattern_count(), 3);
        assert_eq!(project.ignored_count(), 1);
        let ignored = project.records().find(|r| r.ignore).unwrap();
        assert_eq!(ignored.export_name.as_deref(), Some("InternalButton"));
    }

    #[test]
    fn test_ignored_dirs_from_config() {
        let dir = fixture();
        let config = AnalyzerConfig {
            ignored_dirs: vec!["src".to_string()],
            ..AnalyzerConfig::default()
        };
        let project = analyze_project(dir.path(), &config).unwrap();

        let paths: Vec<_> = project.modules.iter().map(|m| m.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("node_modules/lib/index.ts")]);
    }

    #[test]
    fn test_extension_filter() {
        let dir = fixture();
        let config = AnalyzerConfig {
            extensions: vec!["ts".to_string()],
            ..AnalyzerConfig::default()
        };
        let project = analyze_project(dir.path(), &config).unwrap();

        assert_eq!(project.modules_analyzed, 2);
        assert_eq!(project.modules.len(), 1);
        assert_eq!(project.modules[0].path, PathBuf::from("src/page.ts"));
    }

    #[test]
    fn test_count_by_pattern_type() {
        let dir = fixture();
        let project = analyze_project(dir.path(), &AnalyzerConfig::default()).unwrap();
        let counts = project.count_by_pattern_type();

        assert_eq!(counts.get("pattern"), Some(&1));
        assert_eq!(counts.get("synthetic:page"), Some(&1));
    }

    #[test]
    fn test_invalid_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let result = analyze_project(&missing, &AnalyzerConfig::default());
        assert!(matches!(result, Err(AnalysisError::InvalidRoot(_))));
    }

    #[test]
    fn test_empty_project() {
        let dir = TempDir::new().unwrap();
        let project = analyze_project(dir.path(), &AnalyzerConfig::default()).unwrap();
        assert!(project.modules.is_empty());
        assert_eq!(project.pattern_count(), 0);
    }

    // ===== Records =====

    #[test]
    fn test_record_serialization() {
        let dir = fixture();
        let project = analyze_project(dir.path(), &AnalyzerConfig::default()).unwrap();
        let json = serde_json::to_value(&project.modules[1].exports[0]).unwrap();

        assert!(json.get("exportName").is_none());
        assert_eq!(json["patternType"], "synthetic:page");
        assert_eq!(json["statementKind"], "class");
        assert_eq!(json["type"]["kind"], "class");
        assert_eq!(json["ignore"], false);
    }
}
