//! Markdown export implementation.
//!
//! Exports the pattern catalog in Markdown format for documentation and reporting.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

/// Escape characters that would break a table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        // Title
        writeln!(writer, "# Pattern Catalog")?;
        writeln!(writer)?;
        writeln!(writer, "**Project:** {}", data.project_name)?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Count |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(
            writer,
            "| Modules Analyzed | {} |",
            data.project.modules_analyzed
        )?;
        writeln!(writer, "| Modules With Patterns | {} |", data.module_count())?;
        writeln!(writer, "| Patterns | {} |", data.pattern_count())?;
        writeln!(writer, "| Ignored | {} |", data.ignored_count())?;
        if data.project.modules_failed > 0 {
            writeln!(
                writer,
                "| Failed To Parse | {} |",
                data.project.modules_failed
            )?;
        }
        writeln!(writer)?;

        let by_type = data.count_by_pattern_type();
        if !by_type.is_empty() {
            writeln!(writer, "| Pattern Type | Count |")?;
            writeln!(writer, "|--------------|-------|")?;
            for (pattern_type, count) in &by_type {
                writeln!(writer, "| {} | {} |", pattern_type, count)?;
            }
            writeln!(writer)?;
        }

        // One table per module
        if !data.project.modules.is_empty() {
            writeln!(writer, "## Modules")?;
            writeln!(writer)?;
        }

        for module in &data.project.modules {
            writeln!(
                writer,
                "### `{}` ({})",
                module.path.to_string_lossy().replace('\\', "/"),
                module.exports.len()
            )?;
            writeln!(writer)?;
            writeln!(
                writer,
                "| Name | Export | Type | Pattern Type | Icon | Description |"
            )?;
            writeln!(
                writer,
                "|------|--------|------|--------------|------|-------------|"
            )?;
            for record in &module.exports {
                let label = if record.ignore {
                    format!("{} (ignored)", record.label())
                } else {
                    record.label().to_string()
                };
                writeln!(
                    writer,
                    "| {} | {} | `{}` | {} | {} | {} |",
                    cell(&label),
                    record.export_name.as_deref().unwrap_or("default"),
                    cell(&record.export_type.text),
                    record.pattern_type,
                    cell(&record.icon),
                    cell(&record.description),
                )?;
            }
            writeln!(writer)?;
        }

        // Footer
        writeln!(writer, "---")?;
        writeln!(writer, "*Generated by PatternScope*")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ProjectPatterns;
    use crate::export::test_support::sample_data;

    fn export_markdown(data: &ExportData) -> String {
        let mut output = Vec::new();
        MarkdownExporter.export(data, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_markdown_export_basic() {
        let md_str = export_markdown(&sample_data());

        assert!(md_str.contains("# Pattern Catalog"));
        assert!(md_str.contains("**Project:** design-system"));
        assert!(md_str.contains("| Modules Analyzed | 3 |"));
        assert!(md_str.contains("| Patterns | 3 |"));
        assert!(md_str.contains("| Ignored | 1 |"));
        assert!(md_str.contains("| synthetic:page | 1 |"));
        assert!(!md_str.contains("Failed To Parse"));
    }

    #[test]
    fn test_markdown_export_module_tables() {
        let md_str = export_markdown(&sample_data());

        assert!(md_str.contains("## Modules"));
        assert!(md_str.contains("### `src/button.tsx` (2)"));
        assert!(md_str.contains(
            "| Primary Button | Button | `Props` | pattern | button | Main \\| call to action |"
        ));
        assert!(md_str.contains("| Hidden (ignored) | Hidden |"));
        assert!(md_str.contains("| default | default | `Props` | synthetic:page |  |  |"));
    }

    #[test]
    fn test_markdown_export_empty_project() {
        let data = ExportData::new("empty".to_string(), ProjectPatterns::default());
        let md_str = export_markdown(&data);

        assert!(md_str.contains("| Patterns | 0 |"));
        assert!(!md_str.contains("## Modules"));
        assert!(!md_str.contains("| Pattern Type | Count |"));
    }

    #[test]
    fn test_markdown_export_footer() {
        let md_str = export_markdown(&sample_data());

        assert!(md_str.contains("---"));
        assert!(md_str.contains("*Generated by PatternScope*"));
    }
}
