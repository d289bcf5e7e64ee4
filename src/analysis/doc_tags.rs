//! Documentation tag extraction from JSDoc blocks.
//!
//! Pattern metadata lives in block tags attached to a statement:
//!
//! ```text
//! /**
//!  * @name Primary Button
//!  * @description A button for the main call to action
//!  * @icon button
//!  * @patternType synthetic:box
//!  * @ignore
//!  */
//! ```
//!
//! Tags are collected once per statement into a [`DocumentationTags`]
//! table and read through typed accessors.

use std::collections::HashMap;

use crate::parser::Statement;

const TAG_IGNORE: &str = "ignore";
const TAG_NAME: &str = "name";
const TAG_DESCRIPTION: &str = "description";
const TAG_ICON: &str = "icon";
const TAG_PATTERN_TYPE: &str = "patternType";

/// Documentation tags of a single statement, keyed by tag name.
///
/// A tag without text (such as `@ignore`) maps to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentationTags {
    tags: HashMap<String, Option<String>>,
}

impl DocumentationTags {
    /// Build the tag table from raw `/** ... */` blocks, in source order.
    /// When a tag repeats, the last occurrence wins.
    pub fn from_blocks<I, S>(blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags = HashMap::new();
        for block in blocks {
            for (name, comment) in parse_block(block.as_ref()) {
                tags.insert(name, comment);
            }
        }
        Self { tags }
    }

    /// Returns true if a tag with this name is present.
    pub fn has(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Returns the text of a tag, if the tag is present and has text.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags.get(name).and_then(|c| c.as_deref())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// `@ignore`: the export must be skipped by catalog consumers.
    pub fn is_ignored(&self) -> bool {
        self.has(TAG_IGNORE)
    }

    /// `@name`: human readable display name.
    pub fn name(&self) -> Option<&str> {
        self.get(TAG_NAME)
    }

    /// `@description`
    pub fn description(&self) -> Option<&str> {
        self.get(TAG_DESCRIPTION)
    }

    /// `@icon`
    pub fn icon(&self) -> Option<&str> {
        self.get(TAG_ICON)
    }

    /// `@patternType`
    pub fn pattern_type(&self) -> Option<&str> {
        self.get(TAG_PATTERN_TYPE)
    }
}

/// Extract the documentation tags attached to a statement.
///
/// Returns an empty table when the statement has no documentation block.
pub fn extract_tags(statement: &Statement) -> DocumentationTags {
    DocumentationTags::from_blocks(&statement.doc_comments)
}

/// Split one JSDoc block into `(tag, comment)` pairs.
fn parse_block(block: &str) -> Vec<(String, Option<String>)> {
    let body = block
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");

    let mut tags = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in body.lines() {
        let line = strip_gutter(line);

        if let Some(rest) = line.strip_prefix('@') {
            if let Some(tag) = current.take() {
                tags.push(finish_tag(tag));
            }
            let (name, comment) = match rest.find(char::is_whitespace) {
                Some(idx) => (&rest[..idx], rest[idx..].trim()),
                None => (rest, ""),
            };
            if name.is_empty() {
                continue;
            }
            current = Some((name.to_string(), vec![comment.to_string()]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line.to_string());
        }
    }

    if let Some(tag) = current.take() {
        tags.push(finish_tag(tag));
    }

    tags
}

/// Remove leading whitespace and the `*` gutter of a JSDoc line.
fn strip_gutter(line: &str) -> &str {
    let line = line.trim();
    match line.strip_prefix('*') {
        Some(rest) => rest.trim(),
        None => line,
    }
}

fn finish_tag((name, lines): (String, Vec<String>)) -> (String, Option<String>) {
    let comment = lines.join("\n").trim().to_string();
    if comment.is_empty() {
        (name, None)
    } else {
        (name, Some(comment))
    }
}
