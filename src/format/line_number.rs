//! Source line lookup for issue paths.

use thiserror::Error;

use crate::types::FileType;

/// File types the resolver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineNumberFileType {
    Yaml,
    Json,
    Hcl,
}

impl TryFrom<FileType> for LineNumberFileType {
    type Error = LineNumberError;

    fn try_from(file_type: FileType) -> Result<Self, Self::Error> {
        match file_type {
            FileType::Yaml | FileType::Yml => Ok(Self::Yaml),
            FileType::Json => Ok(Self::Json),
            FileType::Tf => Ok(Self::Hcl),
            other => Err(LineNumberError::UnsupportedFileType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineNumberError {
    #[error("no line number support for {0} files")]
    UnsupportedFileType(String),

    #[error("path {0} not found in source")]
    PathNotFound(String),
}

/// Maps an issue path back to a 1-based source line.
pub trait LineNumberResolver: Send + Sync {
    fn resolve(
        &self,
        content: &str,
        file_type: LineNumberFileType,
        path: &[String],
    ) -> Result<i64, LineNumberError>;
}

/// Prefix of the marker segment naming a document inside a multi-document file.
pub const DOC_ID_PREFIX: &str = "[DocId:";

/// Parse a `[DocId:N]` marker segment.
pub fn doc_id_marker(segment: &str) -> Option<usize> {
    segment
        .strip_prefix(DOC_ID_PREFIX)?
        .strip_suffix(']')?
        .trim()
        .parse()
        .ok()
}

#[derive(Debug)]
struct SourceLine {
    number: usize,
    indent: usize,
    keys: Vec<String>,
}

impl SourceLine {
    /// Keys written before the value separator: `key:`, `"key":`, `key =`,
    /// and block headers such as `resource "type" "name" {`.
    fn parse(number: usize, raw: &str) -> Self {
        let leading = raw.len() - raw.trim_start().len();
        let mut rest = raw.trim_start();
        let mut indent = leading;
        // list items nest one level below the dash
        while let Some(item) = rest.strip_prefix("- ") {
            let trimmed = item.trim_start();
            indent += rest.len() - trimmed.len();
            rest = trimmed;
        }

        let head_end = rest
            .find([':', '=', '{', '['])
            .unwrap_or(rest.len());
        let keys = if rest.starts_with('#') || rest.starts_with("//") {
            Vec::new()
        } else {
            rest[..head_end]
                .split_whitespace()
                .map(|token| token.trim_matches(['"', '\'', ',']).to_string())
                .filter(|token| !token.is_empty())
                .collect()
        };

        Self {
            number,
            indent,
            keys,
        }
    }

    fn is_structural(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Follows keys by indentation.
///
/// Each path segment is searched for below the line of the previous one,
/// stopping at the first line that is not indented deeper than it. When a
/// segment cannot be found the deepest line found so far is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndentationResolver;

impl IndentationResolver {
    pub fn new() -> Self {
        Self
    }
}

/// Lines of the `index`th document of a `---` separated stream.
///
/// A separator only starts a new document once the current one has content,
/// so a leading `---` belongs to the first document.
fn document_lines(lines: Vec<SourceLine>, raw: &[&str], index: usize) -> Vec<SourceLine> {
    let mut current = 0;
    let mut started = false;
    lines
        .into_iter()
        .zip(raw)
        .filter_map(|(line, raw)| {
            if raw.trim_end() == "---" || raw.starts_with("--- ") {
                if started {
                    current += 1;
                }
                started = true;
                return None;
            }
            let trimmed = raw.trim_start();
            if !trimmed.is_empty() && !trimmed.starts_with('#') && !trimmed.starts_with('%') {
                started = true;
            }
            (current == index).then_some(line)
        })
        .collect()
}

/// Key of a path segment and the bracketed part after it, if any.
///
/// `annotations[a.b/c]` names the key `a.b/c` below `annotations`, while
/// `containers[web]` selects a list item that has no key of its own; the
/// bracketed part is therefore only followed when it can be found.
fn path_key(segment: &str) -> Option<(&str, Option<&str>)> {
    if segment.parse::<usize>().is_ok() {
        return None;
    }
    let (key, bracket) = match segment.split_once('[') {
        Some((key, rest)) => (key, rest.strip_suffix(']')),
        None => (segment, None),
    };
    let bracket = bracket.filter(|b| !b.is_empty() && b.parse::<usize>().is_err());
    (!key.is_empty()).then_some((key, bracket))
}

/// Position of `key` below `cursor`: the next key on the same line, or the
/// first line indented deeper than the cursor line that starts with it.
fn find_key(
    lines: &[SourceLine],
    cursor: Option<(usize, usize)>,
    key: &str,
) -> Option<(usize, usize)> {
    if let Some((idx, pos)) = cursor
        && lines[idx].keys.get(pos + 1).map(String::as_str) == Some(key)
    {
        return Some((idx, pos + 1));
    }

    let (start, parent_indent) = match cursor {
        Some((idx, _)) => (idx + 1, Some(lines[idx].indent)),
        None => (0, None),
    };
    lines[start..]
        .iter()
        .enumerate()
        .take_while(|(_, line)| parent_indent.is_none_or(|p| line.is_structural() || line.indent > p))
        .find(|(_, line)| line.keys.first().map(String::as_str) == Some(key))
        .map(|(offset, _)| (start + offset, 0))
}

impl LineNumberResolver for IndentationResolver {
    fn resolve(
        &self,
        content: &str,
        _file_type: LineNumberFileType,
        path: &[String],
    ) -> Result<i64, LineNumberError> {
        let raw: Vec<&str> = content.lines().collect();
        let mut lines: Vec<SourceLine> = raw
            .iter()
            .enumerate()
            .map(|(i, line)| SourceLine::parse(i + 1, line))
            .collect();

        let mut segments = path.iter().map(String::as_str).peekable();
        if let Some(doc_id) = segments.peek().and_then(|s| doc_id_marker(s)) {
            segments.next();
            lines = document_lines(lines, &raw, doc_id);
        }

        // (line index, key position within that line)
        let mut cursor: Option<(usize, usize)> = None;
        for (key, bracket) in segments.filter_map(path_key) {
            match find_key(&lines, cursor, key) {
                Some(found) => cursor = Some(found),
                None => break,
            }
            if let Some(found) = bracket.and_then(|b| find_key(&lines, cursor, b)) {
                cursor = Some(found);
            }
        }

        cursor
            .map(|(idx, _)| lines[idx].number as i64)
            .ok_or_else(|| LineNumberError::PathNotFound(path.join(".")))
    }
}
