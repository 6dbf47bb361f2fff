use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Per-source character cap when rendering prompt context.
pub const DEFAULT_MAX_CHARS_PER_SOURCE: usize = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Text,
    Markdown,
    Pdf,
    Web,
    Other,
}

impl SourceKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "txt" | "text" => SourceKind::Text,
            "md" | "markdown" => SourceKind::Markdown,
            "pdf" => SourceKind::Pdf,
            "html" | "htm" => SourceKind::Web,
            _ => SourceKind::Other,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceKind::Text => "text",
            SourceKind::Markdown => "markdown",
            SourceKind::Pdf => "pdf",
            SourceKind::Web => "web page",
            SourceKind::Other => "document",
        };
        f.write_str(label)
    }
}

/// A document the user added to the notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub kind: SourceKind,
    pub content: String,
}

impl Source {
    pub fn new(title: impl Into<String>, kind: SourceKind, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind,
            content: content.into(),
        }
    }

    /// Load a UTF-8 file, classifying it by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let kind = path
            .extension()
            .and_then(|e| e.to_str())
            .map(SourceKind::from_extension)
            .unwrap_or(SourceKind::Other);
        crate::app_log!(
            "[sources] loaded {} kind={} chars={}",
            title,
            kind,
            content.chars().count()
        );
        Ok(Self::new(title, kind, content))
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Render sources as numbered blocks for a grounded system prompt.
///
/// Blank sources are skipped; numbering counts only rendered ones.
pub fn build_source_context(sources: &[Source], max_chars_per_source: usize) -> String {
    let mut context = String::new();
    for (index, source) in sources.iter().filter(|s| !s.is_blank()).enumerate() {
        context.push_str(&format!(
            "[Source {}: {} ({})]\n",
            index + 1,
            source.title,
            source.kind
        ));
        let body = source.content.trim();
        match body.char_indices().nth(max_chars_per_source) {
            Some((cut, _)) => {
                context.push_str(&body[..cut]);
                context.push_str("…[truncated]");
            }
            None => context.push_str(body),
        }
        context.push_str("\n\n");
    }
    context
}

pub(crate) fn require_sources(sources: &[Source]) -> Result<(), AppError> {
    if sources.iter().all(Source::is_blank) {
        return Err(AppError::InvalidArgument(
            "At least one non-empty source is required".into(),
        ));
    }
    Ok(())
}
