//! Loading streams files and looking up individual stream attributes.

use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tokio::fs;

use crate::document::{find_stream, parse_document};
use crate::error::Result;

/// Text of a streams file held in memory
#[derive(Debug, Clone)]
pub struct StreamsFile {
    path: PathBuf,
    text: String,
}

impl StreamsFile {
    /// Read `path` into memory.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path).await?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "read streams file");
        Ok(Self { path, text })
    }

    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parse tree borrowing this file's text
    pub fn document(&self) -> Result<Document<'_>> {
        parse_document(&self.text, &self.path)
    }
}

/// Value of `attribute` on the stream named exactly `stream_name`.
///
/// Both `stream` and `immutable_stream` elements are searched; names are
/// compared without trimming.
pub fn query_streams_file<'a>(root: Node<'a, '_>, stream_name: &str, attribute: &str) -> Option<&'a str> {
    find_stream(root, stream_name)?.attribute(attribute)
}
