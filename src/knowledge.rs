//! Knowledge base loading.
//!
//! The knowledge base is a flat directory of reference PDFs (legislation,
//! precedents, internal rules). It is read in full on every request: each
//! PDF is extracted and wrapped in banners naming its source file, and the
//! blocks are concatenated in file-name order so identical directories
//! always produce identical prompts.

use crate::pdf::{ExtractionError, TextExtractor};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extension, compared case-insensitively, of files that belong to the knowledge base.
pub const DOCUMENT_EXTENSION: &str = "pdf";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read knowledge directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read knowledge file {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to extract knowledge file {filename}: {source}")]
    Extract {
        filename: String,
        #[source]
        source: ExtractionError,
    },
}

/// Concatenated knowledge corpus plus the file names it was built from.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    pub documents: Vec<String>,
    pub text: String,
}

/// List the knowledge PDFs in `dir`, sorted by file name.
pub fn list_knowledge_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let read_dir_err = |source| LoadError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_err)? {
        let path = entry.map_err(read_dir_err)?.path();
        if path.is_file() && has_document_extension(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read and extract every knowledge PDF in `dir`.
///
/// Any unreadable or unparseable file aborts the whole load.
pub fn load_knowledge_base(
    dir: &Path,
    extractor: &dyn TextExtractor,
) -> Result<KnowledgeBase, LoadError> {
    let files = list_knowledge_files(dir)?;
    let mut knowledge = KnowledgeBase::default();

    for path in files {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let data = std::fs::read(&path).map_err(|source| LoadError::ReadFile {
            path: path.clone(),
            source,
        })?;
        let text = extractor
            .extract_text(&data)
            .map_err(|source| LoadError::Extract {
                filename: filename.clone(),
                source,
            })?;

        debug!("Knowledge: {} ({} bytes -> {} bytes of text)", filename, data.len(), text.len());
        knowledge.text.push_str(&document_block(&filename, &text));
        knowledge.documents.push(filename);
    }

    info!(
        "Loaded knowledge base from {:?}: {} documents, {} bytes",
        dir,
        knowledge.documents.len(),
        knowledge.text.len()
    );
    Ok(knowledge)
}

/// Wrap one document's text in its start/end banners.
pub fn document_block(filename: &str, text: &str) -> String {
    format!(
        "\n\n--- INÍCIO DO DOCUMENTO: {filename} ---\n\n{text}\n\n--- FIM DO DOCUMENTO: {filename} ---\n\n"
    )
}

fn has_document_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
        .unwrap_or(false)
}
