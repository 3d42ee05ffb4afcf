use crate::error::{IndexerError, Result};
use crate::scanner::{DocumentKind, DocumentScanner};
use kbase_chunker::Document;
use std::path::Path;
use tokio::process::Command;

const PDFTOTEXT_BIN: &str = "pdftotext";

/// Form feed emitted by `pdftotext` between pages
const PAGE_BREAK: char = '\u{000C}';

/// Documents loaded from a data directory plus the files that were skipped
#[derive(Debug, Default)]
pub struct LoadedDocuments {
    pub documents: Vec<Document>,
    pub skipped: Vec<String>,
}

/// Load every `.txt` and `.pdf` document under `root`.
///
/// Text files are read as UTF-8 (lossy). PDFs become one document per
/// non-empty page. Files that fail to load are logged and skipped.
pub async fn load_documents(root: impl AsRef<Path>) -> LoadedDocuments {
    let scanner = DocumentScanner::new(root);
    let mut loaded = LoadedDocuments::default();

    for (path, kind) in scanner.scan() {
        let source = scanner.source_name(&path);
        let result = match kind {
            DocumentKind::Text => load_text(&path, &source).await.map(|doc| vec![doc]),
            DocumentKind::Pdf => load_pdf(&path, &source).await,
        };

        match result {
            Ok(docs) => {
                log::debug!("Loaded {source}: {} document(s)", docs.len());
                loaded.documents.extend(docs);
            }
            Err(e) => {
                log::warn!("Skipping {source}: {e}");
                loaded.skipped.push(source);
            }
        }
    }

    log::info!(
        "Loaded {} documents ({} files skipped)",
        loaded.documents.len(),
        loaded.skipped.len()
    );
    loaded
}

async fn load_text(path: &Path, source: &str) -> Result<Document> {
    let bytes = tokio::fs::read(path).await?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok(Document::new(source, text, source))
}

async fn load_pdf(path: &Path, source: &str) -> Result<Vec<Document>> {
    let output = Command::new(PDFTOTEXT_BIN)
        .arg("-enc")
        .arg("UTF-8")
        .arg(path)
        .arg("-")
        .output()
        .await
        .map_err(|e| IndexerError::Pdf(format!("failed to run {PDFTOTEXT_BIN}: {e}")))?;

    if !output.status.success() {
        return Err(IndexerError::Pdf(format!(
            "{PDFTOTEXT_BIN} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(split_pages(&String::from_utf8_lossy(&output.stdout), source))
}

/// One document per non-blank page; page numbers are 1-based
fn split_pages(text: &str, source: &str) -> Vec<Document> {
    text.split(PAGE_BREAK)
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .map(|(idx, page)| Document::new(format!("{source}#p{}", idx + 1), page, source))
        .collect()
}
