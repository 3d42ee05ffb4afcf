use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Kind of document a scanned file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Pdf,
}

impl DocumentKind {
    /// Classify by extension; `None` for files we don't ingest
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// Scanner for finding ingestible documents under a data directory
pub struct DocumentScanner {
    root: PathBuf,
}

impl DocumentScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan for `.txt` and `.pdf` files (.gitignore aware), sorted by path.
    ///
    /// A missing root yields an empty list.
    pub fn scan(&self) -> Vec<(PathBuf, DocumentKind)> {
        if !self.root.is_dir() {
            log::warn!("Data directory {} does not exist", self.root.display());
            return Vec::new();
        }

        let mut files = Vec::new();
        let root = self.root.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .require_git(false);
        builder.filter_entry(move |entry| !Self::is_ignored_scope(entry.path(), &root));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                        continue;
                    }

                    let path = entry.path();
                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > MAX_FILE_SIZE_BYTES {
                            log::warn!(
                                "Skipping large file {} ({} bytes > {})",
                                path.display(),
                                meta.len(),
                                MAX_FILE_SIZE_BYTES
                            );
                            continue;
                        }
                    }

                    match DocumentKind::from_path(path) {
                        Some(kind) => files.push((path.to_path_buf(), kind)),
                        None => log::debug!("Skipping unsupported file {}", path.display()),
                    }
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort_by(|a, b| a.0.cmp(&b.0));
        log::info!("Found {} documents under {}", files.len(), self.root.display());
        files
    }

    /// Source name for `path`: relative to the root, `/`-separated
    pub fn source_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn is_ignored_scope(path: &Path, root: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(root) else {
            return false;
        };
        relative.components().any(|component| match component {
            std::path::Component::Normal(name) => {
                let lowered = name.to_string_lossy().to_lowercase();
                IGNORED_SCOPES.iter().any(|ignored| *ignored == lowered)
            }
            _ => false,
        })
    }
}

/// VCS metadata and the default snapshot directory
const IGNORED_SCOPES: &[&str] = &[".git", ".kbase"];

const MAX_FILE_SIZE_BYTES: u64 = 64 * 1_048_576; // 64 MB
