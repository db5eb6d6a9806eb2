//! Discovery of the files a workflow left in its `outputs` directory.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Failed to walk outputs directory: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Failed to stat {path}: {source}")]
    StatError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rename {from} to {to}: {source}")]
    RenameError {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File name is not valid UTF-8: {0}")]
    NonUtf8Name(PathBuf),
}

/// A file found on disk, not uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
    pub index: usize,
    pub name: String,
    /// Object key: the path relative to the walked root, `/`-separated
    pub key: String,
    pub path: PathBuf,
    pub content_type: Option<String>,
    pub content_length: u64,
}

/// Lazily walks a directory tree and describes every regular file in it.
///
/// Files are yielded in traversal order, which is not sorted. Indices are
/// assigned as files are yielded so they are always `0..n`. Symlinks count
/// when they point to a regular file; symlinked directories are not entered.
pub struct FileCollector {
    root: PathBuf,
    entries: walkdir::IntoIter,
    next_index: usize,
}

impl FileCollector {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let entries = WalkDir::new(&root).follow_links(false).into_iter();
        Self { root, entries, next_index: 0 }
    }

    fn describe(&mut self, entry: DirEntry) -> Result<CollectedFile, CollectorError> {
        let path = entry.into_path();
        let key = object_key(&self.root, &path)?;
        let name = key.rsplit('/').next().unwrap_or(&key).to_string();
        let metadata = fs::metadata(&path).map_err(|source| CollectorError::StatError { path: path.clone(), source })?;
        let content_type = mime_guess::from_path(&path).first_raw().map(str::to_string);

        let file =
            CollectedFile { index: self.next_index, name, key, path, content_type, content_length: metadata.len() };
        self.next_index += 1;
        debug!(index = file.index, path = %file.path.display(), "Collected file");
        Ok(file)
    }
}

/// Relative path of `path` under `root` with `/` separators. Fails on names that are not UTF-8.
fn object_key(root: &Path, path: &Path) -> Result<String, CollectorError> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()
        .map(|parts| parts.join("/"))
        .ok_or_else(|| CollectorError::NonUtf8Name(path.to_path_buf()))
}

fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

impl Iterator for FileCollector {
    type Item = Result<CollectedFile, CollectorError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };
            if is_regular_file(&entry) {
                return Some(self.describe(entry));
            }
        }
    }
}

/// Collect every file under `root`, failing on the first filesystem error.
pub fn collect_files(root: impl AsRef<Path>) -> Result<Vec<CollectedFile>, CollectorError> {
    FileCollector::new(root).collect()
}

/// Rename every file on disk to `<uuid>-<name>` so that concurrent runs never upload under the same key.
///
/// Runs on an already collected list, so renamed files are never walked twice.
/// Renaming is not undone if a later file fails.
pub fn rename_with_unique_prefix(files: Vec<CollectedFile>) -> Result<Vec<CollectedFile>, CollectorError> {
    files
        .into_iter()
        .map(|file| {
            let name = format!("{}-{}", Uuid::new_v4(), file.name);
            let key = match file.key.rsplit_once('/') {
                Some((dir, _)) => format!("{dir}/{name}"),
                None => name.clone(),
            };
            let path = file.path.with_file_name(&name);
            fs::rename(&file.path, &path).map_err(|source| CollectorError::RenameError {
                from: file.path.clone(),
                to: path.clone(),
                source,
            })?;
            debug!(from = %file.path.display(), to = %path.display(), "Renamed file");
            Ok(CollectedFile { name, key, path, ..file })
        })
        .collect()
}
