//! In-memory file store backing Text Pad, Canvas, File Nest and Gallery.
//!
//! Paths are `folder/filename`. The folder set is fixed at construction;
//! nothing survives the session.

use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::error::StoreError;

pub const NOTES_FOLDER: &str = "notes";
pub const ART_FOLDER: &str = "art";
pub const WELCOME_PATH: &str = "notes/welcome.txt";
const WELCOME_NAME: &str = "welcome.txt";

const WELCOME_TEXT: &str = "Welcome to Harshit WebOS! (Psst.. Easter egg when you set your year to 2007 in Tweak!)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub content: String,
    pub modified: SystemTime,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    folders: BTreeMap<String, BTreeMap<String, StoredFile>>,
}

impl Default for FileStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl FileStore {
    /// A store with the given folders and no files.
    pub fn with_folders<I, S>(folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            folders: folders
                .into_iter()
                .map(|name| (name.into(), BTreeMap::new()))
                .collect(),
        }
    }

    /// The stock layout: `notes/` with the welcome file, and an empty `art/`.
    pub fn seeded() -> Self {
        let mut store = Self::with_folders([NOTES_FOLDER, ART_FOLDER]);
        if let Some(notes) = store.folders.get_mut(NOTES_FOLDER) {
            notes.insert(
                WELCOME_NAME.to_string(),
                StoredFile {
                    content: WELCOME_TEXT.to_string(),
                    modified: SystemTime::now(),
                },
            );
        }
        store
    }

    pub fn save(&mut self, path: &str, content: impl Into<String>) -> Result<(), StoreError> {
        let (folder, name) = split_path(path)?;
        let files = self
            .folders
            .get_mut(folder)
            .ok_or_else(|| StoreError::UnknownFolder(folder.to_string()))?;
        files.insert(
            name.to_string(),
            StoredFile {
                content: content.into(),
                modified: SystemTime::now(),
            },
        );
        tracing::debug!(path, "saved file");
        Ok(())
    }

    pub fn load(&self, path: &str) -> Option<&str> {
        self.stat(path).map(|file| file.content.as_str())
    }

    pub fn stat(&self, path: &str) -> Option<&StoredFile> {
        let (folder, name) = split_path(path).ok()?;
        self.folders.get(folder)?.get(name)
    }

    pub fn folders(&self) -> impl Iterator<Item = &str> {
        self.folders.keys().map(String::as_str)
    }

    /// Files in `folder`, sorted by name. Empty for unknown folders.
    pub fn files(&self, folder: &str) -> impl Iterator<Item = (&str, &StoredFile)> {
        self.folders
            .get(folder)
            .into_iter()
            .flat_map(|files| files.iter().map(|(name, file)| (name.as_str(), file)))
    }
}

/// Split `folder/filename`, rejecting empty names and nested paths.
pub fn split_path(path: &str) -> Result<(&str, &str), StoreError> {
    let (folder, name) = path
        .split_once('/')
        .ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
    if name.trim().is_empty() {
        return Err(StoreError::EmptyFilename);
    }
    if name.contains('/') || folder.is_empty() {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok((folder, name))
}

/// Lowercased extension of a file name, if any.
pub fn extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
