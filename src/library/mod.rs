//! File Library
//!
//! Persists classified file content under one directory per category. Stored names
//! are `<salt>-<label><ext>` where the salt is random lowercase hex; uniqueness is
//! guaranteed by creating the file with `create_new`, so two stores never overwrite
//! each other even when their labels collide.
//!
//! [`FileLibrary::locate`] names a single auxiliary file deterministically from a key,
//! which is how the visited ledger finds its backing file between runs.

mod error;
mod salt;

pub use error::{LibraryError, LibraryResult};
pub use salt::{RandomSalt, SaltSource};

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Separator between salt (or label) and the remainder of a generated name
pub const SEPARATOR: char = '-';
/// Number of hex characters in a salt
pub const SALT_LENGTH: usize = 16;
/// Maximum length of a normalized label
pub const MAX_LABEL_LENGTH: usize = 100;
/// Consecutive collisions after which a warning is logged (and every multiple thereafter)
pub const COLLISION_WARNING_THRESHOLD: u64 = 100;

const UNDERSCORED: &[char] = &[' ', '\n', '-', '/', '\\'];

/// Collision-resistant store for classified files
pub struct FileLibrary {
    root: PathBuf,
    salts: Box<dyn SaltSource>,
}

impl std::fmt::Debug for FileLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLibrary")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl FileLibrary {
    /// Open (creating if necessary) a library rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> LibraryResult<Self> {
        Self::with_salt_source(root, Box::new(RandomSalt::new()))
    }

    /// Open a library with a custom salt generator
    pub fn with_salt_source(
        root: impl Into<PathBuf>,
        salts: Box<dyn SaltSource>,
    ) -> LibraryResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| LibraryError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root, salts })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical root path, falling back to the absolute path if canonicalisation fails
    pub fn canonical_root(&self) -> PathBuf {
        self.root.canonicalize().unwrap_or_else(|_| {
            std::env::current_dir()
                .map(|cwd| cwd.join(&self.root))
                .unwrap_or_else(|_| self.root.clone())
        })
    }

    /// Store `content` under `category`, returning the path of the new file
    ///
    /// Collisions are retried with a fresh salt for as long as it takes; a warning is
    /// logged every [`COLLISION_WARNING_THRESHOLD`] consecutive collisions.
    pub fn store(
        &mut self,
        category: &str,
        label_seed: &str,
        content: &[u8],
        extension: Option<&str>,
    ) -> LibraryResult<PathBuf> {
        let label = normalize_label(label_seed);
        let category_dir = self.root.join(category);
        fs::create_dir_all(&category_dir).map_err(|source| LibraryError::Io {
            path: category_dir.clone(),
            source,
        })?;

        let mut collisions: u64 = 0;
        let (path, mut file) = loop {
            let salt = self.salts.next_salt(SALT_LENGTH);
            let name = with_extension(format!("{}{}{}", salt, SEPARATOR, label), extension);
            let candidate = category_dir.join(name);

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(file) => break (candidate, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    collisions += 1;
                    if collisions % COLLISION_WARNING_THRESHOLD == 0 {
                        log::warn!(
                            "Failed to create a unique file in '{}' {} times, still trying",
                            category_dir.display(),
                            collisions
                        );
                    }
                }
                Err(source) => {
                    return Err(LibraryError::Io {
                        path: candidate,
                        source,
                    })
                }
            }
        };

        file.write_all(content)
            .and_then(|_| file.flush())
            .map_err(|source| LibraryError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }

    /// Deterministic path for an auxiliary file identified by `key`
    ///
    /// The name is the normalized key followed by the CRC-32 of the raw key, so keys
    /// that normalize identically still map to different files.
    pub fn locate(&self, key: &str, extension: &str) -> PathBuf {
        let checksum = crc32fast::hash(key.as_bytes());
        let name = with_extension(
            format!("{}{}{:08x}", normalize_label(key), SEPARATOR, checksum),
            Some(extension),
        );
        self.root.join(name)
    }
}

/// Reduce `label` to `[A-Za-z0-9_]`, capped at [`MAX_LABEL_LENGTH`]
///
/// Spaces, newlines, dashes and path separators each become one underscore; every
/// other character outside the set is dropped.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter_map(|ch| {
            if UNDERSCORED.contains(&ch) {
                Some('_')
            } else if ch.is_ascii_alphanumeric() || ch == '_' {
                Some(ch)
            } else {
                None
            }
        })
        .take(MAX_LABEL_LENGTH)
        .collect()
}

/// Suggest a label for a tree path: the file name up to its first dot
pub fn suggest_label(path: &str) -> String {
    let name = match Path::new(path).file_name() {
        Some(name) => name.to_string_lossy(),
        None => return "unnamed".to_string(),
    };

    match name.find('.') {
        Some(0) => "empty".to_string(),
        Some(dot) => name[..dot].to_string(),
        None => name.into_owned(),
    }
}

fn with_extension(mut name: String, extension: Option<&str>) -> String {
    match extension {
        Some(ext) if ext.starts_with('.') => name.push_str(ext),
        Some(ext) if !ext.is_empty() => {
            name.push('.');
            name.push_str(ext);
        }
        _ => {}
    }
    name
}
