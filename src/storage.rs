// ABOUTME: Filesystem vault for mirror files with atomic writes
// ABOUTME: Soft delete into a trash folder, folder listing and cleanup

use crate::{Error, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FolderEntry {
    pub name: String,
    pub is_dir: bool,
}

/// The mirror root. All operations take vault-relative, slash-separated
/// paths; nothing here ever reaches outside `root`.
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    pub fn new(root_override: Option<PathBuf>) -> Result<Self> {
        let root = if let Some(dir) = root_override {
            dir
        } else {
            ProjectDirs::from("", "", "octomirror")
                .ok_or_else(|| {
                    Error::Filesystem(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "Could not determine vault directory",
                    ))
                })?
                .data_dir()
                .to_path_buf()
        };

        fs::create_dir_all(&root)?;
        Ok(Vault { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn abs(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.abs(rel).is_file()
    }

    pub fn folder_exists(&self, rel: &str) -> bool {
        self.abs(rel).is_dir()
    }

    pub fn read(&self, rel: &str) -> Result<String> {
        Ok(fs::read_to_string(self.abs(rel))?)
    }

    /// Writes through a temp file in the target directory, then renames.
    /// Readers never observe a half-written mirror.
    pub fn write(&self, rel: &str, content: &str) -> Result<()> {
        use rand::Rng;

        let path = self.abs(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let random: u32 = rand::thread_rng().gen();
        let tmp_path = path.with_extension(format!("{:x}.part", random));

        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &path)?;

        Ok(())
    }

    /// Soft delete: moves the file into `.trash/` under the root, suffixing
    /// the name when a previous trashing already used it.
    pub fn trash(&self, rel: &str) -> Result<()> {
        let path = self.abs(rel);
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::Filesystem(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("Invalid vault path: {}", rel),
                ))
            })?
            .to_string();

        let trash_dir = self.root.join(".trash");
        fs::create_dir_all(&trash_dir)?;

        let mut dest = trash_dir.join(&name);
        let mut attempt = 1u32;
        while dest.exists() {
            let as_path = Path::new(&name);
            let stem = as_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("file");
            let candidate = match as_path.extension().and_then(|e| e.to_str()) {
                Some(ext) => format!("{} ({}).{}", stem, attempt, ext),
                None => format!("{} ({})", stem, attempt),
            };
            dest = trash_dir.join(candidate);
            attempt += 1;
        }

        fs::rename(&path, &dest)?;
        Ok(())
    }

    /// Creates the folder if missing; true means it had to be created.
    pub fn ensure_folder(&self, rel: &str) -> Result<bool> {
        let path = self.abs(rel);
        if path.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(&path)?;
        Ok(true)
    }

    /// Names of the `.md` files directly inside a folder, sorted.
    pub fn list_markdown_files(&self, rel: &str) -> Result<Vec<String>> {
        let path = self.abs(rel);
        if !path.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let entry_path = entry.path();
            if !entry_path.is_file() {
                continue;
            }
            if entry_path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            if let Some(name) = entry_path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn list_children(&self, rel: &str) -> Result<Vec<FolderEntry>> {
        let path = self.abs(rel);
        if !path.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                entries.push(FolderEntry {
                    name: name.to_string(),
                    is_dir: entry.path().is_dir(),
                });
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Removes the folder only when it is empty; true means it was removed.
    pub fn remove_empty_folder(&self, rel: &str) -> Result<bool> {
        let path = self.abs(rel);
        if !path.is_dir() {
            return Ok(false);
        }
        if fs::read_dir(&path)?.next().is_some() {
            return Ok(false);
        }
        fs::remove_dir(&path)?;
        Ok(true)
    }
}
