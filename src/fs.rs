//! File-system hosts: where source text is loaded from and saved to.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Pass-through text storage. Nothing here touches in-memory trees.
pub trait FileSystemHost {
    fn read_file(&self, path: &Path) -> io::Result<String>;
    fn write_file(&self, path: &Path, text: &str) -> io::Result<()>;
    fn file_exists(&self, path: &Path) -> bool;
}

/// The real disk. Writes go through a same-directory tempfile, fsync, then rename.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystemHost for RealFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_file(&self, path: &Path, text: &str) -> io::Result<()> {
        atomic_write(path, text.as_bytes())?;
        // Bump mtime so build tools notice the change
        filetime::set_file_mtime(path, filetime::FileTime::now())?;
        Ok(())
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    // Same directory keeps the rename on one filesystem
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        Some(_) => Path::new("."),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path has no parent directory",
            ))
        }
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Shared in-memory file map. Clones see the same files.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFileSystem {
    files: Rc<RefCell<BTreeMap<PathBuf, String>>>,
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.borrow_mut().insert(path.into(), text.into());
        self
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl FileSystemHost for InMemoryFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        self.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
        })
    }

    fn write_file(&self, path: &Path, text: &str) -> io::Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), text.to_string());
        Ok(())
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "let a = 1;").unwrap();

        let fs = RealFileSystem;
        fs.write_file(&path, "let a = 2;").unwrap();
        assert_eq!(fs.read_file(&path).unwrap(), "let a = 2;");
        assert!(fs.file_exists(&path));
        assert!(!fs.file_exists(&dir.path().join("missing.ts")));
    }

    #[test]
    fn in_memory_clones_share_files() {
        let fs = InMemoryFileSystem::new().with_file("/src/a.ts", "let a = 1;");
        let view = fs.clone();
        fs.write_file(Path::new("/src/b.ts"), "let b = 2;").unwrap();

        assert_eq!(view.get("/src/b.ts").as_deref(), Some("let b = 2;"));
        assert_eq!(view.paths().len(), 2);
        assert_eq!(
            fs.read_file(Path::new("/src/missing.ts")).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }
}
