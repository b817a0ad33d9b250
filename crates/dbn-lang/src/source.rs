//! Where `Load` gets its files. The interpreter never touches the filesystem
//! itself; hosts pick an opener:
//! - `DirOpener` resolves paths under a base directory (the CLI)
//! - `MemoryOpener` serves fixed contents (tests, the playground)
//! - `NullOpener` finds nothing (the default)

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};

/// Opens a nested source by the path written in `Load "..."`.
///
/// The error's `Display` text is reported to the user as is, so it should
/// name the path.
pub trait SourceOpener {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read>>;
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("open {path}: file does not exist"))
}

/// Resolves paths relative to a base directory. A leading root is
/// ignored, so `Load "/a.dbn"` still reads `<base>/a.dbn`.
#[derive(Debug, Clone)]
pub struct DirOpener {
    base: PathBuf,
}

impl DirOpener {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl SourceOpener for DirOpener {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read>> {
        let relative: PathBuf = Path::new(path)
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect();
        let full = self.base.join(relative);
        match File::open(&full) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) => Err(io::Error::new(e.kind(), format!("open {}: {e}", full.display()))),
        }
    }
}

/// Serves sources from memory, keyed by exact path.
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl SourceOpener for MemoryOpener {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read>> {
        match self.files.get(path) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(not_found(path)),
        }
    }
}

/// Never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOpener;

impl SourceOpener for NullOpener {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read>> {
        Err(not_found(path))
    }
}
