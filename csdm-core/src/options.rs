//! Options for reading and writing dependent variables.

use std::path::{Path, PathBuf};

/// Controls how external component URLs are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Directory of the file being read. Relative URLs resolve against it;
    /// when unset they resolve against the current directory.
    pub base_dir: Option<PathBuf>,
}

impl ReadOptions {
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    pub(crate) fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Controls where `raw` sidecar files are written and how they are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Directory that receives sidecar files.
    pub base_dir: PathBuf,
    /// Sidecar files are named `<base_filename>_<index>.dat`.
    pub base_filename: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            base_filename: "file".to_string(),
        }
    }
}

impl WriteOptions {
    pub fn new(base_dir: impl Into<PathBuf>, base_filename: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            base_filename: base_filename.into(),
        }
    }

    /// Sidecar file name for the dependent variable at `index`.
    pub fn sidecar_name(&self, index: usize) -> String {
        format!("{}_{index}.dat", self.base_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_name() {
        let options = WriteOptions::new("/tmp", "spectrum");
        assert_eq!(options.sidecar_name(2), "spectrum_2.dat");
    }

    #[test]
    fn test_resolve_relative() {
        let options = ReadOptions::with_base_dir("/data/run1");
        assert_eq!(
            options.resolve(Path::new("blob_0.dat")),
            PathBuf::from("/data/run1/blob_0.dat")
        );
        assert_eq!(
            options.resolve(Path::new("/abs/blob.dat")),
            PathBuf::from("/abs/blob.dat")
        );
        assert_eq!(
            ReadOptions::default().resolve(Path::new("x.dat")),
            PathBuf::from("x.dat")
        );
    }
}
