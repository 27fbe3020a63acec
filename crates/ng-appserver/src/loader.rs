use std::fmt;
use std::io;

use camino::Utf8PathBuf;
use ng_source::FxDashMap;

use crate::error::EngineError;

/// Namespace that templates and declaration files are loaded from.
pub const TEMPLATE_NAMESPACE: &str = "templates";

/// Finds template resources by namespace and relative path.
pub trait ResourceLoader: Send + Sync + fmt::Debug {
    /// `Ok(None)` when there is no such resource.
    fn load(&self, namespace: &str, path: &str) -> Result<Option<String>, EngineError>;

    fn exists(&self, namespace: &str, path: &str) -> bool {
        matches!(self.load(namespace, path), Ok(Some(_)))
    }
}

/// Resources held in memory, keyed by path. Ignores the namespace.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    resources: FxDashMap<String, String>,
}

impl MemoryLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, contents: &str) {
        self.resources.insert(path.to_string(), contents.to_string());
    }
}

impl ResourceLoader for MemoryLoader {
    fn load(&self, _namespace: &str, path: &str) -> Result<Option<String>, EngineError> {
        Ok(self.resources.get(path).map(|contents| contents.clone()))
    }
}

/// Resources read from a list of directories, first match wins.
#[derive(Debug, Default)]
pub struct DirectoryLoader {
    roots: Vec<Utf8PathBuf>,
}

impl DirectoryLoader {
    #[must_use]
    pub fn new(roots: Vec<Utf8PathBuf>) -> Self {
        Self { roots }
    }

    #[must_use]
    pub fn roots(&self) -> &[Utf8PathBuf] {
        &self.roots
    }
}

impl ResourceLoader for DirectoryLoader {
    fn load(&self, _namespace: &str, path: &str) -> Result<Option<String>, EngineError> {
        for root in &self.roots {
            let candidate = root.join(path);
            match std::fs::read_to_string(&candidate) {
                Ok(contents) => {
                    tracing::trace!(%candidate, "loaded resource");
                    return Ok(Some(contents));
                }
                Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                Err(error) => {
                    return Err(EngineError::Io {
                        path: candidate.to_string(),
                        message: error.to_string(),
                    })
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_memory_loader() {
        let loader = MemoryLoader::new();
        loader.insert("Main.html", "<p>hi</p>");
        assert_eq!(
            loader.load(TEMPLATE_NAMESPACE, "Main.html").unwrap().as_deref(),
            Some("<p>hi</p>")
        );
        assert!(loader.exists(TEMPLATE_NAMESPACE, "Main.html"));
        assert!(!loader.exists(TEMPLATE_NAMESPACE, "Main.wod"));
    }

    #[test]
    fn test_directory_loader_searches_in_order() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(second.path().join("Main.html"), "second").unwrap();
        fs::write(second.path().join("Other.html"), "other").unwrap();
        fs::write(first.path().join("Main.html"), "first").unwrap();

        let loader = DirectoryLoader::new(vec![
            Utf8PathBuf::from_path_buf(first.path().to_path_buf()).unwrap(),
            Utf8PathBuf::from_path_buf(second.path().to_path_buf()).unwrap(),
        ]);
        assert_eq!(
            loader.load(TEMPLATE_NAMESPACE, "Main.html").unwrap().as_deref(),
            Some("first")
        );
        assert_eq!(
            loader.load(TEMPLATE_NAMESPACE, "Other.html").unwrap().as_deref(),
            Some("other")
        );
        assert_eq!(loader.load(TEMPLATE_NAMESPACE, "Missing.html").unwrap(), None);
    }

    #[test]
    fn test_directory_loader_reports_unreadable_files() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("Main.html")).unwrap();
        let loader = DirectoryLoader::new(vec![
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap(),
        ]);
        assert!(matches!(
            loader.load(TEMPLATE_NAMESPACE, "Main.html"),
            Err(EngineError::Io { .. })
        ));
    }
}
