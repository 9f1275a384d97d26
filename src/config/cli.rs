use crate::core::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Filesystem storage rooted at `base_path`. Absolute paths are used as given.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = fs::read(self.resolve(path)).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(full_path, data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read_nested_path() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());

        tokio_test::block_on(async {
            storage
                .write_file("plans/week-1/report.json", b"{}")
                .await
                .unwrap();
            let data = storage.read_file("plans/week-1/report.json").await.unwrap();
            assert_eq!(data, b"{}");
        });
        assert!(dir.path().join("plans/week-1/report.json").exists());
    }

    #[test]
    fn test_absolute_path_ignores_base() {
        let dir = TempDir::new().unwrap();
        let absolute = dir.path().join("scenario.json");
        std::fs::write(&absolute, b"[]").unwrap();

        let storage = LocalStorage::new("./does-not-matter".to_string());
        let data = tokio_test::block_on(storage.read_file(&absolute.to_string_lossy())).unwrap();
        assert_eq!(data, b"[]");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());
        let result = tokio_test::block_on(storage.read_file("nope.json"));
        assert!(matches!(
            result,
            Err(crate::utils::error::SolverError::IoError(_))
        ));
    }
}
