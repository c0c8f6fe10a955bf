use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::PathBuf;

/// Stores files under a base directory on the local disk.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("reports"));

        storage
            .write_file("2026/report.csv", b"Artist\nKusama\n")
            .await
            .unwrap();

        let written = std::fs::read(temp_dir.path().join("reports/2026/report.csv")).unwrap();
        assert_eq!(written, b"Artist\nKusama\n");
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        storage.write_file("report.json", b"old").await.unwrap();
        storage.write_file("report.json", b"new").await.unwrap();

        assert_eq!(std::fs::read(temp_dir.path().join("report.json")).unwrap(), b"new");
    }
}
