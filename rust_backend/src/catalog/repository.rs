//! Catalog repository seam.
//!
//! Plan generation takes an already-loaded [`ExerciseCatalog`]; repositories
//! are how callers obtain one. The trait is async so that backends doing real
//! I/O can be awaited without blocking the caller's runtime.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use super::ExerciseCatalog;
use crate::error::{CatalogError, CatalogResult};

/// Source of the exercise catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Load the full catalog.
    async fn load_catalog(&self) -> CatalogResult<Arc<ExerciseCatalog>>;
}

/// In-memory repository for tests and embedded catalogs.
#[derive(Debug, Clone)]
pub struct LocalCatalogRepository {
    catalog: Arc<ExerciseCatalog>,
}

impl LocalCatalogRepository {
    pub fn new(catalog: ExerciseCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

#[async_trait]
impl CatalogRepository for LocalCatalogRepository {
    async fn load_catalog(&self) -> CatalogResult<Arc<ExerciseCatalog>> {
        Ok(Arc::clone(&self.catalog))
    }
}

/// Repository reading a JSON catalog file on every load.
#[derive(Debug, Clone)]
pub struct FileCatalogRepository {
    path: PathBuf,
}

impl FileCatalogRepository {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogRepository for FileCatalogRepository {
    async fn load_catalog(&self) -> CatalogResult<Arc<ExerciseCatalog>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Err(CatalogError::NotFound(self.path.display().to_string()));
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let catalog = ExerciseCatalog::from_json_str(&content, &self.path.display().to_string())?;
        log::debug!(
            "Loaded {} exercises from {}",
            catalog.len(),
            self.path.display()
        );
        Ok(Arc::new(catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{sample_catalog, SAMPLE_CATALOG_JSON};
    use std::io::Write;

    #[tokio::test]
    async fn test_local_repository_shares_catalog() {
        let repo = LocalCatalogRepository::new(sample_catalog());
        let first = repo.load_catalog().await.unwrap();
        let second = repo.load_catalog().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_file_repository_loads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_CATALOG_JSON.as_bytes()).unwrap();

        let repo = FileCatalogRepository::new(file.path());
        let catalog = repo.load_catalog().await.unwrap();
        assert_eq!(catalog.len(), sample_catalog().len());
    }

    #[tokio::test]
    async fn test_file_repository_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCatalogRepository::new(dir.path().join("absent.json"));
        let err = repo.load_catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }
}
