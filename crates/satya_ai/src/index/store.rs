use std::fs;
use std::path::{Path, PathBuf};

use satya_core::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::model::IndexManifest;
use super::SemanticIndex;

/// On-disk layout of a built index: `manifest.json`, `passages.json`, `vectors.json`.
#[derive(Debug, Clone)]
pub struct IndexStore {
    root: PathBuf,
}

impl IndexStore {
    pub fn open(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join("manifest.json")
    }

    fn passages_path(&self) -> PathBuf {
        self.root.join("passages.json")
    }

    fn vectors_path(&self) -> PathBuf {
        self.root.join("vectors.json")
    }

    pub fn exists(&self) -> bool {
        self.manifest_path().exists()
    }

    fn ensure_dirs(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).map_err(|e| {
            AppError::new("INDEX_WRITE_FAILED", "Failed to create index directory")
                .with_details(format!("path={}; err={}", self.root.display(), e))
        })
    }

    /// Persist an index. Data files are written first and the manifest last, each via
    /// tmp + rename, so a reader never sees a manifest for data that is not there.
    pub fn write(&self, index: &SemanticIndex, built_at: &str) -> Result<IndexManifest, AppError> {
        self.ensure_dirs()?;

        let manifest = IndexManifest {
            model: index.model().to_string(),
            dims: index.dims() as u32,
            passage_count: index.len() as u32,
            passages_sha256: passages_sha256(index.passages()),
            built_at: built_at.to_string(),
        };

        write_json_atomic(&self.passages_path(), &index.passages())?;
        write_json_atomic(&self.vectors_path(), &index.vectors())?;
        write_json_atomic(&self.manifest_path(), &manifest)?;
        Ok(manifest)
    }

    pub fn read_manifest(&self) -> Result<IndexManifest, AppError> {
        read_json(&self.manifest_path())
    }

    /// Load and verify an index: counts, dimensions and passage hash must agree with the manifest.
    pub fn load(&self) -> Result<SemanticIndex, AppError> {
        if !self.exists() {
            return Err(AppError::new(
                "INDEX_NOT_FOUND",
                "No index found; run build-index first",
            )
            .with_details(format!("path={}", self.root.display())));
        }
        let manifest = self.read_manifest()?;
        let passages: Vec<String> = read_json(&self.passages_path())?;
        let vectors: Vec<Vec<f32>> = read_json(&self.vectors_path())?;

        if passages.len() != manifest.passage_count as usize {
            return Err(AppError::new(
                "INDEX_CORRUPT",
                "Passage count does not match manifest",
            )
            .with_details(format!(
                "manifest={}; passages={}",
                manifest.passage_count,
                passages.len()
            )));
        }
        let digest = passages_sha256(&passages);
        if digest != manifest.passages_sha256 {
            return Err(AppError::new(
                "INDEX_CORRUPT",
                "Passage hash does not match manifest",
            )
            .with_details(format!(
                "manifest={}; computed={}",
                manifest.passages_sha256, digest
            )));
        }

        let index = SemanticIndex::new(manifest.model.clone(), passages, vectors).map_err(|e| {
            AppError::new("INDEX_CORRUPT", "Index data is inconsistent")
                .with_details(e.to_string())
        })?;
        if !index.is_empty() && index.dims() != manifest.dims as usize {
            return Err(AppError::new(
                "INDEX_CORRUPT",
                "Vector dims do not match manifest",
            )
            .with_details(format!("manifest={}; vectors={}", manifest.dims, index.dims())));
        }
        Ok(index)
    }
}

pub fn passages_sha256(passages: &[String]) -> String {
    let mut hasher = Sha256::new();
    for p in passages {
        hasher.update(p.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    let tmp = path.with_extension("tmp");
    let json = serde_json::to_vec(value).map_err(|e| {
        AppError::new("INDEX_WRITE_FAILED", "Failed to encode index file")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    fs::write(&tmp, json).map_err(|e| {
        AppError::new("INDEX_WRITE_FAILED", "Failed to write index file")
            .with_details(format!("path={}; err={}", tmp.display(), e))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        AppError::new("INDEX_WRITE_FAILED", "Failed to finalize index file write")
            .with_details(format!("tmp={}; dest={}; err={}", tmp.display(), path.display(), e))
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let bytes = fs::read(path).map_err(|e| {
        AppError::new("INDEX_READ_FAILED", "Failed to read index file")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        AppError::new("INDEX_READ_FAILED", "Failed to decode index file")
            .with_details(format!("path={}; err={}", path.display(), e))
    })
}
