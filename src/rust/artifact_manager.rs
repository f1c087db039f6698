use std::path::{Path, PathBuf};
use std::fs;
use std::io;
use std::sync::Arc;
use std::env;
use tokio::sync::Mutex;
use sha2::{Sha256, Digest};

use crate::engine::{ArtifactDir, EncoderTables, COLUMNS_FILE, ENCODERS_FILE, MODEL_FILE};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact bundle not downloaded: {0}")]
    NotDownloaded(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Artifact verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}

/// Where to fetch an artifact bundle from, and how to check it.
///
/// The three bundle files are fetched from `{base_url}/{file name}`. Hashes
/// are optional; when set, a file whose SHA-256 differs is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub name: String,
    pub base_url: String,
    pub model_hash: Option<String>,
    pub columns_hash: Option<String>,
    pub encoders_hash: Option<String>,
}

impl ArtifactInfo {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            model_hash: None,
            columns_hash: None,
            encoders_hash: None,
        }
    }

    fn url_for(&self, file: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file)
    }

    /// (file name, expected hash) for every part of the bundle.
    fn parts(&self) -> [(&'static str, Option<&str>); 3] {
        [
            (MODEL_FILE, self.model_hash.as_deref()),
            (COLUMNS_FILE, self.columns_hash.as_deref()),
            (ENCODERS_FILE, self.encoders_hash.as_deref()),
        ]
    }
}

/// Downloads artifact bundles into a local cache and hands out loaders for them.
#[derive(Clone)]
pub struct ArtifactManager {
    artifacts_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ArtifactManager {
    /// Creates a new ArtifactManager with the default cache directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_artifacts_dir())
    }

    /// Returns the default cache directory path
    pub fn get_default_artifacts_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("TAILOR_CACHE") {
            return PathBuf::from(path).join("artifacts");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("tailor").join("artifacts");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("tailor").join("artifacts");
        }

        env::temp_dir().join("tailor").join("artifacts")
    }

    pub fn new<P: AsRef<Path>>(artifacts_dir: P) -> io::Result<Self> {
        let artifacts_dir = artifacts_dir.as_ref().to_path_buf();
        fs::create_dir_all(&artifacts_dir)?;
        Ok(Self {
            artifacts_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn bundle_dir(&self, name: &str) -> PathBuf {
        self.artifacts_dir.join(name)
    }

    pub fn is_downloaded(&self, name: &str) -> bool {
        let dir = self.bundle_dir(name);
        log::debug!("Checking artifact bundle at {:?}", dir);
        [MODEL_FILE, COLUMNS_FILE, ENCODERS_FILE]
            .iter()
            .all(|file| dir.join(file).exists())
    }

    /// A loader for a bundle that is already in the cache.
    pub fn loader(&self, name: &str) -> Result<ArtifactDir, ArtifactError> {
        if !self.is_downloaded(name) {
            return Err(ArtifactError::NotDownloaded(name.to_string()));
        }
        Ok(ArtifactDir::new(self.bundle_dir(name)))
    }

    /// Fetches every part of the bundle. On any failure the partial bundle is removed.
    pub async fn download(&self, info: &ArtifactInfo) -> Result<(), ArtifactError> {
        let _lock = self.download_lock.lock().await;

        let dir = self.bundle_dir(&info.name);
        log::info!("Creating artifact directory at {:?}", dir);
        fs::create_dir_all(&dir)?;

        for (file, expected_hash) in info.parts() {
            let path = dir.join(file);
            let result = if path.exists() && self.matches_hash(&path, expected_hash)? {
                log::info!("Existing {} verified", file);
                Ok(())
            } else {
                self.download_and_verify_file(&info.url_for(file), &path, expected_hash, file)
                    .await
            }
            .and_then(|_| Self::check_metadata(&path, file));

            if let Err(e) = result {
                log::error!("Failed to set up {}: {}", file, e);
                if let Err(cleanup) = self.remove_download(&info.name) {
                    log::warn!("Failed to remove partial bundle '{}': {}", info.name, cleanup);
                }
                return Err(e);
            }
        }

        log::info!("Artifact bundle '{}' ready", info.name);
        Ok(())
    }

    fn file_hash(path: &Path) -> Result<String, ArtifactError> {
        let bytes = fs::read(path)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Files without an expected hash always match.
    fn matches_hash(&self, path: &Path, expected_hash: Option<&str>) -> Result<bool, ArtifactError> {
        match expected_hash {
            Some(expected) => {
                let hash = Self::file_hash(path)?;
                log::debug!("{:?}: calculated {}, expected {}", path, hash, expected);
                Ok(hash == expected)
            }
            None => Ok(true),
        }
    }

    /// The JSON parts must parse as a column list and encoder tables.
    fn check_metadata(path: &Path, file: &str) -> Result<(), ArtifactError> {
        match file {
            COLUMNS_FILE => {
                let _: Vec<String> = serde_json::from_slice(&fs::read(path)?)?;
            }
            ENCODERS_FILE => {
                let _: EncoderTables = serde_json::from_slice(&fs::read(path)?)?;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn verify(&self, info: &ArtifactInfo) -> Result<bool, ArtifactError> {
        let dir = self.bundle_dir(&info.name);
        for (file, expected_hash) in info.parts() {
            let path = dir.join(file);
            if !path.exists() {
                log::info!("{:?} does not exist", path);
                return Ok(false);
            }
            if !self.matches_hash(&path, expected_hash)? {
                log::warn!("{:?} failed hash verification", path);
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn download_and_verify_file(
        &self,
        url: &str,
        path: &Path,
        expected_hash: Option<&str>,
        file_type: &str,
    ) -> Result<(), ArtifactError> {
        log::info!("Downloading {} from {} to {:?}", file_type, url, path);
        let response = reqwest::get(url).await?.error_for_status()?;
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        if let Some(expected) = expected_hash {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            let hash = format!("{:x}", hasher.finalize());
            if hash != expected {
                log::error!("{} hash mismatch: expected {}, got {}", file_type, expected, hash);
                return Err(ArtifactError::HashMismatch {
                    file_type: file_type.to_string(),
                    expected: expected.to_string(),
                    actual: hash,
                });
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;

        if !self.matches_hash(path, expected_hash)? {
            return Err(ArtifactError::VerificationFailed);
        }
        Ok(())
    }

    pub fn remove_download(&self, name: &str) -> Result<(), ArtifactError> {
        let dir = self.bundle_dir(name);
        for file in [MODEL_FILE, COLUMNS_FILE, ENCODERS_FILE] {
            let path = dir.join(file);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Makes sure a verified copy of the bundle is cached and returns its loader.
    pub async fn ensure_downloaded(&self, info: &ArtifactInfo) -> Result<ArtifactDir, ArtifactError> {
        if !self.is_downloaded(&info.name) {
            log::info!("Artifact bundle '{}' not cached, downloading...", info.name);
            self.download(info).await?;
        } else if !self.verify(info)? {
            log::info!("Artifact bundle '{}' failed verification, re-downloading...", info.name);
            self.remove_download(&info.name)?;
            self.download(info).await?;
        }
        self.loader(&info.name)
    }
}
