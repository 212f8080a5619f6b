/// Precomputed model assets: the fixed vocabulary and the synonym table.
///
/// The artifact is produced offline and read exactly once at startup. It is a JSON
/// object of the form:
///
/// ```json
/// { "vocab": ["tomato", "cheese"], "synonyms": { "tomatoes": "tomato" } }
/// ```
///
/// Any read or decode failure is reported as `CommonError::AssetMissing`; there is
/// no fallback vocabulary.
use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::CommonError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAssets {
    /// Ordered vocabulary; position `i` is dimension `i` of the similarity space.
    pub vocab: Vec<String>,
    /// Raw ingredient token -> canonical vocabulary token.
    #[serde(default)]
    pub synonyms: HashMap<String, String>,
}

impl ModelAssets {
    /// Read and validate the artifact at `path`.
    pub async fn load(path: &Path) -> Result<Self, CommonError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| asset_missing(path, format!("read failed: {e}")))?;
        let assets = Self::from_slice(&bytes).map_err(|reason| asset_missing(path, reason))?;

        info!(
            path = %path.display(),
            vocab = assets.vocab.len(),
            synonyms = assets.synonyms.len(),
            fingerprint = %fingerprint(&bytes),
            "model assets loaded"
        );
        Ok(assets)
    }

    /// Decode and validate an in-memory artifact.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, String> {
        let assets: ModelAssets =
            serde_json::from_slice(bytes).map_err(|e| format!("invalid asset json: {e}"))?;
        assets.validate()?;
        Ok(assets)
    }

    fn validate(&self) -> Result<(), String> {
        if self.vocab.is_empty() {
            return Err("vocabulary is empty".to_string());
        }
        let mut seen = HashSet::with_capacity(self.vocab.len());
        for term in &self.vocab {
            if term.trim().is_empty() {
                return Err("vocabulary contains a blank term".to_string());
            }
            if !seen.insert(term.as_str()) {
                return Err(format!("vocabulary term '{term}' is duplicated"));
            }
        }
        Ok(())
    }
}

/// Hex SHA-256 of the artifact bytes, logged so deployments can tell asset builds apart.
pub fn fingerprint(bytes: &[u8]) -> String {
    let hash = Sha256::digest(bytes);
    format!("{:x}", hash)
}

fn asset_missing(path: &Path, reason: String) -> CommonError {
    CommonError::AssetMissing {
        path: path.display().to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn decodes_vocab_and_synonyms() {
        let json = br#"{"vocab": ["tomato", "cheese"], "synonyms": {"tomatoes": "tomato"}}"#;
        let assets = ModelAssets::from_slice(json).expect("valid assets");
        assert_eq!(assets.vocab, vec!["tomato", "cheese"]);
        assert_eq!(assets.synonyms.get("tomatoes").map(String::as_str), Some("tomato"));
    }

    #[test]
    fn synonyms_are_optional() {
        let assets = ModelAssets::from_slice(br#"{"vocab": ["flour"]}"#).expect("valid assets");
        assert!(assets.synonyms.is_empty());
    }

    #[test]
    fn rejects_empty_or_duplicated_vocabulary() {
        assert!(ModelAssets::from_slice(br#"{"vocab": []}"#).is_err());
        let err = ModelAssets::from_slice(br#"{"vocab": ["salt", "salt"]}"#).unwrap_err();
        assert!(err.contains("duplicated"));
        assert!(ModelAssets::from_slice(b"not json").is_err());
    }

    #[test]
    fn fingerprint_is_stable() {
        assert_eq!(fingerprint(b"abc"), fingerprint(b"abc"));
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abd"));
        assert_eq!(fingerprint(b"").len(), 64);
    }

    #[tokio::test]
    async fn load_reads_artifact_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(br#"{"vocab": ["milk"], "synonyms": {"whole milk": "milk"}}"#)
            .expect("write asset");

        let assets = ModelAssets::load(file.path()).await.expect("load assets");
        assert_eq!(assets.vocab, vec!["milk"]);
    }

    #[tokio::test]
    async fn load_reports_missing_artifact() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = ModelAssets::load(&dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommonError::AssetMissing { .. }));
    }
}
