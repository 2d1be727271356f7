//! Persistence and reporting of the winning key

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use ceid_identity::IdentityError;

use crate::search::SearchResult;

/// Default file name of the private key artifact
pub const PRIVATE_KEY_FILE: &str = "private.pem";

/// Default file name of the public key artifact
pub const PUBLIC_KEY_FILE: &str = "public.pem";

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to encode key artifacts: {0}")]
    Encode(#[from] IdentityError),
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Paths of the written artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifacts {
    pub private_key_path: PathBuf,
    pub public_key_path: PathBuf,
}

/// Consumer of the single winning result
pub trait ResultSink {
    fn commit(&self, result: &SearchResult) -> Result<Artifacts, SinkError>;
}

/// Writes the winning keypair as two PEM files
#[derive(Debug, Clone)]
pub struct PemFileSink {
    out_dir: PathBuf,
    private_name: String,
    public_name: String,
}

impl PemFileSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            private_name: PRIVATE_KEY_FILE.to_string(),
            public_name: PUBLIC_KEY_FILE.to_string(),
        }
    }

    /// Override the artifact file names
    pub fn with_names(
        mut self,
        private_name: impl Into<String>,
        public_name: impl Into<String>,
    ) -> Self {
        self.private_name = private_name.into();
        self.public_name = public_name.into();
        self
    }
}

impl Default for PemFileSink {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ResultSink for PemFileSink {
    fn commit(&self, result: &SearchResult) -> Result<Artifacts, SinkError> {
        let candidate = &result.candidate;
        // Encode both before touching the disk
        let private_pem = candidate.private_key_pem()?;
        let public_pem = candidate.public_key_pem()?;

        fs::create_dir_all(&self.out_dir).map_err(|source| SinkError::Io {
            path: self.out_dir.clone(),
            source,
        })?;

        let private_key_path = self.out_dir.join(&self.private_name);
        let public_key_path = self.out_dir.join(&self.public_name);

        write_private(&private_key_path, private_pem.as_bytes())?;
        fs::write(&public_key_path, public_pem.as_bytes()).map_err(|source| SinkError::Io {
            path: public_key_path.clone(),
            source,
        })?;

        info!(
            id = %candidate.id,
            private_key = %private_key_path.display(),
            public_key = %public_key_path.display(),
            "wrote key artifacts"
        );

        Ok(Artifacts {
            private_key_path,
            public_key_path,
        })
    }
}

/// Private keys are created owner-readable only where the platform allows it
fn write_private(path: &Path, contents: &[u8]) -> Result<(), SinkError> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options
        .open(path)
        .and_then(|mut file| file.write_all(contents))
        .map_err(|source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Operator-facing summary of a finished search
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    /// The matching extension ID
    pub id: String,
    /// SPKI DER of the public key, unpadded base64
    pub public_key: String,
    pub prefix: String,
    pub keys_tested: u64,
    pub time_secs: f64,
    pub keys_per_second: f64,
    /// Written artifacts, absent when persistence failed
    pub artifacts: Option<Artifacts>,
}

impl SearchReport {
    pub fn new(result: &SearchResult, artifacts: Option<Artifacts>) -> Self {
        Self {
            id: result.candidate.id.to_string(),
            public_key: result.candidate.public_key_base64(),
            prefix: result.prefix.clone(),
            keys_tested: result.keys_tested,
            time_secs: result.time_secs,
            keys_per_second: result.keys_per_second,
            artifacts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SearchConfig, SearchOutcome, VanitySearch};
    use ceid_crypto::encoding::base64_decode;
    use ceid_crypto::keypair::public_key_der_from_pem;
    use ceid_crypto::RsaKeypair;
    use ceid_identity::{derive, RsaKeySource};

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ceid_sink_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn empty_prefix_result() -> SearchResult {
        let config = SearchConfig::parse("", 1).unwrap();
        let search = VanitySearch::new(config, Box::new(RsaKeySource::new(1024)));
        match search.run().unwrap() {
            SearchOutcome::Found(result) => result,
            SearchOutcome::Cancelled => panic!("search was cancelled"),
        }
    }

    #[test]
    fn test_end_to_end_empty_prefix() {
        let dir = test_dir("e2e");
        let result = empty_prefix_result();

        let artifacts = PemFileSink::new(&dir).commit(&result).unwrap();
        assert_eq!(artifacts.private_key_path, dir.join(PRIVATE_KEY_FILE));
        assert_eq!(artifacts.public_key_path, dir.join(PUBLIC_KEY_FILE));

        // Public artifact carries exactly the bytes the ID was derived from
        let public_pem = fs::read_to_string(&artifacts.public_key_path).unwrap();
        let der = public_key_der_from_pem(&public_pem).unwrap();
        assert_eq!(der, result.candidate.public_key_der);
        assert_eq!(derive(&der), result.candidate.id);

        // Private artifact reloads to the same public key
        let private_pem = fs::read_to_string(&artifacts.private_key_path).unwrap();
        let keypair = RsaKeypair::from_pkcs1_pem(&private_pem).unwrap();
        assert_eq!(keypair.public_key_der().unwrap(), der);

        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn test_private_key_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = test_dir("perms");
        let result = empty_prefix_result();
        let artifacts = PemFileSink::new(&dir)
            .with_names("key.pem", "key.pub.pem")
            .commit(&result)
            .unwrap();

        let mode = fs::metadata(&artifacts.private_key_path)
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(artifacts.public_key_path.ends_with("key.pub.pem"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = test_dir("blocked");
        fs::create_dir_all(dir.parent().unwrap()).unwrap();
        // A regular file where the output directory should be
        fs::write(&dir, b"not a directory").unwrap();

        let result = empty_prefix_result();
        let err = PemFileSink::new(dir.join("out")).commit(&result).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));

        let _ = fs::remove_file(&dir);
    }

    #[test]
    fn test_report_fields() {
        let result = empty_prefix_result();
        let report = SearchReport::new(&result, None);

        assert_eq!(report.id, result.candidate.id.as_str());
        assert!(!report.public_key.ends_with('='));
        assert_eq!(
            base64_decode(&report.public_key).unwrap(),
            result.candidate.public_key_der
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["id"], result.candidate.id.as_str());
        assert!(json["artifacts"].is_null());
    }
}
