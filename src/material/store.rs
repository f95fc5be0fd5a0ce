// src/material/store.rs
use base64::{engine::general_purpose, Engine as _};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{KubeConfigError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    CaCertificate,
    ClientCertificate,
    ClientKey,
}

impl MaterialKind {
    fn file_prefix(&self) -> &'static str {
        match self {
            MaterialKind::CaCertificate => "ca-cert",
            MaterialKind::ClientCertificate => "client-cert",
            MaterialKind::ClientKey => "client-key",
        }
    }
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterialKind::CaCertificate => write!(f, "CA certificate"),
            MaterialKind::ClientCertificate => write!(f, "client certificate"),
            MaterialKind::ClientKey => write!(f, "client key"),
        }
    }
}

/// Where a piece of credential material comes from in a kubeconfig: the
/// `*-data` key (base64) or the plain path key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialSource {
    Inline(String),
    File(PathBuf),
}

impl MaterialSource {
    pub fn resolve(&self, store: &MaterialStore, kind: MaterialKind) -> Result<PathBuf> {
        let pending = self.prepare(store, kind)?;
        store.commit(pending)
    }

    pub(crate) fn prepare(
        &self,
        store: &MaterialStore,
        kind: MaterialKind,
    ) -> Result<PendingMaterial> {
        match self {
            MaterialSource::File(path) => Ok(PendingMaterial::Ready(path.clone())),
            MaterialSource::Inline(data) => store.prepare(data, kind),
        }
    }
}

/// Material that has been validated but not yet written. Lets callers
/// decode several pieces before any of them touches the disk.
#[derive(Debug)]
pub(crate) enum PendingMaterial {
    Ready(PathBuf),
    Decoded { bytes: Vec<u8>, kind: MaterialKind },
}

/// Turns inline credential material into files an HTTP client can load.
/// Written files are never removed.
#[derive(Debug, Clone)]
pub struct MaterialStore {
    dir: PathBuf,
}

impl MaterialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns `raw` unchanged when it names an existing file, otherwise
    /// decodes it as base64 into a fresh file under the store directory.
    pub fn materialize(&self, raw: &str, kind: MaterialKind) -> Result<PathBuf> {
        let pending = self.prepare(raw, kind)?;
        self.commit(pending)
    }

    pub(crate) fn prepare(&self, raw: &str, kind: MaterialKind) -> Result<PendingMaterial> {
        let candidate = Path::new(raw);
        if candidate.is_file() {
            return Ok(PendingMaterial::Ready(candidate.to_path_buf()));
        }

        let bytes = decode_material(raw, kind)?;
        Ok(PendingMaterial::Decoded { bytes, kind })
    }

    pub(crate) fn commit(&self, pending: PendingMaterial) -> Result<PathBuf> {
        match pending {
            PendingMaterial::Ready(path) => Ok(path),
            PendingMaterial::Decoded { bytes, kind } => self.write_exclusive(&bytes, kind),
        }
    }

    fn write_exclusive(&self, bytes: &[u8], kind: MaterialKind) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| KubeConfigError::MaterialWrite {
            path: self.dir.clone(),
            source,
        })?;

        let path = self
            .dir
            .join(format!("{}-{}.pem", kind.file_prefix(), Uuid::new_v4()));

        let written = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .and_then(|mut file| file.write_all(bytes));

        match written {
            Ok(()) => Ok(path),
            Err(source) => Err(KubeConfigError::MaterialWrite { path, source }),
        }
    }
}

fn decode_material(raw: &str, kind: MaterialKind) -> Result<Vec<u8>> {
    // Embedded certificates are often wrapped across lines.
    let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| KubeConfigError::MaterialDecode {
            kind,
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_material_lands_in_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = MaterialStore::new(dir.path());
        let encoded = general_purpose::STANDARD.encode("some-ca\n");

        let first = store.materialize(&encoded, MaterialKind::CaCertificate).unwrap();
        let second = store.materialize(&encoded, MaterialKind::CaCertificate).unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with(dir.path()));
        assert_eq!(fs::read_to_string(&first).unwrap(), "some-ca\n");
        assert_eq!(fs::read_to_string(&second).unwrap(), "some-ca\n");
    }

    #[test]
    fn existing_path_is_returned_without_copy() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("client.key");
        fs::write(&existing, "key").unwrap();
        let store = MaterialStore::new(dir.path().join("material"));

        let path = store
            .materialize(existing.to_str().unwrap(), MaterialKind::ClientKey)
            .unwrap();

        assert_eq!(path, existing);
        assert!(!store.dir().exists());
    }

    #[test]
    fn wrapped_base64_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let store = MaterialStore::new(dir.path());

        let path = store
            .materialize("c29tZS1j\nZXJ0Cg==\n", MaterialKind::ClientCertificate)
            .unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "some-cert\n");
    }

    #[test]
    fn malformed_base64_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = MaterialStore::new(dir.path());

        let err = store
            .materialize("not base64 at all!", MaterialKind::ClientKey)
            .unwrap_err();

        assert!(matches!(
            err,
            KubeConfigError::MaterialDecode {
                kind: MaterialKind::ClientKey,
                ..
            }
        ));
    }

    #[test]
    fn missing_directory_is_created_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = MaterialStore::new(&nested);

        let path = store
            .materialize("c29tZS1rZXkK", MaterialKind::ClientKey)
            .unwrap();

        assert!(nested.is_dir());
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("client-key-"));
    }

    #[test]
    fn prepare_does_not_touch_the_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = MaterialStore::new(dir.path().join("material"));

        let pending = store.prepare("c29tZS1rZXkK", MaterialKind::ClientKey).unwrap();
        assert!(!store.dir().exists());

        let path = store.commit(pending).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "some-key\n");
    }

    #[test]
    fn file_source_passes_through_verbatim() {
        let store = MaterialStore::new("/unused");
        let source = MaterialSource::File(PathBuf::from("/path/to/.minikube/ca.crt"));

        let path = source.resolve(&store, MaterialKind::CaCertificate).unwrap();

        assert_eq!(path, PathBuf::from("/path/to/.minikube/ca.crt"));
    }
}
