// src/error.rs
use std::io;
use std::path::PathBuf;

use crate::material::MaterialKind;

#[derive(Debug)]
pub enum KubeConfigError {
    ContextNotFound(String),
    ClusterNotFound(String),
    UserNotFound(String),
    NoCurrentContext,
    MaterialDecode {
        kind: MaterialKind,
        reason: String,
    },
    MaterialWrite {
        path: PathBuf,
        source: io::Error,
    },
    IncompleteClientCertificate(String),
    IncompleteBasicAuth(String),
    CredentialFileUnreadable {
        path: PathBuf,
        source: io::Error,
    },
    KubeConfigUnreadable {
        path: PathBuf,
        source: io::Error,
    },
    NoKubeConfig,
    Parse(serde_yaml::Error),
    InvalidServer(String),
    NonUtf8Path(PathBuf),
}

pub type Result<T> = std::result::Result<T, KubeConfigError>;

impl std::fmt::Display for KubeConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContextNotFound(name) => write!(f, "Context not found in kubeconfig: {}", name),
            Self::ClusterNotFound(name) => write!(f, "Cluster not found in kubeconfig: {}", name),
            Self::UserNotFound(name) => write!(f, "User not found in kubeconfig: {}", name),
            Self::NoCurrentContext => {
                write!(f, "No context given and kubeconfig has no current-context")
            }
            Self::MaterialDecode { kind, reason } => {
                write!(f, "Malformed base64 {} data: {}", kind, reason)
            }
            Self::MaterialWrite { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
            Self::IncompleteClientCertificate(user) => write!(
                f,
                "User {} needs both a client certificate and a client key",
                user
            ),
            Self::IncompleteBasicAuth(user) => write!(
                f,
                "User {} needs both a username and a password for basic auth",
                user
            ),
            Self::CredentialFileUnreadable { path, source } => {
                write!(f, "Cannot read credential file {}: {}", path.display(), source)
            }
            Self::KubeConfigUnreadable { path, source } => {
                write!(f, "Cannot read kubeconfig {}: {}", path.display(), source)
            }
            Self::NoKubeConfig => write!(f, "No kubeconfig found in KUBECONFIG or ~/.kube/config"),
            Self::Parse(e) => write!(f, "Invalid kubeconfig document: {}", e),
            Self::InvalidServer(s) => write!(f, "Invalid cluster server URL: {:?}", s),
            Self::NonUtf8Path(path) => {
                write!(f, "Path is not valid UTF-8: {}", path.display())
            }
        }
    }
}

impl std::error::Error for KubeConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MaterialWrite { source, .. }
            | Self::CredentialFileUnreadable { source, .. }
            | Self::KubeConfigUnreadable { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for KubeConfigError {
    fn from(error: serde_yaml::Error) -> Self {
        KubeConfigError::Parse(error)
    }
}

impl From<KubeConfigError> for io::Error {
    fn from(error: KubeConfigError) -> Self {
        let kind = match &error {
            KubeConfigError::CredentialFileUnreadable { source, .. }
            | KubeConfigError::KubeConfigUnreadable { source, .. }
            | KubeConfigError::MaterialWrite { source, .. } => source.kind(),
            KubeConfigError::NoKubeConfig => io::ErrorKind::NotFound,
            _ => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, error.to_string())
    }
}
