// src/auth/selector.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{KubeConfigError, Result};
use crate::kubeconfig::UserEntry;
use crate::material::{MaterialKind, MaterialStore};

/// The single authentication mechanism a transport will use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAuth {
    BasicAuth { username: String, password: String },
    BearerToken { token: String },
    ClientCertificate { cert_path: PathBuf, key_path: PathBuf },
    InCluster { token: String, ca_path: PathBuf },
    None,
}

impl ResolvedAuth {
    /// Value for the `Authorization` header, for token based variants.
    pub fn authorization_header(&self) -> Option<String> {
        match self {
            ResolvedAuth::BearerToken { token } | ResolvedAuth::InCluster { token, .. } => {
                Some(format!("Bearer {}", token))
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResolvedAuth::BasicAuth { .. } => "basic-auth",
            ResolvedAuth::BearerToken { .. } => "bearer-token",
            ResolvedAuth::ClientCertificate { .. } => "client-certificate",
            ResolvedAuth::InCluster { .. } => "in-cluster",
            ResolvedAuth::None => "none",
        }
    }
}

/// Picks the auth mechanism for a kubeconfig user. Client certificates win
/// over tokens, tokens over basic auth.
pub fn select_auth(user: &UserEntry, store: &MaterialStore) -> Result<ResolvedAuth> {
    match (&user.client_certificate, &user.client_key) {
        (Some(cert), Some(key)) => {
            // Decode both halves before writing either.
            let cert = cert.prepare(store, MaterialKind::ClientCertificate)?;
            let key = key.prepare(store, MaterialKind::ClientKey)?;
            let cert_path = store.commit(cert)?;
            let key_path = store.commit(key)?;
            return Ok(ResolvedAuth::ClientCertificate {
                cert_path,
                key_path,
            });
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(KubeConfigError::IncompleteClientCertificate(
                user.name.clone(),
            ));
        }
        (None, None) => {}
    }

    if let Some(token) = &user.token {
        return Ok(ResolvedAuth::BearerToken {
            token: token.clone(),
        });
    }
    if let Some(path) = &user.token_file {
        return from_bearer_token_file(path);
    }

    match (&user.username, &user.password) {
        (Some(username), Some(password)) => Ok(from_basic_auth(username, password)),
        (Some(_), None) | (None, Some(_)) => {
            Err(KubeConfigError::IncompleteBasicAuth(user.name.clone()))
        }
        (None, None) => Ok(ResolvedAuth::None),
    }
}

pub fn from_basic_auth(username: &str, password: &str) -> ResolvedAuth {
    ResolvedAuth::BasicAuth {
        username: username.to_string(),
        password: password.to_string(),
    }
}

pub fn from_bearer_token_file(path: impl AsRef<Path>) -> Result<ResolvedAuth> {
    let token = read_token(path.as_ref())?;
    Ok(ResolvedAuth::BearerToken { token })
}

pub(crate) fn read_token(path: &Path) -> Result<String> {
    let contents =
        fs::read_to_string(path).map_err(|source| KubeConfigError::CredentialFileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(contents.trim_end().to_string())
}
