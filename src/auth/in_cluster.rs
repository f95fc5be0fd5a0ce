// src/auth/in_cluster.rs
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::selector::{read_token, ResolvedAuth};
use crate::error::{KubeConfigError, Result};
use crate::settings;

pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Locations of the service account files mounted into every pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccountMount {
    pub token_path: PathBuf,
    pub ca_path: PathBuf,
    pub namespace_path: PathBuf,
}

impl ServiceAccountMount {
    pub fn at(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            token_path: dir.join("token"),
            ca_path: dir.join("ca.crt"),
            namespace_path: dir.join("namespace"),
        }
    }
}

impl Default for ServiceAccountMount {
    fn default() -> Self {
        Self::at(SERVICE_ACCOUNT_DIR)
    }
}

/// Builds in-cluster auth from the service account mount and, when the
/// namespace file is present, makes its value the process-wide default
/// namespace.
///
/// A missing namespace file is allowed and leaves the default untouched;
/// any other failure to read it is an error.
pub fn from_in_cluster_environment(mount: &ServiceAccountMount) -> Result<ResolvedAuth> {
    let (auth, namespace) = read_service_account(mount)?;
    if let Some(namespace) = namespace {
        settings::set_default_namespace(namespace);
    }
    Ok(auth)
}

pub(crate) fn read_service_account(
    mount: &ServiceAccountMount,
) -> Result<(ResolvedAuth, Option<String>)> {
    let token = read_token(&mount.token_path)?;

    let namespace = match fs::read_to_string(&mount.namespace_path) {
        Ok(ns) => Some(ns.trim().to_string()).filter(|ns| !ns.is_empty()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(source) => {
            return Err(KubeConfigError::CredentialFileUnreadable {
                path: mount.namespace_path.clone(),
                source,
            })
        }
    };

    Ok((
        ResolvedAuth::InCluster {
            token,
            ca_path: mount.ca_path.clone(),
        },
        namespace,
    ))
}
