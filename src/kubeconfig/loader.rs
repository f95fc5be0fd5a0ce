// src/kubeconfig/loader.rs
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{KubeConfig, RawKubeConfig};
use crate::error::{KubeConfigError, Result};

pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

impl KubeConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(KubeConfig::default());
        }
        let raw: RawKubeConfig = serde_yaml::from_str(yaml)?;
        Ok(raw.into())
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml =
            fs::read_to_string(path).map_err(|source| KubeConfigError::KubeConfigUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml(&yaml)
    }

    /// Loads the files listed in `KUBECONFIG`, or `~/.kube/config` when the
    /// variable is unset or empty.
    pub fn read_default() -> Result<Self> {
        let search = kubeconfig_search_paths(env::var_os(KUBECONFIG_ENV), dirs::home_dir());
        Self::read_merged(&search)
    }

    /// Merges every existing file in `paths`, earlier files taking
    /// precedence. Missing files are skipped.
    pub fn read_merged(paths: &[PathBuf]) -> Result<Self> {
        let mut merged: Option<KubeConfig> = None;
        for path in paths.iter().filter(|p| p.is_file()) {
            let config = Self::read_from(path)?;
            merged = Some(match merged {
                Some(acc) => acc.merge(config),
                None => config,
            });
        }
        merged.ok_or(KubeConfigError::NoKubeConfig)
    }
}

fn kubeconfig_search_paths(var: Option<OsString>, home: Option<PathBuf>) -> Vec<PathBuf> {
    let listed: Vec<PathBuf> = var
        .map(|v| {
            env::split_paths(&v)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default();

    if !listed.is_empty() {
        return listed;
    }

    home.map(|h| vec![h.join(".kube").join("config")])
        .unwrap_or_default()
}
