// src/settings.rs
//! Process-wide defaults and the per-call overrides that shadow them.

use std::path::PathBuf;
use std::sync::RwLock;

use crate::auth::ServiceAccountMount;

pub const DEFAULT_NAMESPACE: &str = "default";
const TEMP_DIR_NAME: &str = "kube-transport";

static TEMP_DIR: RwLock<Option<PathBuf>> = RwLock::new(None);
static NAMESPACE: RwLock<Option<String>> = RwLock::new(None);

/// Directory where inline credential material is written.
pub fn temp_dir() -> PathBuf {
    let guard = TEMP_DIR.read().unwrap_or_else(|e| e.into_inner());
    guard
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(TEMP_DIR_NAME))
}

pub fn set_temp_dir(dir: impl Into<PathBuf>) {
    let mut guard = TEMP_DIR.write().unwrap_or_else(|e| e.into_inner());
    *guard = Some(dir.into());
}

/// Namespace used by resource construction when none is given explicitly.
pub fn default_namespace() -> String {
    let guard = NAMESPACE.read().unwrap_or_else(|e| e.into_inner());
    guard
        .clone()
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
}

pub fn set_default_namespace(namespace: impl Into<String>) {
    let mut guard = NAMESPACE.write().unwrap_or_else(|e| e.into_inner());
    *guard = Some(namespace.into());
}

pub fn reset_default_namespace() {
    let mut guard = NAMESPACE.write().unwrap_or_else(|e| e.into_inner());
    *guard = None;
}

/// Overrides for a single resolution. Unset fields fall back to the
/// process-wide defaults above.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub temp_dir: Option<PathBuf>,
    pub service_account: ServiceAccountMount,
}

impl ResolveOptions {
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_service_account(mut self, mount: ServiceAccountMount) -> Self {
        self.service_account = mount;
        self
    }

    pub fn resolved_temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(temp_dir)
    }
}
