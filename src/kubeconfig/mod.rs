// src/kubeconfig/mod.rs
mod loader;
mod resolve;
mod types;

pub use loader::KUBECONFIG_ENV;
pub use resolve::{resolve_context, resolve_current_context, ResolvedContext};
pub use types::{ClusterEntry, ContextEntry, KubeConfig, UserEntry};
