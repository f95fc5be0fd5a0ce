// src/kubeconfig/resolve.rs
use super::types::{ClusterEntry, KubeConfig, UserEntry};
use crate::error::{KubeConfigError, Result};

/// A context whose cluster and user references have been looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContext {
    pub name: String,
    pub cluster: ClusterEntry,
    pub user: UserEntry,
    pub namespace: Option<String>,
}

pub fn resolve_context(config: &KubeConfig, context_name: &str) -> Result<ResolvedContext> {
    let context = config
        .contexts
        .get(context_name)
        .ok_or_else(|| KubeConfigError::ContextNotFound(context_name.to_string()))?;

    let cluster = config
        .clusters
        .get(&context.cluster)
        .ok_or_else(|| KubeConfigError::ClusterNotFound(context.cluster.clone()))?;

    let user = config
        .users
        .get(&context.user)
        .ok_or_else(|| KubeConfigError::UserNotFound(context.user.clone()))?;

    Ok(ResolvedContext {
        name: context.name.clone(),
        cluster: cluster.clone(),
        user: user.clone(),
        namespace: context.namespace.clone(),
    })
}

pub fn resolve_current_context(config: &KubeConfig) -> Result<ResolvedContext> {
    let current = config
        .current_context
        .as_deref()
        .ok_or(KubeConfigError::NoCurrentContext)?;
    resolve_context(config, current)
}
