// src/kubeconfig/types.rs
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::material::MaterialSource;

// Raw document shape, as written by kubectl.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct RawKubeConfig {
    #[serde(default)]
    pub clusters: Vec<RawNamedCluster>,
    #[serde(default)]
    pub users: Vec<RawNamedUser>,
    #[serde(default)]
    pub contexts: Vec<RawNamedContext>,
    pub current_context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNamedCluster {
    pub name: String,
    pub cluster: RawCluster,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNamedUser {
    pub name: String,
    #[serde(default)]
    pub user: RawUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNamedContext {
    pub name: String,
    pub context: RawContext,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct RawCluster {
    #[serde(default)]
    pub server: String,
    pub certificate_authority_data: Option<String>,
    pub certificate_authority: Option<String>,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct RawUser {
    pub client_certificate_data: Option<String>,
    pub client_certificate: Option<String>,
    pub client_key_data: Option<String>,
    pub client_key: Option<String>,
    pub token: Option<String>,
    #[serde(rename = "tokenFile")]
    pub token_file: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawContext {
    pub cluster: String,
    pub user: String,
    pub namespace: Option<String>,
}

// Resolved model.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEntry {
    pub name: String,
    pub server: String,
    pub certificate_authority: Option<MaterialSource>,
    pub insecure_skip_tls_verify: bool,
}

impl ClusterEntry {
    pub fn new(name: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            certificate_authority: None,
            insecure_skip_tls_verify: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserEntry {
    pub name: String,
    pub client_certificate: Option<MaterialSource>,
    pub client_key: Option<MaterialSource>,
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    pub name: String,
    pub cluster: String,
    pub user: String,
    pub namespace: Option<String>,
}

/// A parsed kubeconfig: three independent name-keyed collections plus the
/// current-context pointer. Cross references are not checked until a
/// context is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubeConfig {
    pub clusters: BTreeMap<String, ClusterEntry>,
    pub users: BTreeMap<String, UserEntry>,
    pub contexts: BTreeMap<String, ContextEntry>,
    pub current_context: Option<String>,
}

impl KubeConfig {
    /// Folds `other` into `self`. Names already present keep their first
    /// definition, matching how kubectl merges KUBECONFIG files.
    pub fn merge(mut self, other: KubeConfig) -> Self {
        for (name, cluster) in other.clusters {
            self.clusters.entry(name).or_insert(cluster);
        }
        for (name, user) in other.users {
            self.users.entry(name).or_insert(user);
        }
        for (name, context) in other.contexts {
            self.contexts.entry(name).or_insert(context);
        }
        if self.current_context.is_none() {
            self.current_context = other.current_context;
        }
        self
    }
}

fn material(data: Option<String>, file: Option<String>) -> Option<MaterialSource> {
    match (data, file) {
        (Some(data), _) => Some(MaterialSource::Inline(data)),
        (None, Some(file)) => Some(MaterialSource::File(expand_path(&file))),
        (None, None) => None,
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

impl From<RawKubeConfig> for KubeConfig {
    fn from(raw: RawKubeConfig) -> Self {
        let mut config = KubeConfig {
            current_context: raw.current_context.filter(|c| !c.is_empty()),
            ..Default::default()
        };

        for named in raw.clusters {
            let c = named.cluster;
            config
                .clusters
                .entry(named.name.clone())
                .or_insert(ClusterEntry {
                    name: named.name,
                    server: c.server,
                    certificate_authority: material(
                        c.certificate_authority_data,
                        c.certificate_authority,
                    ),
                    insecure_skip_tls_verify: c.insecure_skip_tls_verify,
                });
        }

        for named in raw.users {
            let u = named.user;
            config.users.entry(named.name.clone()).or_insert(UserEntry {
                name: named.name,
                client_certificate: material(u.client_certificate_data, u.client_certificate),
                client_key: material(u.client_key_data, u.client_key),
                token: u.token,
                token_file: u.token_file.as_deref().map(expand_path),
                username: u.username,
                password: u.password,
            });
        }

        for named in raw.contexts {
            let c = named.context;
            config
                .contexts
                .entry(named.name.clone())
                .or_insert(ContextEntry {
                    name: named.name,
                    cluster: c.cluster,
                    user: c.user,
                    namespace: c.namespace,
                });
        }

        config
    }
}
