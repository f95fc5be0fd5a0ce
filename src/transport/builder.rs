// src/transport/builder.rs
use std::path::PathBuf;
use url::Url;

use crate::auth::ResolvedAuth;
use crate::error::{KubeConfigError, Result};
use crate::kubeconfig::ClusterEntry;
use crate::material::{MaterialKind, MaterialStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verify {
    /// TLS verification turned off.
    Disabled,
    /// Platform trust store.
    Platform,
    CaFile(PathBuf),
}

/// Everything an HTTP client needs to talk to one cluster. Only the fields
/// of the active auth mechanism are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub base_url: String,
    pub verify: Verify,
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
    pub authorization: Option<String>,
    pub basic_auth: Option<(String, String)>,
}

pub fn build(
    cluster: &ClusterEntry,
    auth: ResolvedAuth,
    store: &MaterialStore,
) -> Result<TransportConfig> {
    validate_server(&cluster.server)?;

    let verify = if cluster.insecure_skip_tls_verify {
        Verify::Disabled
    } else if let Some(ca) = &cluster.certificate_authority {
        Verify::CaFile(ca.resolve(store, MaterialKind::CaCertificate)?)
    } else if let ResolvedAuth::InCluster { ca_path, .. } = &auth {
        Verify::CaFile(ca_path.clone())
    } else {
        Verify::Platform
    };

    let mut config = TransportConfig {
        base_url: cluster.server.clone(),
        verify,
        cert_path: None,
        key_path: None,
        authorization: auth.authorization_header(),
        basic_auth: None,
    };

    match auth {
        ResolvedAuth::ClientCertificate {
            cert_path,
            key_path,
        } => {
            config.cert_path = Some(cert_path);
            config.key_path = Some(key_path);
        }
        ResolvedAuth::BasicAuth { username, password } => {
            config.basic_auth = Some((username, password));
        }
        ResolvedAuth::BearerToken { .. } | ResolvedAuth::InCluster { .. } | ResolvedAuth::None => {}
    }

    Ok(config)
}

fn validate_server(server: &str) -> Result<()> {
    if server.trim().is_empty() {
        return Err(KubeConfigError::InvalidServer(server.to_string()));
    }
    Url::parse(server)
        .map(|_| ())
        .map_err(|_| KubeConfigError::InvalidServer(server.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialSource;
    use std::fs;

    fn cluster() -> ClusterEntry {
        ClusterEntry::new("c", "https://127.0.0.1:8443")
    }

    #[test]
    fn insecure_wins_over_ca_material() {
        let store = MaterialStore::new("/unused");
        let cluster = ClusterEntry {
            certificate_authority: Some(MaterialSource::File("/ca.crt".into())),
            insecure_skip_tls_verify: true,
            ..cluster()
        };

        let config = build(&cluster, ResolvedAuth::None, &store).unwrap();

        assert_eq!(config.verify, Verify::Disabled);
    }

    #[test]
    fn inline_ca_is_materialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = MaterialStore::new(dir.path());
        let cluster = ClusterEntry {
            certificate_authority: Some(MaterialSource::Inline("c29tZS1jYQo=".into())),
            ..cluster()
        };

        let config = build(&cluster, ResolvedAuth::None, &store).unwrap();

        match config.verify {
            Verify::CaFile(path) => assert_eq!(fs::read_to_string(path).unwrap(), "some-ca\n"),
            other => panic!("unexpected verify: {:?}", other),
        }
    }

    #[test]
    fn no_ca_uses_platform_trust() {
        let store = MaterialStore::new("/unused");
        let config = build(&cluster(), ResolvedAuth::None, &store).unwrap();

        assert_eq!(config.verify, Verify::Platform);
        assert_eq!(config.authorization, None);
        assert_eq!(config.basic_auth, None);
        assert_eq!(config.cert_path, None);
    }

    #[test]
    fn in_cluster_ca_is_used_when_cluster_has_none() {
        let store = MaterialStore::new("/unused");
        let auth = ResolvedAuth::InCluster {
            token: "t".to_string(),
            ca_path: "/sa/ca.crt".into(),
        };

        let config = build(&cluster(), auth, &store).unwrap();

        assert_eq!(config.verify, Verify::CaFile("/sa/ca.crt".into()));
        assert_eq!(config.authorization.as_deref(), Some("Bearer t"));
    }

    #[test]
    fn basic_auth_sets_only_the_pair() {
        let store = MaterialStore::new("/unused");
        let auth = ResolvedAuth::BasicAuth {
            username: "u".to_string(),
            password: "p".to_string(),
        };

        let config = build(&cluster(), auth, &store).unwrap();

        assert_eq!(config.basic_auth, Some(("u".to_string(), "p".to_string())));
        assert_eq!(config.authorization, None);
        assert_eq!(config.key_path, None);
    }

    #[test]
    fn empty_or_relative_server_is_rejected() {
        let store = MaterialStore::new("/unused");
        for server in ["", "   ", "not a url"] {
            let cluster = ClusterEntry::new("c", server);
            assert!(matches!(
                build(&cluster, ResolvedAuth::None, &store),
                Err(KubeConfigError::InvalidServer(_))
            ));
        }
    }
}
