// src/cluster/mod.rs
use std::env;
use std::path::Path;

use crate::auth::{self, ResolvedAuth};
use crate::error::Result;
use crate::kubeconfig::{self, ClusterEntry, KubeConfig, ResolvedContext};
use crate::material::{MaterialKind, MaterialSource, MaterialStore};
use crate::settings::ResolveOptions;
use crate::transport::{self, ClientOptions, TransportConfig};
use crate::utils::logging::Logger;

pub const IN_CLUSTER_URL: &str = "https://kubernetes.default.svc";

/// A client session for one cluster. Holds the resolved cluster and auth
/// and the transport built from them; every reconfiguration rebuilds the
/// transport from scratch.
pub struct KubeCluster {
    cluster: ClusterEntry,
    auth: ResolvedAuth,
    namespace: Option<String>,
    transport: TransportConfig,
    store: MaterialStore,
    logger: Box<dyn Logger>,
}

impl KubeCluster {
    /// Unauthenticated client for `url`, verifying TLS against the
    /// platform trust store.
    pub fn new(url: &str, options: &ResolveOptions, logger: Box<dyn Logger>) -> Result<Self> {
        Self::assemble(
            ClusterEntry::new("", url),
            ResolvedAuth::None,
            None,
            MaterialStore::new(options.resolved_temp_dir()),
            logger,
        )
    }

    /// Resolves `context`, or the document's current-context when `None`.
    pub fn from_kubeconfig(
        config: &KubeConfig,
        context: Option<&str>,
        options: &ResolveOptions,
        mut logger: Box<dyn Logger>,
    ) -> Result<Self> {
        let resolved = match context {
            Some(name) => kubeconfig::resolve_context(config, name)?,
            None => kubeconfig::resolve_current_context(config)?,
        };
        logger.debug_log(&format!(
            "Context {} resolved to cluster {} and user {}",
            resolved.name, resolved.cluster.name, resolved.user.name
        ));

        let ResolvedContext {
            cluster,
            user,
            namespace,
            ..
        } = resolved;
        let store = MaterialStore::new(options.resolved_temp_dir());
        let auth = auth::select_auth(&user, &store)?;

        Self::assemble(cluster, auth, namespace, store, logger)
    }

    pub fn from_kubeconfig_yaml(
        yaml: &str,
        context: Option<&str>,
        options: &ResolveOptions,
        logger: Box<dyn Logger>,
    ) -> Result<Self> {
        let config = KubeConfig::from_yaml(yaml)?;
        Self::from_kubeconfig(&config, context, options, logger)
    }

    pub fn from_kubeconfig_file(
        path: impl AsRef<Path>,
        context: Option<&str>,
        options: &ResolveOptions,
        mut logger: Box<dyn Logger>,
    ) -> Result<Self> {
        logger.debug_log(&format!("Loading kubeconfig from {}", path.as_ref().display()));
        let config = KubeConfig::read_from(path)?;
        Self::from_kubeconfig(&config, context, options, logger)
    }

    /// Loads from `KUBECONFIG` or `~/.kube/config`.
    pub fn from_environment(
        context: Option<&str>,
        options: &ResolveOptions,
        logger: Box<dyn Logger>,
    ) -> Result<Self> {
        let config = KubeConfig::read_default()?;
        Self::from_kubeconfig(&config, context, options, logger)
    }

    /// Authenticates with the pod's service account. Also sets the
    /// process-wide default namespace from the mount.
    pub fn in_cluster_configuration(
        options: &ResolveOptions,
        logger: Box<dyn Logger>,
    ) -> Result<Self> {
        let auth = auth::from_in_cluster_environment(&options.service_account)?;
        let namespace = crate::settings::default_namespace();
        Self::assemble(
            ClusterEntry::new("in-cluster", in_cluster_url()),
            auth,
            Some(namespace),
            MaterialStore::new(options.resolved_temp_dir()),
            logger,
        )
    }

    fn assemble(
        cluster: ClusterEntry,
        auth: ResolvedAuth,
        namespace: Option<String>,
        store: MaterialStore,
        mut logger: Box<dyn Logger>,
    ) -> Result<Self> {
        let transport = transport::build(&cluster, auth.clone(), &store)?;
        logger.log(&format!(
            "Configured {} with {} auth",
            transport.base_url,
            auth.kind()
        ));

        Ok(Self {
            cluster,
            auth,
            namespace,
            transport,
            store,
            logger,
        })
    }

    fn rebuild(&mut self, cluster: ClusterEntry, auth: ResolvedAuth) -> Result<()> {
        let transport = transport::build(&cluster, auth.clone(), &self.store)?;
        self.logger.debug_log(&format!(
            "Reconfigured {} with {} auth",
            transport.base_url,
            auth.kind()
        ));
        self.cluster = cluster;
        self.auth = auth;
        self.transport = transport;
        Ok(())
    }

    pub fn http_authentication(&mut self, username: &str, password: &str) -> Result<()> {
        self.rebuild(self.cluster.clone(), auth::from_basic_auth(username, password))
    }

    pub fn with_token(&mut self, token: &str) -> Result<()> {
        let auth = ResolvedAuth::BearerToken {
            token: token.to_string(),
        };
        self.rebuild(self.cluster.clone(), auth)
    }

    pub fn load_token_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let auth = auth::from_bearer_token_file(path)?;
        self.rebuild(self.cluster.clone(), auth)
    }

    /// Each argument is either a path to an existing file or base64 data.
    pub fn with_certificate(&mut self, certificate: &str, key: &str) -> Result<()> {
        let certificate = self
            .store
            .prepare(certificate, MaterialKind::ClientCertificate)?;
        let key = self.store.prepare(key, MaterialKind::ClientKey)?;
        let auth = ResolvedAuth::ClientCertificate {
            cert_path: self.store.commit(certificate)?,
            key_path: self.store.commit(key)?,
        };
        self.rebuild(self.cluster.clone(), auth)
    }

    pub fn with_ca_certificate(&mut self, ca: &str) -> Result<()> {
        let path = self.store.materialize(ca, MaterialKind::CaCertificate)?;
        let cluster = ClusterEntry {
            certificate_authority: Some(MaterialSource::File(path)),
            insecure_skip_tls_verify: false,
            ..self.cluster.clone()
        };
        self.rebuild(cluster, self.auth.clone())
    }

    pub fn without_ssl_checks(&mut self) -> Result<()> {
        let cluster = ClusterEntry {
            insecure_skip_tls_verify: true,
            ..self.cluster.clone()
        };
        self.rebuild(cluster, self.auth.clone())
    }

    pub fn url(&self) -> &str {
        &self.transport.base_url
    }

    pub fn auth(&self) -> &ResolvedAuth {
        &self.auth
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    pub fn client_options(&self) -> Result<ClientOptions> {
        ClientOptions::try_from(&self.transport)
    }
}

fn in_cluster_url() -> String {
    match (
        env::var("KUBERNETES_SERVICE_HOST"),
        env::var("KUBERNETES_SERVICE_PORT"),
    ) {
        (Ok(host), Ok(port)) if !host.is_empty() && !port.is_empty() => {
            // IPv6 service hosts need brackets.
            if host.contains(':') {
                format!("https://[{}]:{}", host, port)
            } else {
                format!("https://{}:{}", host, port)
            }
        }
        _ => IN_CLUSTER_URL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KubeConfigError;
    use crate::transport::Verify;
    use crate::utils::logging::StderrLogger;
    use std::fs;

    fn logger() -> Box<dyn Logger> {
        Box::new(StderrLogger::new(false))
    }

    #[test]
    fn reconfiguring_replaces_previous_auth() {
        let dir = tempfile::tempdir().unwrap();
        let options = ResolveOptions::default().with_temp_dir(dir.path());
        let mut cluster = KubeCluster::new("https://k8s:6443", &options, logger()).unwrap();

        cluster.with_token("abc").unwrap();
        assert_eq!(
            cluster.transport().authorization.as_deref(),
            Some("Bearer abc")
        );

        cluster.http_authentication("some-user", "some-password").unwrap();
        assert_eq!(cluster.transport().authorization, None);
        assert_eq!(
            cluster.transport().basic_auth,
            Some(("some-user".to_string(), "some-password".to_string()))
        );

        cluster
            .with_certificate("c29tZS1jZXJ0Cg==", "c29tZS1rZXkK")
            .unwrap();
        assert_eq!(cluster.transport().basic_auth, None);
        let cert = cluster.transport().cert_path.clone().unwrap();
        assert_eq!(fs::read_to_string(cert).unwrap(), "some-cert\n");
    }

    #[test]
    fn tls_settings_survive_auth_changes() {
        let dir = tempfile::tempdir().unwrap();
        let options = ResolveOptions::default().with_temp_dir(dir.path());
        let mut cluster = KubeCluster::new("https://k8s:6443", &options, logger()).unwrap();
        assert_eq!(cluster.transport().verify, Verify::Platform);

        cluster.with_ca_certificate("c29tZS1jYQo=").unwrap();
        cluster.with_token("abc").unwrap();
        match &cluster.transport().verify {
            Verify::CaFile(path) => assert_eq!(fs::read_to_string(path).unwrap(), "some-ca\n"),
            other => panic!("unexpected verify: {:?}", other),
        }

        cluster.without_ssl_checks().unwrap();
        assert_eq!(cluster.transport().verify, Verify::Disabled);
        assert_eq!(cluster.auth().kind(), "bearer-token");
    }

    #[test]
    fn failed_reconfiguration_keeps_previous_transport() {
        let options = ResolveOptions::default();
        let mut cluster = KubeCluster::new("https://k8s:6443", &options, logger()).unwrap();
        cluster.with_token("abc").unwrap();

        let err = cluster.load_token_from_file("/no/such/token").unwrap_err();

        assert!(matches!(err, KubeConfigError::CredentialFileUnreadable { .. }));
        assert_eq!(
            cluster.transport().authorization.as_deref(),
            Some("Bearer abc")
        );
    }

    #[test]
    fn malformed_key_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let options = ResolveOptions::default().with_temp_dir(dir.path().join("material"));
        let mut cluster = KubeCluster::new("https://k8s:6443", &options, logger()).unwrap();

        let err = cluster
            .with_certificate("c29tZS1jZXJ0Cg==", "not base64!")
            .unwrap_err();

        assert!(matches!(err, KubeConfigError::MaterialDecode { .. }));
        assert!(!dir.path().join("material").exists());
        assert_eq!(cluster.auth(), &ResolvedAuth::None);
    }

    #[test]
    fn context_namespace_is_exposed() {
        let yaml = r#"
current-context: dev
clusters:
  - name: dev
    cluster: { server: "https://dev:6443" }
users:
  - name: dev
    user: {}
contexts:
  - name: dev
    context: { cluster: dev, user: dev, namespace: team-a }
"#;
        let cluster =
            KubeCluster::from_kubeconfig_yaml(yaml, None, &ResolveOptions::default(), logger())
                .unwrap();

        assert_eq!(cluster.namespace(), Some("team-a"));
        assert_eq!(cluster.url(), "https://dev:6443");
        assert_eq!(cluster.auth(), &ResolvedAuth::None);
    }
}
