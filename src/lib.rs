//! Resolves kubeconfig documents and in-cluster service accounts into
//! HTTP transport settings: base URL, TLS material and one auth mechanism.

pub mod auth;
pub mod cluster;
pub mod error;
pub mod kubeconfig;
pub mod material;
pub mod settings;
pub mod transport;
pub mod utils;

pub use auth::ResolvedAuth;
pub use cluster::KubeCluster;
pub use error::{KubeConfigError, Result};
pub use kubeconfig::{KubeConfig, ResolvedContext};
pub use material::MaterialStore;
pub use settings::ResolveOptions;
pub use transport::{ClientOptions, TransportConfig};
