// src/auth/mod.rs
mod in_cluster;
mod selector;

pub use in_cluster::{from_in_cluster_environment, ServiceAccountMount, SERVICE_ACCOUNT_DIR};
pub use selector::{from_basic_auth, from_bearer_token_file, select_auth, ResolvedAuth};
