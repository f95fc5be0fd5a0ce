// src/transport/options.rs
use serde::Serialize;
use std::path::Path;

use super::builder::{TransportConfig, Verify};
use crate::error::{KubeConfigError, Result};

/// Request options in the shape HTTP client libraries take them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientOptions {
    pub base_uri: String,
    pub verify: VerifyOption,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<[String; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<ClientHeaders>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VerifyOption {
    Enabled(bool),
    CaPath(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientHeaders {
    pub authorization: String,
}

fn path_string(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| KubeConfigError::NonUtf8Path(path.to_path_buf()))
}

impl TryFrom<&TransportConfig> for ClientOptions {
    type Error = KubeConfigError;

    /// Fails on paths that are not valid UTF-8 rather than handing the
    /// client a lossy rendering of them.
    fn try_from(config: &TransportConfig) -> Result<Self> {
        let verify = match &config.verify {
            Verify::Disabled => VerifyOption::Enabled(false),
            Verify::Platform => VerifyOption::Enabled(true),
            Verify::CaFile(path) => VerifyOption::CaPath(path_string(path)?),
        };

        Ok(ClientOptions {
            base_uri: config.base_url.clone(),
            verify,
            cert: config.cert_path.as_deref().map(path_string).transpose()?,
            ssl_key: config.key_path.as_deref().map(path_string).transpose()?,
            auth: config
                .basic_auth
                .as_ref()
                .map(|(user, password)| [user.clone(), password.clone()]),
            headers: config
                .authorization
                .as_ref()
                .map(|authorization| ClientHeaders {
                    authorization: authorization.clone(),
                }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unused_auth_fields_are_omitted() {
        let config = TransportConfig {
            base_url: "https://k8s:6443".to_string(),
            verify: Verify::CaFile("/ca.crt".into()),
            cert_path: None,
            key_path: None,
            authorization: Some("Bearer abc".to_string()),
            basic_auth: None,
        };

        let value = serde_json::to_value(ClientOptions::try_from(&config).unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "base_uri": "https://k8s:6443",
                "verify": "/ca.crt",
                "headers": { "authorization": "Bearer abc" }
            })
        );
    }

    #[test]
    fn verify_flag_and_basic_auth_pair() {
        let config = TransportConfig {
            base_url: "https://k8s".to_string(),
            verify: Verify::Disabled,
            cert_path: None,
            key_path: None,
            authorization: None,
            basic_auth: Some(("some-user".to_string(), "some-password".to_string())),
        };

        let value = serde_json::to_value(ClientOptions::try_from(&config).unwrap()).unwrap();

        assert_eq!(value["verify"], json!(false));
        assert_eq!(value["auth"], json!(["some-user", "some-password"]));
        assert!(value.get("cert").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_are_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        use std::path::PathBuf;

        let bad = PathBuf::from(OsStr::from_bytes(&[b'/', 0xff, b'.', b'p', b'e', b'm']));
        let config = TransportConfig {
            base_url: "https://k8s".to_string(),
            verify: Verify::Platform,
            cert_path: Some(bad.clone()),
            key_path: Some("/client.key".into()),
            authorization: None,
            basic_auth: None,
        };

        match ClientOptions::try_from(&config) {
            Err(KubeConfigError::NonUtf8Path(path)) => assert_eq!(path, bad),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
