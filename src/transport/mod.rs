// src/transport/mod.rs
mod builder;
mod options;

pub use builder::{build, TransportConfig, Verify};
pub use options::{ClientHeaders, ClientOptions, VerifyOption};
