// src/material/mod.rs
mod store;

pub use store::{MaterialKind, MaterialSource, MaterialStore};
