// src/config/mod.rs
pub mod lookup;

pub use lookup::{Credentials, Endpoints, LookupConfig, ProviderKind};
