//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and token-based lookups live here, together with the
//! password hashing and JWT helpers they depend on.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod repo;
pub mod service;
pub mod token;

pub use service::{AuthConfig, AuthService};
