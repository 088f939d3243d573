//! Service layer holding the authentication business logic.
//! - Independent of the web framework; the server crate maps results to HTTP.
//! - Persistence goes through the `AuthRepository` trait (SeaORM or in-memory).
//! - Errors are typed per workflow in `auth::errors`.

pub mod auth;
#[cfg(test)]
pub mod test_support;
