//! Authorization code records and the authentication context they carry.

pub mod context;
pub mod model;

pub use context::AuthenticationContext;
pub use model::{AUTHORIZATION_CODE_TABLE, AuthorizationCodeRecord, CODE_INDEX};
