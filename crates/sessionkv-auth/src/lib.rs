//! # sessionkv-auth
//!
//! Storage-layer contracts consumed by an authentication / OAuth2 layer.
//!
//! ## Modules
//!
//! - `session`: Session lifecycle (create, save, load with expiry, delete,
//!   principal-name lookup, expired session sweep)
//! - `code`: Single-use authorization codes (store, redeem exactly once)

pub mod code;
pub mod session;

pub use code::{AuthorizationCodeStore, CodeGenerator};
pub use session::{
    CleanupReport, PrincipalNameResolver, SecurityContextPrincipalResolver, Session,
    SessionRepository,
};
