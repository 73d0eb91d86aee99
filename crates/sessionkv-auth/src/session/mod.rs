//! Session lifecycle management including creation, save, expiry and sweep.

pub mod cleanup;
pub mod repository;
pub mod resolver;
pub mod state;

pub use cleanup::CleanupReport;
pub use repository::SessionRepository;
pub use resolver::{
    PRINCIPAL_NAME_INDEX_NAME, PrincipalNameResolver, SECURITY_CONTEXT_ATTRIBUTE,
    SecurityContextPrincipalResolver,
};
pub use state::Session;
