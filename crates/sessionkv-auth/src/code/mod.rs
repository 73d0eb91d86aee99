//! Single-use authorization codes.

pub mod generator;
pub mod store;

pub use generator::CodeGenerator;
pub use store::AuthorizationCodeStore;
