//! Principal name resolution for the session secondary index.

use std::collections::HashMap;

use serde_json::Value;

/// Secondary index over resolved principal names. Also the attribute name
/// under which an already-resolved principal name may be stored.
pub const PRINCIPAL_NAME_INDEX_NAME: &str = "principal_name";

/// Attribute holding the serialized security context of an authenticated
/// session.
pub const SECURITY_CONTEXT_ATTRIBUTE: &str = "SECURITY_CONTEXT";

/// Produces the principal name a session is indexed under, if any.
pub trait PrincipalNameResolver: Send + Sync + 'static {
    /// Resolve a principal name from a session's attributes.
    fn resolve(&self, attributes: &HashMap<String, Value>) -> Option<String>;
}

impl<F> PrincipalNameResolver for F
where
    F: Fn(&HashMap<String, Value>) -> Option<String> + Send + Sync + 'static,
{
    fn resolve(&self, attributes: &HashMap<String, Value>) -> Option<String> {
        self(attributes)
    }
}

/// Default resolver.
///
/// A string held in the [`PRINCIPAL_NAME_INDEX_NAME`] attribute is a
/// previously resolved name and is used verbatim. Otherwise the name is
/// read from `authentication.name` inside the [`SECURITY_CONTEXT_ATTRIBUTE`]
/// attribute, where only a non-empty string counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityContextPrincipalResolver;

impl PrincipalNameResolver for SecurityContextPrincipalResolver {
    fn resolve(&self, attributes: &HashMap<String, Value>) -> Option<String> {
        if let Some(name) = attributes
            .get(PRINCIPAL_NAME_INDEX_NAME)
            .and_then(Value::as_str)
        {
            return Some(name.to_string());
        }

        attributes
            .get(SECURITY_CONTEXT_ATTRIBUTE)
            .and_then(|context| context.pointer("/authentication/name"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}
