//! The authentication restored when an authorization code is redeemed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Authentication captured at the authorization endpoint and handed back
/// at the token endpoint.
///
/// The code store treats this as opaque; any serde type can be stored in
/// its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationContext {
    /// Name of the authenticated user.
    pub principal: String,
    /// OAuth2 client the code was issued to.
    pub client_id: String,
    /// Approved scopes.
    #[serde(default)]
    pub scopes: BTreeSet<String>,
    /// Authorities granted to the user.
    #[serde(default)]
    pub authorities: BTreeSet<String>,
    /// Redirect URI presented with the authorization request.
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Whether the user approved the request.
    #[serde(default)]
    pub approved: bool,
    /// Additional request parameters.
    #[serde(default)]
    pub extensions: BTreeMap<String, String>,
}

impl AuthenticationContext {
    /// An approved authentication with no scopes or authorities.
    pub fn new(principal: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            client_id: client_id.into(),
            scopes: BTreeSet::new(),
            authorities: BTreeSet::new(),
            redirect_uri: None,
            approved: true,
            extensions: BTreeMap::new(),
        }
    }

    /// Add a scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.insert(scope.into());
        self
    }

    /// Add an authority.
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authorities.insert(authority.into());
        self
    }

    /// Set the redirect URI.
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }
}
