//! Store and redeem-once semantics for authorization codes.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use sessionkv_core::config::AuthorizationCodeConfig;
use sessionkv_core::error::AppError;
use sessionkv_core::result::AppResult;
use sessionkv_core::traits::ReadConsistency;
use sessionkv_entity::code::{AuthorizationCodeRecord, CODE_INDEX};
use sessionkv_store::RecordMapper;

use super::generator::CodeGenerator;

/// Issues and redeems single-use authorization codes.
///
/// Code values are secrets and are never logged.
#[derive(Debug, Clone)]
pub struct AuthorizationCodeStore {
    /// Typed record store.
    mapper: Arc<RecordMapper>,
    /// Generator for [`AuthorizationCodeStore::create_authorization_code`].
    generator: CodeGenerator,
}

impl AuthorizationCodeStore {
    /// Creates a store issuing codes of the default length.
    pub fn new(mapper: Arc<RecordMapper>) -> Self {
        Self {
            mapper,
            generator: CodeGenerator::default(),
        }
    }

    /// Creates a store from configuration.
    pub fn from_config(mapper: Arc<RecordMapper>, config: &AuthorizationCodeConfig) -> AppResult<Self> {
        Ok(Self {
            mapper,
            generator: CodeGenerator::new(config.code_length)?,
        })
    }

    /// Serializes `authentication` and stores it under `code`.
    ///
    /// Storing the same code twice overwrites the first record.
    pub async fn store<A>(&self, code: &str, authentication: &A) -> AppResult<()>
    where
        A: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(authentication)?;
        let record = AuthorizationCodeRecord::new(code, payload);
        self.mapper
            .save_indexed(&record, [(CODE_INDEX.to_string(), code.to_string())])
            .await?;

        debug!("Stored authorization code");
        Ok(())
    }

    /// Redeems a code, returning the authentication stored with it.
    ///
    /// Returns `Ok(None)` for a code that was never stored, was already
    /// redeemed, or was redeemed concurrently by another caller. The record
    /// is gone before a successful call returns. More than one record for
    /// the code is an integrity violation and fails without deleting
    /// anything.
    pub async fn redeem<A>(&self, code: &str) -> AppResult<Option<A>>
    where
        A: DeserializeOwned,
    {
        let mut matches: Vec<AuthorizationCodeRecord> = self
            .mapper
            .query(CODE_INDEX, code, ReadConsistency::Consistent)
            .await?;

        let record = match matches.len() {
            0 => return Ok(None),
            1 => matches.swap_remove(0),
            count => {
                error!(count, "Duplicate authorization code records detected");
                return Err(AppError::integrity_violation(format!(
                    "Found {count} records for a single authorization code"
                )));
            }
        };

        if !self.mapper.delete_if_exists(&record).await? {
            debug!("Authorization code was redeemed concurrently");
            return Ok(None);
        }

        let authentication = serde_json::from_slice(&record.authentication)?;
        debug!("Redeemed authorization code");
        Ok(Some(authentication))
    }

    /// Generates a fresh code, stores `authentication` under it and
    /// returns the code.
    pub async fn create_authorization_code<A>(&self, authentication: &A) -> AppResult<String>
    where
        A: Serialize + ?Sized,
    {
        let code = self.generator.generate();
        self.store(&code, authentication).await?;
        Ok(code)
    }

    /// Redeems a code, treating an unknown or used code as an invalid grant.
    pub async fn consume_authorization_code<A>(&self, code: &str) -> AppResult<A>
    where
        A: DeserializeOwned,
    {
        self.redeem(code)
            .await?
            .ok_or_else(|| AppError::invalid_grant(format!("Invalid authorization code: {code}")))
    }
}
