use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, Result};
use crate::models::company::Company;

/// Authenticates the company behind a request
#[async_trait]
pub trait CompanyAuthorizer: Send + Sync {
    /// Fails with `Unauthorized` when no company owns the key
    async fn validate_api_key_or_fail(&self, api_key: &str) -> Result<()>;
}

pub struct PgCompanyAuthorizer {
    pool: PgPool,
}

impl PgCompanyAuthorizer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyAuthorizer for PgCompanyAuthorizer {
    async fn validate_api_key_or_fail(&self, api_key: &str) -> Result<()> {
        let company = Company::find_by_api_key(&self.pool, api_key)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid API key"))?;

        tracing::debug!(company_id = %company.id, "API key accepted");

        Ok(())
    }
}
