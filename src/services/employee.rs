use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::employee::Employee;

/// Read-only access to the employee directory
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Fails with `NotFound` when the employee does not exist
    async fn get_employee_by_id(&self, id: Uuid) -> Result<Employee>;
}

pub struct PgEmployeeDirectory {
    pool: PgPool,
}

impl PgEmployeeDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeDirectory for PgEmployeeDirectory {
    async fn get_employee_by_id(&self, id: Uuid) -> Result<Employee> {
        Employee::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Employee {} not found", id)))
    }
}
