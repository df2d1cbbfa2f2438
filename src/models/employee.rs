use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub full_name: String,
    pub cpf: String,
    pub email: String,
    pub company_id: Uuid,
}

impl Employee {
    /// Finds an employee by their internal ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let employee = sqlx::query_as::<_, Self>(
            r#"
            SELECT id, full_name, cpf, email, company_id FROM employees WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(employee)
    }
}
