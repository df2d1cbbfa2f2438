use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Benefit category a card can be spent on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "card_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Groceries,
    Restaurant,
    Transport,
    Education,
    Health,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Groceries => "groceries",
            CardType::Restaurant => "restaurant",
            CardType::Transport => "transport",
            CardType::Education => "education",
            CardType::Health => "health",
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub number: String,
    pub cardholder_name: String,
    #[serde(skip_serializing)]
    pub security_code: String, // argon2 hash
    pub expiration_date: String, // MM/YY
    #[serde(skip_serializing)]
    pub password: Option<String>, // argon2 hash, set on activation
    pub is_virtual: bool,
    pub is_blocked: bool,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub issued_at: DateTime<Utc>,
}

impl Card {
    pub fn is_active(&self) -> bool {
        self.password.is_some()
    }
}

/// Card fields known before the row exists
#[derive(Debug, Clone)]
pub struct NewCard {
    pub employee_id: Uuid,
    pub number: String,
    pub cardholder_name: String,
    pub security_code: String,
    pub expiration_date: String,
    pub is_virtual: bool,
    pub is_blocked: bool,
    pub card_type: CardType,
}

impl Card {
    /// Inserts a card and returns the stored row
    pub async fn create(pool: &PgPool, data: NewCard) -> Result<Self, sqlx::Error> {
        let card = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO cards (
                employee_id, number, cardholder_name, security_code,
                expiration_date, is_virtual, is_blocked, type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(data.employee_id)
        .bind(&data.number)
        .bind(&data.cardholder_name)
        .bind(&data.security_code)
        .bind(&data.expiration_date)
        .bind(data.is_virtual)
        .bind(data.is_blocked)
        .bind(data.card_type)
        .fetch_one(pool)
        .await?;

        Ok(card)
    }

    /// Finds a card by its ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let card = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM cards WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(card)
    }

    /// Finds the card of a given type held by an employee
    pub async fn find_by_type_and_employee_id(
        pool: &PgPool,
        card_type: CardType,
        employee_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let card = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM cards
            WHERE type = $1 AND employee_id = $2
            LIMIT 1
            "#,
        )
        .bind(card_type)
        .bind(employee_id)
        .fetch_optional(pool)
        .await?;

        Ok(card)
    }

    /// Sets the password of a card that has none yet.
    ///
    /// Returns the number of rows changed: zero when the card is missing or
    /// was activated first by someone else.
    pub async fn activate(pool: &PgPool, id: Uuid, password: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE cards
            SET password = $2
            WHERE id = $1 AND password IS NULL
            "#,
        )
        .bind(id)
        .bind(password)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Writes back the block and virtual flags; the password is only ever
    /// written by `activate`
    pub async fn update(pool: &PgPool, card: &Card) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE cards
            SET is_blocked = $2, is_virtual = $3
            WHERE id = $1
            "#,
        )
        .bind(card.id)
        .bind(card.is_blocked)
        .bind(card.is_virtual)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
