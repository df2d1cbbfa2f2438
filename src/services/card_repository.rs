use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::card::{Card, CardType, NewCard};

/// Persistence operations the card service relies on
#[async_trait]
pub trait CardRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>>;

    async fn find_by_type_and_employee_id(
        &self,
        card_type: CardType,
        employee_id: Uuid,
    ) -> Result<Option<Card>>;

    /// Stores a new card; the repository assigns its ID
    async fn insert(&self, card: NewCard) -> Result<Card>;

    /// Sets the password of a card that has none yet; fails with
    /// `BadRequest` when the card already has one
    async fn activate(&self, id: Uuid, password_hash: &str) -> Result<()>;

    /// Writes back the card flags; fails with `NotFound` for a missing card
    async fn update(&self, card: &Card) -> Result<()>;
}

pub struct PgCardRepository {
    pool: PgPool,
}

impl PgCardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CardRepository for PgCardRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>> {
        Ok(Card::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_type_and_employee_id(
        &self,
        card_type: CardType,
        employee_id: Uuid,
    ) -> Result<Option<Card>> {
        Ok(Card::find_by_type_and_employee_id(&self.pool, card_type, employee_id).await?)
    }

    async fn insert(&self, card: NewCard) -> Result<Card> {
        Ok(Card::create(&self.pool, card).await?)
    }

    async fn activate(&self, id: Uuid, password_hash: &str) -> Result<()> {
        if Card::activate(&self.pool, id, password_hash).await? == 1 {
            return Ok(());
        }

        match Card::find_by_id(&self.pool, id).await? {
            Some(_) => Err(AppError::bad_request("Card is already active")),
            None => Err(AppError::not_found(format!("Card {} not found", id))),
        }
    }

    async fn update(&self, card: &Card) -> Result<()> {
        match Card::update(&self.pool, card).await? {
            0 => Err(AppError::not_found(format!("Card {} not found", card.id))),
            _ => Ok(()),
        }
    }
}
