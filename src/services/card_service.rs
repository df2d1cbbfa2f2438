use std::sync::Arc;

use chrono::Utc;
use ring::rand::SystemRandom;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::card::{Card, CardType, NewCard};
use crate::services::card_factory;
use crate::services::card_repository::CardRepository;
use crate::services::company::CompanyAuthorizer;
use crate::services::crypto::SecretHasher;
use crate::services::employee::EmployeeDirectory;

const PASSWORD_LEN: usize = 4;

/// Issuance details handed back to the caller.
///
/// This is the only place the plaintext security code ever appears; the
/// stored card keeps its hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedCard {
    pub id: Uuid,
    pub number: String,
    pub cardholder_name: String,
    pub security_code: String,
    pub expiration_date: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
}

/// Card lifecycle rules: issuance, activation, blocking
pub struct CardService {
    companies: Arc<dyn CompanyAuthorizer>,
    employees: Arc<dyn EmployeeDirectory>,
    cards: Arc<dyn CardRepository>,
    hasher: Arc<dyn SecretHasher>,
    rng: SystemRandom,
}

impl CardService {
    pub fn new(
        companies: Arc<dyn CompanyAuthorizer>,
        employees: Arc<dyn EmployeeDirectory>,
        cards: Arc<dyn CardRepository>,
        hasher: Arc<dyn SecretHasher>,
    ) -> Self {
        Self {
            companies,
            employees,
            cards,
            hasher,
            rng: SystemRandom::new(),
        }
    }

    /// Issues a new card of `card_type` to an employee.
    ///
    /// An employee holds at most one card per type; a second request fails
    /// with `Conflict` before anything is written.
    #[tracing::instrument(skip_all, fields(employee_id = %employee_id, card_type = %card_type))]
    pub async fn create(
        &self,
        company_api_key: &str,
        employee_id: Uuid,
        card_type: CardType,
    ) -> Result<IssuedCard> {
        self.companies
            .validate_api_key_or_fail(company_api_key)
            .await?;

        let employee = self.employees.get_employee_by_id(employee_id).await?;

        if self
            .cards
            .find_by_type_and_employee_id(card_type, employee.id)
            .await?
            .is_some()
        {
            tracing::warn!("Employee already holds a card of this type");
            return Err(AppError::conflict(format!(
                "Employee already has a {} card",
                card_type
            )));
        }

        let number = card_factory::generate_card_number(&self.rng)?;
        let security_code = card_factory::generate_security_code(&self.rng)?;
        let cardholder_name = card_factory::cardholder_name(&employee.full_name);
        let expiration_date = card_factory::expiration_date(Utc::now());

        let card = self
            .cards
            .insert(NewCard {
                employee_id: employee.id,
                number: number.clone(),
                cardholder_name: cardholder_name.clone(),
                security_code: self.hasher.hash(&security_code)?,
                expiration_date: expiration_date.clone(),
                is_virtual: false,
                is_blocked: false,
                card_type,
            })
            .await?;

        tracing::info!(card_id = %card.id, expiration_date = %expiration_date, "Card created");

        Ok(IssuedCard {
            id: card.id,
            number,
            cardholder_name,
            security_code,
            expiration_date,
            card_type,
        })
    }

    /// Activates a card by setting its password.
    ///
    /// Checks run in order: card exists, not yet active, not expired,
    /// password is four digits, security code matches.
    #[tracing::instrument(skip_all, fields(card_id = %card_id))]
    pub async fn activate(&self, card_id: Uuid, security_code: &str, password: &str) -> Result<()> {
        let card = self.find_card_or_fail(card_id).await?;

        if card.is_active() {
            tracing::warn!("Activation attempted on an active card");
            return Err(AppError::bad_request("Card is already active"));
        }

        if card_factory::is_expired(&card.expiration_date, Utc::now()) {
            return Err(AppError::bad_request("Card is expired"));
        }

        if !is_valid_password_format(password) {
            return Err(AppError::bad_request("Password must be exactly 4 digits"));
        }

        if !self.hasher.verify(security_code, &card.security_code) {
            tracing::warn!("Security code mismatch");
            return Err(AppError::unauthorized("Invalid security code"));
        }

        let password_hash = self.hasher.hash(password)?;
        // Guarded write: a concurrent activation that got here first wins
        self.cards.activate(card.id, &password_hash).await?;

        tracing::info!("Card activated");

        Ok(())
    }

    /// Fails with `Unauthorized` unless `plaintext` matches `hash`
    pub fn validate_password_or_fail(&self, plaintext: &str, hash: &str) -> Result<()> {
        if self.hasher.verify(plaintext, hash) {
            Ok(())
        } else {
            Err(AppError::unauthorized("Invalid password"))
        }
    }

    #[tracing::instrument(skip_all, fields(card_id = %card_id))]
    pub async fn block(&self, card_id: Uuid, password: &str) -> Result<()> {
        self.set_blocked(card_id, password, true).await
    }

    #[tracing::instrument(skip_all, fields(card_id = %card_id))]
    pub async fn unblock(&self, card_id: Uuid, password: &str) -> Result<()> {
        self.set_blocked(card_id, password, false).await
    }

    async fn set_blocked(&self, card_id: Uuid, password: &str, blocked: bool) -> Result<()> {
        let mut card = self.find_card_or_fail(card_id).await?;

        let stored_password = card
            .password
            .clone()
            .ok_or_else(|| AppError::bad_request("Card is not active"))?;

        if card_factory::is_expired(&card.expiration_date, Utc::now()) {
            return Err(AppError::bad_request("Card is expired"));
        }

        if card.is_blocked == blocked {
            return Err(AppError::conflict(if blocked {
                "Card is already blocked"
            } else {
                "Card is not blocked"
            }));
        }

        self.validate_password_or_fail(password, &stored_password)?;

        card.is_blocked = blocked;
        self.cards.update(&card).await?;

        tracing::info!(is_blocked = blocked, "Card block state changed");

        Ok(())
    }

    async fn find_card_or_fail(&self, card_id: Uuid) -> Result<Card> {
        self.cards
            .find_by_id(card_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Card {} not found", card_id)))
    }
}

fn is_valid_password_format(password: &str) -> bool {
    password.len() == PASSWORD_LEN && password.bytes().all(|b| b.is_ascii_digit())
}
