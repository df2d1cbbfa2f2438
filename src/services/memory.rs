//! In-memory collaborators
//!
//! Back the card service without a database, for tests and local runs.
//! The card repository counts writes so callers can assert how many
//! inserts and updates (activations included) an operation performed.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::card::{Card, CardType, NewCard};
use crate::models::employee::Employee;
use crate::services::card_repository::CardRepository;
use crate::services::company::CompanyAuthorizer;
use crate::services::employee::EmployeeDirectory;

#[derive(Default)]
pub struct InMemoryCardRepository {
    cards: Mutex<HashMap<Uuid, Card>>,
    insert_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl InMemoryCardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository without counting the writes
    pub fn with_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let cards = cards.into_iter().map(|card| (card.id, card)).collect();
        Self {
            cards: Mutex::new(cards),
            ..Self::default()
        }
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Current stored state of a card
    pub async fn get(&self, id: Uuid) -> Option<Card> {
        self.cards.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl CardRepository for InMemoryCardRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>> {
        Ok(self.cards.lock().await.get(&id).cloned())
    }

    async fn find_by_type_and_employee_id(
        &self,
        card_type: CardType,
        employee_id: Uuid,
    ) -> Result<Option<Card>> {
        Ok(self
            .cards
            .lock()
            .await
            .values()
            .find(|card| card.card_type == card_type && card.employee_id == employee_id)
            .cloned())
    }

    async fn insert(&self, card: NewCard) -> Result<Card> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        let card = Card {
            id: Uuid::new_v4(),
            employee_id: card.employee_id,
            number: card.number,
            cardholder_name: card.cardholder_name,
            security_code: card.security_code,
            expiration_date: card.expiration_date,
            password: None,
            is_virtual: card.is_virtual,
            is_blocked: card.is_blocked,
            card_type: card.card_type,
            issued_at: Utc::now(),
        };

        self.cards.lock().await.insert(card.id, card.clone());
        Ok(card)
    }

    async fn activate(&self, id: Uuid, password_hash: &str) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let mut cards = self.cards.lock().await;
        let stored = cards
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Card {} not found", id)))?;

        if stored.password.is_some() {
            return Err(AppError::bad_request("Card is already active"));
        }
        stored.password = Some(password_hash.to_string());

        Ok(())
    }

    async fn update(&self, card: &Card) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let mut cards = self.cards.lock().await;
        let stored = cards
            .get_mut(&card.id)
            .ok_or_else(|| AppError::not_found(format!("Card {} not found", card.id)))?;
        stored.is_blocked = card.is_blocked;
        stored.is_virtual = card.is_virtual;

        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryEmployeeDirectory {
    employees: HashMap<Uuid, Employee>,
}

impl InMemoryEmployeeDirectory {
    pub fn new(employees: impl IntoIterator<Item = Employee>) -> Self {
        Self {
            employees: employees.into_iter().map(|e| (e.id, e)).collect(),
        }
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryEmployeeDirectory {
    async fn get_employee_by_id(&self, id: Uuid) -> Result<Employee> {
        self.employees
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Employee {} not found", id)))
    }
}

#[derive(Default)]
pub struct InMemoryCompanyAuthorizer {
    api_keys: HashSet<String>,
}

impl InMemoryCompanyAuthorizer {
    pub fn new<I, S>(api_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            api_keys: api_keys.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl CompanyAuthorizer for InMemoryCompanyAuthorizer {
    async fn validate_api_key_or_fail(&self, api_key: &str) -> Result<()> {
        if self.api_keys.contains(api_key) {
            Ok(())
        } else {
            Err(AppError::unauthorized("Invalid API key"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_card() -> NewCard {
        NewCard {
            employee_id: Uuid::new_v4(),
            number: "5105105105105100".to_string(),
            cardholder_name: "FULANO R SILVA".to_string(),
            security_code: "hashed:123".to_string(),
            expiration_date: "01/40".to_string(),
            is_virtual: false,
            is_blocked: false,
            card_type: CardType::Health,
        }
    }

    #[tokio::test]
    async fn test_activate_only_sets_password_once() {
        let repo = InMemoryCardRepository::new();
        let card = repo.insert(new_card()).await.unwrap();

        repo.activate(card.id, "first").await.unwrap();
        let err = repo.activate(card.id, "second").await.unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::BadRequest);
        assert_eq!(repo.get(card.id).await.unwrap().password.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_update_keeps_password() {
        let repo = InMemoryCardRepository::new();
        let card = repo.insert(new_card()).await.unwrap();
        repo.activate(card.id, "hash").await.unwrap();

        // A stale copy read before activation must not clear the password
        let stale = Card {
            is_blocked: true,
            ..card
        };
        repo.update(&stale).await.unwrap();

        let stored = repo.get(stale.id).await.unwrap();
        assert!(stored.is_blocked);
        assert_eq!(stored.password.as_deref(), Some("hash"));
    }

    #[tokio::test]
    async fn test_writes_to_missing_card_are_not_found() {
        let repo = InMemoryCardRepository::new();
        let card = repo.insert(new_card()).await.unwrap();
        let missing = Card {
            id: Uuid::new_v4(),
            ..card
        };

        let err = repo.update(&missing).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);

        let err = repo.activate(missing.id, "hash").await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }
}
