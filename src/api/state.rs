use std::sync::Arc;

use crate::services::card_service::CardService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub card_service: Arc<CardService>,
}

impl AppState {
    pub fn new(card_service: CardService) -> Self {
        Self {
            card_service: Arc::new(card_service),
        }
    }
}
