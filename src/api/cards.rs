use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::api_key::CompanyApiKey;
use crate::api::state::AppState;
use crate::error::AppError;
use crate::models::card::CardType;
use crate::services::card_service::IssuedCard;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCardRequest {
    employee_id: Uuid,
    #[serde(rename = "type")]
    card_type: CardType,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivateCardRequest {
    security_code: String,
    password: String,
}

#[derive(Deserialize)]
struct CardPasswordRequest {
    password: String,
}

/// Issues a card to one of the calling company's employees
async fn create_card(
    State(state): State<AppState>,
    CompanyApiKey(api_key): CompanyApiKey,
    Json(body): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<IssuedCard>), AppError> {
    let issued = state
        .card_service
        .create(&api_key, body.employee_id, body.card_type)
        .await?;

    Ok((StatusCode::CREATED, Json(issued)))
}

async fn activate_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(body): Json<ActivateCardRequest>,
) -> Result<StatusCode, AppError> {
    state
        .card_service
        .activate(card_id, &body.security_code, &body.password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn block_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(body): Json<CardPasswordRequest>,
) -> Result<StatusCode, AppError> {
    state.card_service.block(card_id, &body.password).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unblock_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(body): Json<CardPasswordRequest>,
) -> Result<StatusCode, AppError> {
    state.card_service.unblock(card_id, &body.password).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cards", post(create_card))
        .route("/cards/:id/activate", post(activate_card))
        .route("/cards/:id/block", post(block_card))
        .route("/cards/:id/unblock", post(unblock_card))
}
