use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminSession;
use crate::api::extractors::json::{AppJson, AppQuery};
use crate::api::dtos::{
    requests::{ClientListQuery, CreateClientRequest},
    responses::{ClientListItem, DataResponse},
};
use crate::api::handlers::conflict::non_blank;
use crate::domain::models::client::{Client, ClientSummary};
use crate::domain::services::validation::{is_valid_email, require_non_blank};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    AppQuery(query): AppQuery<ClientListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let search = non_blank(query.search);
    let clients: Vec<ClientListItem> = state.client_repo.list(search.as_deref()).await?
        .into_iter()
        .map(ClientListItem::from)
        .collect();
    Ok(Json(DataResponse::new(clients)))
}

pub async fn create_client(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    AppJson(payload): AppJson<CreateClientRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_non_blank("name", &payload.name)?;
    if !is_valid_email(&payload.email) {
        return Err(AppError::Validation(format!("Invalid email address: {}", payload.email)));
    }

    let mut client = Client::new(payload.name.trim().to_string(), payload.email);
    client.phone = non_blank(payload.phone);
    client.birth_date = payload.birth_date;
    client.birth_place = non_blank(payload.birth_place);
    if let Some(status) = payload.status { client.status = status; }

    let created = state.client_repo.create(&client).await?;
    info!(client_id = %created.id, "Created client {}", created.email);

    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

pub async fn client_summary(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let client = state.client_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Client not found".into()))?;
    let booking_count = state.client_repo.booking_count(&id).await?;
    let packages = state.client_repo.list_user_packages(&id).await?
        .iter()
        .map(|p| p.summary())
        .collect();

    Ok(Json(DataResponse::new(ClientSummary {
        client,
        booking_count,
        is_recurrent: booking_count > 1,
        packages,
    })))
}
