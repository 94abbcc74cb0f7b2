use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminSession;
use crate::api::extractors::json::{AppJson, AppQuery};
use crate::api::dtos::{
    requests::{
        CreatePackageDefinitionRequest, CreatePackagePriceRequest, GrantPackageRequest, PriceListQuery,
        UpdatePackageDefinitionRequest, UpdatePackagePriceRequest,
    },
    responses::{DataResponse, MessageResponse},
};
use crate::api::handlers::conflict::non_blank;
use crate::domain::models::package::{calculated_amount, PackageDefinition, PackagePrice, PricingMode, UserPackage};
use crate::domain::services::validation::{is_valid_currency_code, require_non_blank};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

fn validate_definition(definition: &PackageDefinition) -> Result<(), AppError> {
    require_non_blank("name", &definition.name)?;
    if definition.sessions_count < 1 {
        return Err(AppError::Validation("sessionsCount must be at least 1".into()));
    }
    if definition.session_duration_min < 1 {
        return Err(AppError::Validation("sessionDurationMin must be at least 1".into()));
    }
    if definition.validity_days < 1 {
        return Err(AppError::Validation("validityDays must be at least 1".into()));
    }
    if definition.base_price_cents.is_some_and(|p| p < 0) {
        return Err(AppError::Validation("basePriceCents must not be negative".into()));
    }
    Ok(())
}

/// Custom prices take the given amount; calculated prices convert the definition's base price.
fn resolve_amount(
    definition: &PackageDefinition,
    mode: PricingMode,
    amount_cents: Option<i64>,
    exchange_rate: Option<f64>,
) -> Result<i64, AppError> {
    match mode {
        PricingMode::Custom => match amount_cents {
            Some(amount) if amount >= 0 => Ok(amount),
            _ => Err(AppError::Validation("amountCents is required for custom pricing and must not be negative".into())),
        },
        PricingMode::Calculated => {
            let base = definition.base_price_cents
                .ok_or_else(|| AppError::Validation("Calculated pricing requires a base price on the package".into()))?;
            let rate = exchange_rate
                .ok_or_else(|| AppError::Validation("exchangeRate is required for calculated pricing".into()))?;
            calculated_amount(base, rate)
                .ok_or_else(|| AppError::Validation("exchangeRate must be a positive number".into()))
        }
    }
}

fn normalize_currency(code: &str) -> Result<String, AppError> {
    let code = code.trim().to_uppercase();
    if !is_valid_currency_code(&code) {
        return Err(AppError::Validation(format!("Invalid currency code: {}", code)));
    }
    Ok(code)
}

pub async fn list_definitions(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(DataResponse::new(state.package_repo.list_definitions().await?)))
}

pub async fn create_definition(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    AppJson(payload): AppJson<CreatePackageDefinitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut definition = PackageDefinition::new(
        payload.name.trim().to_string(),
        payload.sessions_count,
        payload.session_duration_min,
        payload.validity_days,
    );
    definition.description = non_blank(payload.description);
    if let Some(package_type) = payload.package_type { definition.package_type = package_type; }
    definition.base_price_cents = payload.base_price_cents;
    definition.is_active = payload.is_active.unwrap_or(true);

    validate_definition(&definition)?;
    let created = state.package_repo.create_definition(&definition).await?;
    info!(definition_id = %created.id, sessions = created.sessions_count, "Created package {}", created.name);

    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

pub async fn get_definition(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let definition = state.package_repo.find_definition(&id).await?
        .ok_or(AppError::NotFound("Package definition not found".into()))?;
    Ok(Json(DataResponse::new(definition)))
}

pub async fn update_definition(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdatePackageDefinitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut definition = state.package_repo.find_definition(&id).await?
        .ok_or(AppError::NotFound("Package definition not found".into()))?;

    if let Some(name) = payload.name { definition.name = name.trim().to_string(); }
    if payload.description.is_some() { definition.description = non_blank(payload.description); }
    if let Some(count) = payload.sessions_count { definition.sessions_count = count; }
    if let Some(duration) = payload.session_duration_min { definition.session_duration_min = duration; }
    if let Some(package_type) = payload.package_type { definition.package_type = package_type; }
    if let Some(days) = payload.validity_days { definition.validity_days = days; }
    if payload.base_price_cents.is_some() { definition.base_price_cents = payload.base_price_cents; }
    if let Some(active) = payload.is_active { definition.is_active = active; }
    definition.updated_at = Utc::now();

    validate_definition(&definition)?;
    let updated = state.package_repo.update_definition(&definition).await?;
    info!(definition_id = %id, "Updated package definition");

    Ok(Json(DataResponse::new(updated)))
}

pub async fn delete_definition(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.package_repo.delete_definition(&id).await?;
    info!(definition_id = %id, "Deleted package definition");
    Ok(Json(MessageResponse::new("Package definition deleted")))
}

pub async fn list_prices(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    AppQuery(query): AppQuery<PriceListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let definition_id = non_blank(query.package_definition_id);
    Ok(Json(DataResponse::new(state.package_repo.list_prices(definition_id.as_deref()).await?)))
}

pub async fn create_price(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    AppJson(payload): AppJson<CreatePackagePriceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let currency = normalize_currency(&payload.currency_code)?;
    let definition = state.package_repo.find_definition(&payload.package_definition_id).await?
        .ok_or(AppError::NotFound("Package definition not found".into()))?;

    let amount = resolve_amount(&definition, payload.pricing_mode, payload.amount_cents, payload.exchange_rate)?;

    let mut price = PackagePrice::new(definition.id, currency, amount, payload.pricing_mode);
    if payload.pricing_mode == PricingMode::Calculated {
        price.exchange_rate = payload.exchange_rate;
    }
    price.is_active = payload.is_active.unwrap_or(true);

    let created = state.package_repo.create_price(&price).await?;
    info!(
        price_id = %created.id,
        currency = %created.currency_code,
        mode = created.pricing_mode.as_str(),
        "Created price {}",
        created.display_amount()
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

pub async fn get_price(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let price = state.package_repo.find_price(&id).await?
        .ok_or(AppError::NotFound("Package price not found".into()))?;
    Ok(Json(DataResponse::new(price)))
}

pub async fn update_price(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdatePackagePriceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut price = state.package_repo.find_price(&id).await?
        .ok_or(AppError::NotFound("Package price not found".into()))?;
    let definition = state.package_repo.find_definition(&price.package_definition_id).await?
        .ok_or(AppError::NotFound("Package definition not found".into()))?;

    if let Some(code) = payload.currency_code { price.currency_code = normalize_currency(&code)?; }
    if let Some(mode) = payload.pricing_mode { price.pricing_mode = mode; }
    if payload.exchange_rate.is_some() { price.exchange_rate = payload.exchange_rate; }
    if let Some(active) = payload.is_active { price.is_active = active; }

    let amount = payload.amount_cents.or(Some(price.amount_cents));
    price.amount_cents = resolve_amount(&definition, price.pricing_mode, amount, price.exchange_rate)?;
    if price.pricing_mode == PricingMode::Custom {
        price.exchange_rate = None;
    }
    price.updated_at = Utc::now();

    let updated = state.package_repo.update_price(&price).await?;
    info!(price_id = %id, "Updated package price");

    Ok(Json(DataResponse::new(updated)))
}

pub async fn delete_price(
    State(state): State<Arc<AppState>>,
    AdminSession(_session): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.package_repo.delete_price(&id).await?;
    info!(price_id = %id, "Deleted package price");
    Ok(Json(MessageResponse::new("Package price deleted")))
}

pub async fn grant_user_package(
    State(state): State<Arc<AppState>>,
    AdminSession(session): AdminSession,
    AppJson(payload): AppJson<GrantPackageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client = state.client_repo.find_by_id(&payload.user_id).await?
        .ok_or(AppError::NotFound("Client not found".into()))?;
    let definition = state.package_repo.find_definition(&payload.package_definition_id).await?
        .ok_or(AppError::NotFound("Package definition not found".into()))?;
    if !definition.is_active {
        return Err(AppError::Validation(format!("Package {} is not active", definition.name)));
    }

    let package = UserPackage::purchase(client.id, &definition);
    let created = state.client_repo.create_user_package(&package).await?;
    info!(
        admin = %session.user_id,
        user_package_id = %created.id,
        sessions = created.total_sessions,
        "Granted package {}",
        created.package_name
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}
