//! # REST API for the Point Shop Catalogue

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::info;

use crate::domain::CoreError;
use crate::io::rest::desk_session;
use crate::io::rest::mappers::redemption_mapper::RedemptionMapper;
use crate::AppState;
use shared::{CreateShopItemRequest, ShopItemListResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/items", get(list_items).post(create_item))
}

pub async fn list_items(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ShopItemListResponse>, CoreError> {
    info!("GET /api/shop/items");

    desk_session(&headers, &state).require_open()?;
    let items = state.redemption_service.list_items().await?;
    Ok(Json(ShopItemListResponse {
        items: items.into_iter().map(RedemptionMapper::item_to_dto).collect(),
    }))
}

/// Add a catalogue item. Guarded by the admin secret only.
pub async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<CreateShopItemRequest>,
) -> Result<impl IntoResponse, CoreError> {
    info!("POST /api/shop/items - name: {}, cost: {}", request.name, request.cost);

    let command = RedemptionMapper::create_item_command(request);
    let item = state.redemption_service.create_item(command).await?;
    Ok((StatusCode::CREATED, Json(RedemptionMapper::item_to_dto(item))))
}
