// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Inventory item API endpoints.
//!
//! Every endpoint requires a bearer token. Items are always scoped to the
//! caller's owner id; another owner's items are indistinguishable from
//! missing ones.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::IntoParams;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{
    auth::Auth,
    error::ApiError,
    inventory::{BulkImporter, InventoryStore},
    models::{
        CreateItemResponse, DeleteItemResponse, ImportBatch, ImportResponse, InventoryItem,
        ItemFields, NextIdResponse,
    },
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive substring of the item name
    pub name: String,
}

/// List the caller's items, ascending by id.
#[utoipa::path(
    get,
    path = "/v1/items",
    tag = "Items",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Decrypted items", body = [InventoryItem]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Stored data failed integrity check")
    )
)]
pub async fn list_items(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    let store = InventoryStore::new(&state.db, &state.cipher);
    Ok(Json(store.list(&user.user_id)?))
}

/// Create an item with the next free id.
#[utoipa::path(
    post,
    path = "/v1/items",
    tag = "Items",
    security(("bearer_auth" = [])),
    request_body = ItemFields,
    responses(
        (status = 201, description = "Item created", body = CreateItemResponse),
        (status = 400, description = "Invalid item"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Id allocated concurrently, retry")
    )
)]
pub async fn create_item(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(fields): ApiJson<ItemFields>,
) -> Result<(StatusCode, Json<CreateItemResponse>), ApiError> {
    let store = InventoryStore::new(&state.db, &state.cipher);
    let id = store.create(&user.user_id, &fields)?;

    let response = CreateItemResponse {
        message: "Item created successfully".to_string(),
        id,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Replace an item, creating it if the id is unused.
#[utoipa::path(
    put,
    path = "/v1/items/{id}",
    tag = "Items",
    security(("bearer_auth" = [])),
    params(("id" = u64, Path, description = "Item id within the caller's inventory")),
    request_body = ItemFields,
    responses(
        (status = 200, description = "Item as stored", body = InventoryItem),
        (status = 400, description = "Invalid item"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_item(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
    ApiJson(fields): ApiJson<ItemFields>,
) -> Result<Json<InventoryItem>, ApiError> {
    let store = InventoryStore::new(&state.db, &state.cipher);
    Ok(Json(store.update(&user.user_id, id, &fields)?))
}

/// Delete one of the caller's items.
#[utoipa::path(
    delete,
    path = "/v1/items/{id}",
    tag = "Items",
    security(("bearer_auth" = [])),
    params(("id" = u64, Path, description = "Item id within the caller's inventory")),
    responses(
        (status = 200, description = "Item deleted", body = DeleteItemResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No such item for this user")
    )
)]
pub async fn delete_item(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<DeleteItemResponse>, ApiError> {
    let store = InventoryStore::new(&state.db, &state.cipher);
    store.delete(&user.user_id, id)?;

    Ok(Json(DeleteItemResponse {
        message: format!("Item {id} deleted successfully"),
    }))
}

/// Bulk insert spreadsheet rows.
///
/// The sheet must have `Name`, `Quantity`, `Cabinet`, `Room` and `Location`
/// columns; `Description` and `Barcode` are optional. A blank quantity is
/// recorded as "too many".
#[utoipa::path(
    post,
    path = "/v1/items/import",
    tag = "Items",
    security(("bearer_auth" = [])),
    request_body = ImportBatch,
    responses(
        (status = 201, description = "All rows imported", body = ImportResponse),
        (status = 400, description = "Missing column or invalid row; nothing imported"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Storage failure; some rows may have been imported")
    )
)]
pub async fn import_items(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(batch): ApiJson<ImportBatch>,
) -> Result<(StatusCode, Json<ImportResponse>), ApiError> {
    let importer = BulkImporter::new(&state.db, &state.cipher);
    let inserted = importer.import_rows(&user.user_id, &batch)?;

    let response = ImportResponse {
        message: format!("Imported {inserted} item(s)"),
        inserted,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Id the next created item would receive.
#[utoipa::path(
    get,
    path = "/v1/items/next-id",
    tag = "Items",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Next id", body = NextIdResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn next_item_id(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<NextIdResponse>, ApiError> {
    let store = InventoryStore::new(&state.db, &state.cipher);
    Ok(Json(NextIdResponse {
        next_id: store.next_id(&user.user_id)?,
    }))
}

/// Find the caller's items by name.
#[utoipa::path(
    get,
    path = "/v1/items/search",
    tag = "Items",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching items", body = [InventoryItem]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No item name matches")
    )
)]
pub async fn search_items(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    let store = InventoryStore::new(&state.db, &state.cipher);
    Ok(Json(store.search_by_name(&user.user_id, &query.name)?))
}
