//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde_json::json;
use tracing::{debug, error};
use wardrobe::models::{CreateCollectionRequest, ImageUpload, NewItemRequest, UpsertStatus};

use crate::{
    error::ApiResult,
    middleware::{AuthUser, auth_middleware},
    models::{ClothingQuery, CollectionUpsertResponse, DeletedResponse},
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/users/createCollection", post(create_collection))
        .route("/api/users/getCollections", get(get_collections))
        .route("/api/users/deleteCollection/:id", delete(delete_collection))
        .route(
            "/api/users/addClothing",
            post(add_clothing).layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .route("/api/users/getClothing", get(get_clothing))
        .route("/api/users/deleteClothing/:id", delete(delete_clothing))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = match state.store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            error!("Health check failed: {}", e);
            false
        }
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "unavailable" },
            "service": "api-service"
        })),
    )
}

/// Create a collection, or merge new item ids into the existing one
pub async fn create_collection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateCollectionRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    debug!(
        "Collection upsert by {} ({})",
        user.id,
        user.username.as_deref().unwrap_or("no username")
    );
    let upsert = state.collections.create_or_merge(user.id, payload).await?;

    let status = match upsert.status {
        UpsertStatus::Created => StatusCode::CREATED,
        UpsertStatus::Merged | UpsertStatus::NoOp => StatusCode::OK,
    };

    Ok((status, Json(CollectionUpsertResponse::from(upsert))))
}

/// List the caller's collections with their items expanded
pub async fn get_collections(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let collections = state.collections.list(user.id).await?;
    Ok(Json(collections))
}

/// Delete one of the caller's collections
pub async fn delete_collection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.collections.delete(user.id, &id).await?;
    Ok(Json(DeletedResponse::DELETED))
}

/// Upload a clothing item: multipart fields `clothing_name`, `category`, `image`
pub async fn add_clothing(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut request = NewItemRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "clothing_name" => request.clothing_name = Some(field.text().await?),
            "category" => request.category = Some(field.text().await?),
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?.to_vec();
                request.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let item = state.items.add(user.id, request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// List the caller's clothing items, optionally filtered by category
pub async fn get_clothing(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ClothingQuery>,
) -> ApiResult<impl IntoResponse> {
    let items = state.items.list(user.id, query.category.as_deref()).await?;
    Ok(Json(items))
}

/// Delete one of the caller's clothing items
pub async fn delete_clothing(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.items.delete(user.id, &id).await?;
    Ok(Json(DeletedResponse::DELETED))
}
