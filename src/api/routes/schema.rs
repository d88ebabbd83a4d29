//! Schema Routes
//!
//! - GET /api/v1/schema - All entities with their fields
//! - GET /api/v1/schema/:entity - One entity

use axum::{extract::Path, Json};

use crate::api::dto::SchemaResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::schema::{self, EntityDef};

/// GET /api/v1/schema
pub async fn list_entities() -> Json<SchemaResponse> {
    Json(SchemaResponse {
        entities: schema::entities(),
    })
}

/// GET /api/v1/schema/:entity
pub async fn get_entity(Path(entity): Path<String>) -> ApiResult<Json<EntityDef>> {
    schema::entity(&entity)
        .copied()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown entity: {}", entity)))
}
