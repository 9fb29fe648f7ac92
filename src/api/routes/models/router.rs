//! Router for the models API

use std::sync::{Arc, RwLock};

use axum::{Router, response::Json, routing::get};

use super::public;
use crate::api::state::AppState;
use crate::core::models::model_options;

type SharedState = Arc<RwLock<AppState>>;

/// List the models a session can choose from
async fn models_list() -> Json<public::ModelsResponse> {
    Json(public::ModelsResponse {
        models: model_options(),
    })
}

/// Create the models router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(models_list))
}
