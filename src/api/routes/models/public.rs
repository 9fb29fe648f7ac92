//! Public types for the models API
use serde::Serialize;

use crate::core::models::ModelOption;

#[derive(Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelOption>,
}
