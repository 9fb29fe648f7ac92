use anyhow::Result;
use serde_json::json;

use crate::core::models::model_options;

pub fn run() -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "models": model_options() }))?
    );
    Ok(())
}
