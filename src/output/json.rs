use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};

pub fn print<T: Serialize>(value: &T) -> AppResult<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

pub fn error_body(err: &AppError) -> serde_json::Value {
    json!({
        "error": {
            "kind": err.kind(),
            "message": err.to_string(),
        }
    })
}

pub fn print_error(err: &AppError) -> AppResult<()> {
    print(&error_body(err))
}
