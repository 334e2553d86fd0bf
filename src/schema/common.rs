use poem_openapi::{
    types::{ParseFromJSON, ToJSON},
    Object,
};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Object, Deserialize, Serialize)]
pub struct PaginateResponse<T: ParseFromJSON + ToJSON> {
    pub counts: u32,
    pub page: u32,
    pub page_count: u32,
    pub page_size: u32,
    pub results: Vec<T>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct BadRequestResponse {
    pub message: String,
}

impl BadRequestResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct UnauthorizedResponse {
    pub message: String,
}

impl Default for UnauthorizedResponse {
    fn default() -> Self {
        Self {
            message: "Unauthorized".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct ForbiddenResponse {
    pub message: String,
}

impl Default for ForbiddenResponse {
    fn default() -> Self {
        Self {
            message: "Forbidden".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct NotFoundResponse {
    pub message: String,
}

impl NotFoundResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct ConflictResponse {
    pub message: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct GoneResponse {
    pub message: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct InternalServerErrorResponse {
    pub message: String,
}

impl InternalServerErrorResponse {
    /// Logs the failure with its location and returns a body that does not
    /// leak the error to the client.
    pub fn new(module: &str, function: &str, step: &str, err: &str) -> Self {
        error!(module, function, step, "{}", err);
        Self {
            message: "Internal Server Error".to_string(),
        }
    }
}
