// Authentication wire types

use serde::{Deserialize, Serialize};

/// Login request body
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Login response
/// Only the token is of interest; any other fields are ignored
#[derive(Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
}

/// Token check request body
#[derive(Serialize)]
pub struct CheckRequest<'a> {
    pub token: &'a str,
}
