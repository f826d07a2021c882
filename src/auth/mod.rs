// Authentication module
// Connection options, login exchange and wire types for the E37 auth API

mod options;
mod token;
mod types;

pub use options::{parse_base_url, E37Options};
pub use token::fetch_token;
pub use types::{CheckRequest, LoginRequest, LoginResponse};

/// Login endpoint, relative to the base URL
pub const AUTH_PATH: &str = "/api/auth";

/// Token validity check endpoint, relative to the base URL
pub const CHECK_PATH: &str = "/api/auth/check";
