/// Versioned API prefix for all media routes.
pub const API_PREFIX: &str = "/api/v0";
