use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: Server,
    pub auth: Auth,
    pub pagination: Pagination,
}

/// Contains parameters for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    /// The interface the server binds to (e.g. "0.0.0.0").
    pub host: String,
    /// The TCP port the server listens on.
    pub port: u16,
    /// Maximum accepted request body size in megabytes. Pet images arrive
    /// base64-encoded in the JSON body, so this is deliberately generous.
    pub body_limit_mb: usize,
}

/// Contains parameters for authentication and token issuance.
#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    /// Lifetime of an issued access token, in hours.
    pub token_ttl_hours: i64,
    /// The bcrypt work factor used when hashing passwords.
    pub bcrypt_cost: u32,
}

/// Contains defaults and bounds for paginated list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    /// Page size applied when the caller does not send `limit`.
    pub default_limit: u32,
    /// Hard ceiling on the page size; larger requests are clamped.
    pub max_limit: u32,
}
