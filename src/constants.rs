/// Base URL of the boards/slides API when the config file does not set one
pub const DEFAULT_API_URL: &str = "https://localhost:7289";

/// Page size used when listing categories and boards
/// The API paginates these resources; one large page covers the admin views
pub const CATALOG_PAGE_SIZE: u32 = 100;

/// Environment variable that overrides the bearer token from the credentials file
pub const TOKEN_ENV_VAR: &str = "SLIDE_ROTATION_TOKEN";

/// Placeholder in the surface command that is replaced by the slide URL
pub const URL_PLACEHOLDER: &str = "{url}";

/// Generate a unique rotation session ID
pub fn generate_session_id() -> String {
    format!("rot_{}", uuid::Uuid::new_v4().simple())
}
