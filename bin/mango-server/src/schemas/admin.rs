use serde::Deserialize;
use utoipa::ToSchema;

/// Body of the login form (`application/x-www-form-urlencoded`).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginForm {
    pub access_code: String,
}
