use utoipa::OpenApi;

use crate::routes::{admin, chat, health, knowledge};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "mango-server",
        description = "Chat front-end and admin console for the Mango knowledge-base assistant",
        version = "0.1.0",
    ),
    tags(
        (name = "health"),
        (name = "chat", description = "Public chat proxy"),
        (name = "admin", description = "Admin login and overview pages"),
        (name = "knowledge", description = "Knowledge-base administration (admin cookie required)"),
    )
)]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root.merge(admin::api_docs());
    root.merge(knowledge::api_docs());
    root
}
