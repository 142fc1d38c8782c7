pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod image;
pub mod mailer;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Portfolio API",
        version = "1.0.0",
        description = "Content API for a personal portfolio site"
    ),
    paths(
        handlers::profile::get_profile,
        handlers::profile::get_profile_picture,
        handlers::profile::save_profile,
        handlers::project::list_projects,
        handlers::project::get_project,
        handlers::project::create_project,
        handlers::project::update_project,
        handlers::project::delete_project,
        handlers::project::reorder_projects,
        handlers::project::get_project_image,
        handlers::project::upload_project_image,
        handlers::project::delete_project_image,
        handlers::experience::list_experience,
        handlers::experience::create_experience,
        handlers::experience::update_experience,
        handlers::experience::delete_experience,
        handlers::experience::reorder_experience,
        handlers::education::list_education,
        handlers::education::create_education,
        handlers::education::update_education,
        handlers::education::delete_education,
        handlers::education::reorder_education,
        handlers::blog::list_posts,
        handlers::blog::list_all_posts,
        handlers::blog::get_post,
        handlers::blog::create_post,
        handlers::blog::update_post,
        handlers::blog::delete_post,
        handlers::contact::submit_contact,
        handlers::contact::list_messages,
        handlers::contact::delete_message,
    ),
    tags(
        (name = "Profile", description = "Singleton profile and picture pipeline"),
        (name = "Projects", description = "Project CRUD, ordering and images"),
        (name = "Experience", description = "Work experience entries"),
        (name = "Education", description = "Education history entries"),
        (name = "Blog", description = "Blog posts with draft/published state"),
        (name = "Contact", description = "Public contact form"),
        (name = "Messages", description = "Received contact messages"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "admin_token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Pre-shared administrator token"))
                    .build(),
            ),
        );
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);
    let api = ApiDoc::openapi();

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}

fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(cfg.max_age));

    if cfg.allow_origins.iter().any(|o| o == "*") {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cfg
            .allow_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    layer
}
