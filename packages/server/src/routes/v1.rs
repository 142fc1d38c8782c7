use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/profile", profile_routes())
        .nest("/projects", project_routes())
        .nest("/experience", experience_routes())
        .nest("/education", education_routes())
        .nest("/blog", blog_routes())
        .nest("/contact", contact_routes())
        .nest("/messages", message_routes())
}

fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::profile::get_profile).put(handlers::profile::save_profile),
        )
        .route("/picture", get(handlers::profile::get_profile_picture))
        .layer(handlers::profile::profile_body_limit())
}

fn project_routes() -> Router<AppState> {
    let crud = Router::new()
        .route(
            "/",
            get(handlers::project::list_projects).post(handlers::project::create_project),
        )
        .route("/reorder", put(handlers::project::reorder_projects))
        .route(
            "/{id}",
            get(handlers::project::get_project)
                .patch(handlers::project::update_project)
                .delete(handlers::project::delete_project),
        );

    let image = Router::new()
        .route(
            "/{id}/image",
            get(handlers::project::get_project_image)
                .post(handlers::project::upload_project_image)
                .delete(handlers::project::delete_project_image),
        )
        .layer(handlers::project::project_image_body_limit());

    crud.merge(image)
}

fn experience_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::experience::list_experience).post(handlers::experience::create_experience),
        )
        .route("/reorder", put(handlers::experience::reorder_experience))
        .route(
            "/{id}",
            axum::routing::patch(handlers::experience::update_experience)
                .delete(handlers::experience::delete_experience),
        )
}

fn education_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::education::list_education).post(handlers::education::create_education),
        )
        .route("/reorder", put(handlers::education::reorder_education))
        .route(
            "/{id}",
            axum::routing::patch(handlers::education::update_education)
                .delete(handlers::education::delete_education),
        )
}

fn blog_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::blog::list_posts).post(handlers::blog::create_post),
        )
        .route("/all", get(handlers::blog::list_all_posts))
        .route(
            "/{id}",
            get(handlers::blog::get_post)
                .patch(handlers::blog::update_post)
                .delete(handlers::blog::delete_post),
        )
}

fn contact_routes() -> Router<AppState> {
    Router::new().route("/", post(handlers::contact::submit_contact))
}

fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::contact::list_messages))
        .route("/{id}", delete(handlers::contact::delete_message))
}
