/// HTTP routing
use crate::{api, graphql, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the application router
pub fn create_router(app_state: AppState) -> Router {
    let users = Router::new()
        .route(
            "/",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/uid/:id",
            get(api::users::get_user)
                .put(api::users::update_user)
                .delete(api::users::delete_user),
        )
        .route("/search", post(api::users::search_users))
        .route("/query", post(api::users::query_users));

    Router::new()
        .route("/health", get(api::health::health))
        .nest("/api/users", users)
        .route(
            graphql::GRAPHQL_PATH,
            get(graphql::graphiql).post(graphql::graphql_handler),
        )
        .fallback(api::fallback::not_found)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
