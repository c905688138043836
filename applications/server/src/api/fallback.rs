/// Fallback for unknown routes
use axum::{
    http::{Method, StatusCode, Uri},
    Json,
};
use serde_json::{json, Value};

/// Any unmatched route: 404 listing the available endpoints
pub async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<Value>) {
    tracing::debug!(%method, path = uri.path(), "No route matched");

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": format!("Cannot find the endpoint: {} {}", method, uri.path()),
            "availableEndpoints": {
                "users": {
                    "GET /api/users": "Get all users",
                    "GET /api/users/uid/:id": "Get user by ID",
                    "POST /api/users/search": "Search users",
                    "POST /api/users/query": "Query users",
                    "POST /api/users": "Create new user",
                    "PUT /api/users/uid/:id": "Update user",
                    "DELETE /api/users/uid/:id": "Delete user"
                },
                "graphql": {
                    "POST /graphql": "Execute a GraphQL request",
                    "GET /graphql": "GraphiQL explorer"
                },
                "health": {
                    "GET /health": "Health check"
                }
            }
        })),
    )
}
