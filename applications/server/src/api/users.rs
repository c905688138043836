/// Users API routes
use crate::{
    api::envelope::{Envelope, Pagination},
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, Query, State},
    http::{StatusCode, Uri},
    Json,
};
use roster_core::{
    pagination::{coerce_integer, PageRequest},
    projection::project,
    query::QueryRequest,
    types::{SearchCriteria, User, UserId, UserInput},
    DisplayZone,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use url::form_urlencoded;

/// Body of `POST /api/users/search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub age: Option<Value>,
}

impl SearchRequest {
    /// Blank strings count as absent
    fn into_criteria(self) -> Result<SearchCriteria> {
        let age = match self.age.filter(|v| !v.is_null()) {
            Some(raw) => Some(
                coerce_integer(Some(&raw))
                    .and_then(|n| i32::try_from(n).ok())
                    .ok_or_else(|| ServerError::BadRequest("age must be an integer".to_string()))?,
            ),
            None => None,
        };

        Ok(SearchCriteria {
            email: self.email.filter(|e| !e.trim().is_empty()),
            name: self.name.filter(|n| !n.trim().is_empty()),
            age,
        })
    }
}

fn user_json(user: &User, display: DisplayZone) -> Value {
    Value::Object(project(user, &[], display))
}

fn users_json(users: &[User], display: DisplayZone) -> Value {
    Value::Array(users.iter().map(|u| user_json(u, display)).collect())
}

fn parse_user_id(raw: &str) -> Result<UserId> {
    raw.parse()
        .map_err(|_| ServerError::BadRequest(format!("Invalid user id: {raw}")))
}

/// Request path with `cursor` and `limit` set, other parameters kept
fn next_url(uri: &Uri, cursor: UserId, limit: usize) -> String {
    let mut pairs: Vec<(String, String)> = uri
        .query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    set_param(&mut pairs, "cursor", cursor.to_string());
    set_param(&mut pairs, "limit", limit.to_string());

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(&pairs)
        .finish();
    format!("{}?{}", uri.path(), query)
}

/// Replace the first `key`, drop later duplicates, append when missing
fn set_param(pairs: &mut Vec<(String, String)>, key: &str, value: String) {
    let mut seen = false;
    pairs.retain_mut(|(k, v)| {
        if k != key {
            return true;
        }
        if seen {
            return false;
        }
        seen = true;
        v.clone_from(&value);
        true
    });

    if !seen {
        pairs.push((key.to_string(), value));
    }
}

/// GET /api/users?cursor&limit
/// One cursor page of users, ascending by id
pub async fn list_users(
    State(app_state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Envelope>> {
    let page = PageRequest::from_raw(
        params.get("cursor").map(String::as_str),
        params.get("limit").map(String::as_str),
    );
    let result = app_state.users.list(page).await?;

    let pagination = Pagination {
        next_cursor: result.next_cursor.map(UserId::get),
        next_url: result.next_cursor.map(|c| next_url(&uri, c, page.limit)),
        limit: page.limit,
    };

    Ok(Json(
        Envelope::ok("Get all users successfully")
            .with_data(users_json(&result.items, app_state.display))
            .with_pagination(pagination),
    ))
}

/// GET /api/users/uid/:id
pub async fn get_user(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>> {
    let id = parse_user_id(&id)?;
    let user = app_state.users.get(id).await?;

    Ok(Json(
        Envelope::ok("Get user successfully").with_data(user_json(&user, app_state.display)),
    ))
}

/// POST /api/users
pub async fn create_user(
    State(app_state): State<AppState>,
    payload: std::result::Result<Json<UserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope>)> {
    let Json(input) = payload?;
    let user = app_state.users.create(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            Envelope::ok("User created successfully")
                .with_data(user_json(&user, app_state.display)),
        ),
    ))
}

/// PUT /api/users/uid/:id
/// Partial update; omitted fields keep their values
pub async fn update_user(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<Envelope>> {
    let id = parse_user_id(&id)?;
    let Json(input) = payload?;
    let user = app_state.users.update(id, &input).await?;

    Ok(Json(
        Envelope::ok("User updated successfully").with_data(user_json(&user, app_state.display)),
    ))
}

/// DELETE /api/users/uid/:id
/// Returns the deleted user's last state
pub async fn delete_user(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>> {
    let id = parse_user_id(&id)?;
    let user = app_state.users.delete(id).await?;

    Ok(Json(
        Envelope::ok("User deleted successfully").with_data(user_json(&user, app_state.display)),
    ))
}

/// POST /api/users/search
/// 404 with an empty list when nothing matches
pub async fn search_users(
    State(app_state): State<AppState>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope>)> {
    let Json(request) = payload?;
    let criteria = request.into_criteria()?;
    let users = app_state.users.search(&criteria).await?;

    if users.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(
                Envelope::failure("No users found matching the criteria.")
                    .with_data(Value::Array(Vec::new())),
            ),
        ));
    }

    let total = users.len();
    Ok((
        StatusCode::OK,
        Json(
            Envelope::ok(format!("Found {total} user(s) matching the criteria."))
                .with_data(users_json(&users, app_state.display))
                .with_total(total),
        ),
    ))
}

/// POST /api/users/query
/// Ad-hoc query with where/select/sort/limit/offset
pub async fn query_users(
    State(app_state): State<AppState>,
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Envelope>> {
    let Json(request) = payload?;
    let outcome = app_state.users.query(&request).await?;

    let total = outcome.users.len();
    let data: Vec<Value> = outcome
        .users
        .iter()
        .map(|user| Value::Object(project(user, &outcome.select, app_state.display)))
        .collect();

    Ok(Json(
        Envelope::ok(format!("Query executed successfully. Found {total} user(s)."))
            .with_data(data)
            .with_total(total),
    ))
}
