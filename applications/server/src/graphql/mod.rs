//! GraphQL API
//!
//! Served at `/graphql`: `POST` executes a request, `GET` returns the
//! GraphiQL page. Resolvers go through the same [`UserService`] as the REST
//! handlers, so validation and error semantics are shared. Failures carry
//! `extensions.code` and, for validation failures, `extensions.errors`.

use crate::services::UserService;
use crate::state::AppState;
use async_graphql::http::GraphiQLSource;
use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, Object, Schema, SimpleObject, Value, ID,
};
use axum::extract::State;
use axum::response::Html;
use axum::Json;
use roster_core::pagination::PageRequest;
use roster_core::types::{SearchCriteria, User, UserId, UserInput};
use roster_core::{DisplayZone, RosterError};
use std::sync::Arc;

/// Mount point of the GraphQL endpoint
pub const GRAPHQL_PATH: &str = "/graphql";

pub type RosterSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with the service and display zone as context data
pub fn build_schema(users: Arc<UserService>, display: DisplayZone) -> RosterSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(users)
        .data(display)
        .finish()
}

/// POST /graphql
pub async fn graphql_handler(
    State(app_state): State<AppState>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(app_state.schema.execute(request).await)
}

/// GET /graphql
pub async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

/// User as exposed over GraphQL
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "User", rename_fields = "snake_case")]
pub struct GqlUser {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl GqlUser {
    fn new(user: User, display: DisplayZone) -> Self {
        Self {
            id: ID(user.id.to_string()),
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: display.format(user.created_at),
            updated_at: display.format(user.updated_at),
        }
    }
}

/// Convert a domain error into a GraphQL error with a stable code
fn graphql_error(err: RosterError) -> async_graphql::Error {
    let code = match &err {
        RosterError::Validation(_)
        | RosterError::InvalidField(_)
        | RosterError::InvalidFilter(_) => "VALIDATION_ERROR",
        RosterError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
        RosterError::NotFound(_) => "NOT_FOUND",
        RosterError::Storage(msg) => {
            tracing::error!("Storage error: {}", msg);
            "INTERNAL_ERROR"
        }
    };

    let message = match &err {
        RosterError::Storage(_) => "Internal server error".to_string(),
        other => other.to_string(),
    };

    async_graphql::Error::new(message).extend_with(|_, extensions| {
        extensions.set("code", code);
        if let RosterError::Validation(errors) = &err {
            extensions.set(
                "errors",
                Value::List(errors.iter().cloned().map(Value::String).collect()),
            );
        }
    })
}

fn parse_id(id: &ID) -> async_graphql::Result<UserId> {
    id.parse::<UserId>().map_err(|_| {
        graphql_error(RosterError::Validation(vec![
            "id must be an integer".to_string(),
        ]))
    })
}

fn service<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Arc<UserService>> {
    ctx.data::<Arc<UserService>>()
}

fn display(ctx: &Context<'_>) -> DisplayZone {
    ctx.data_opt::<DisplayZone>().copied().unwrap_or_default()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Connectivity check
    async fn hello(&self) -> &'static str {
        "Hello World!"
    }

    /// A user by id, null when absent
    async fn user(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<GqlUser>> {
        // Unparsable ids cannot exist
        let Ok(id) = id.parse::<UserId>() else {
            return Ok(None);
        };

        let user = service(ctx)?.find(id).await.map_err(graphql_error)?;
        Ok(user.map(|user| GqlUser::new(user, display(ctx))))
    }

    /// One cursor page of users, ascending by id
    async fn users(
        &self,
        ctx: &Context<'_>,
        cursor: Option<ID>,
        limit: Option<i32>,
    ) -> async_graphql::Result<Vec<GqlUser>> {
        let cursor = cursor.and_then(|c| c.trim().parse::<i64>().ok());
        let page = PageRequest::new(cursor, limit.map(i64::from));

        let page = service(ctx)?.list(page).await.map_err(graphql_error)?;
        let display = display(ctx);
        Ok(page
            .items
            .into_iter()
            .map(|user| GqlUser::new(user, display))
            .collect())
    }

    /// Users matching every supplied criterion
    async fn search_users(
        &self,
        ctx: &Context<'_>,
        email: Option<String>,
        name: Option<String>,
    ) -> async_graphql::Result<Vec<GqlUser>> {
        let criteria = SearchCriteria {
            email: email.filter(|e| !e.trim().is_empty()),
            name: name.filter(|n| !n.trim().is_empty()),
            age: None,
        };
        if criteria.is_empty() {
            return Ok(Vec::new());
        }

        let users = service(ctx)?.search(&criteria).await.map_err(graphql_error)?;
        let display = display(ctx);
        Ok(users
            .into_iter()
            .map(|user| GqlUser::new(user, display))
            .collect())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        name: String,
        email: String,
        age: Option<i32>,
    ) -> async_graphql::Result<GqlUser> {
        let input = UserInput {
            name: Some(name),
            email: Some(email),
            age: age.map(serde_json::Value::from),
        };

        let user = service(ctx)?.create(&input).await.map_err(graphql_error)?;
        Ok(GqlUser::new(user, display(ctx)))
    }

    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: ID,
        name: Option<String>,
        email: Option<String>,
        age: Option<i32>,
    ) -> async_graphql::Result<GqlUser> {
        let id = parse_id(&id)?;
        let input = UserInput {
            name,
            email,
            age: age.map(serde_json::Value::from),
        };

        let user = service(ctx)?
            .update(id, &input)
            .await
            .map_err(graphql_error)?;
        Ok(GqlUser::new(user, display(ctx)))
    }

    async fn delete_user(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<GqlUser> {
        let id = parse_id(&id)?;
        let user = service(ctx)?.delete(id).await.map_err(graphql_error)?;
        Ok(GqlUser::new(user, display(ctx)))
    }
}
