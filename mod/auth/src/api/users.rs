use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use stitchline_core::{ListQuery, Page, ServiceError};

use crate::model::{CreateUser, UpdateUser, UserInfo};
use super::{AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[derive(Deserialize)]
struct UserQuery {
    #[serde(flatten)]
    params: ListQuery,
    role: Option<String>,
}

async fn create_user(
    State(svc): State<AppState>,
    Json(body): Json<CreateUser>,
) -> Result<Json<UserInfo>, ServiceError> {
    ok_json(svc.create_user(body).map(UserInfo::from))
}

async fn get_user(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserInfo>, ServiceError> {
    ok_json(svc.get_user(&id).map(UserInfo::from))
}

async fn list_users(
    State(svc): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<Json<Page<UserInfo>>, ServiceError> {
    ok_json(svc.list_users(&q.params, q.role.as_deref()).map(|r| Page {
        items: r.items.into_iter().map(UserInfo::from).collect(),
        total: r.total,
    }))
}

async fn update_user(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUser>,
) -> Result<Json<UserInfo>, ServiceError> {
    ok_json(svc.update_user(&id, body).map(UserInfo::from))
}

async fn delete_user(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.delete_user(&id).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
