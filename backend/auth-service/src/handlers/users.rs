/// User handlers
use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::{
    db::UserLookup,
    error::Result,
    middleware::{OwnershipGate, RoleGate},
    models::user::{BanRequest, ChangeRoleRequest, SearchQuery, UpdateUserRequest},
    models::{Identity, Role, UserResponse},
    AppState,
};

const STAFF: RoleGate = RoleGate::new(&[Role::Admin, Role::Moderator]);
const ADMIN_ONLY: RoleGate = RoleGate::new(&[Role::Admin]);
const SELF_OR_ADMIN: OwnershipGate = OwnershipGate::new(&[Role::Admin], "user_id");

/// `GET /users/me`
pub async fn me(state: web::Data<AppState>, identity: Identity) -> Result<HttpResponse> {
    let user = state.user_service().get(identity.id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// `GET /users?query=`
pub async fn search_users(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    STAFF.check(&identity)?;
    query.validate()?;

    let users: Vec<UserResponse> = state
        .user_service()
        .search(&query.query)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(users))
}

/// `GET /users/{user_id}`
pub async fn get_user(state: web::Data<AppState>, user_id: web::Path<i32>) -> Result<HttpResponse> {
    let user = state.user_service().get(*user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// `PUT /users/{user_id}`
pub async fn update_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: Identity,
    user_id: web::Path<i32>,
    payload: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    SELF_OR_ADMIN
        .check(&req, &identity, &UserLookup(state.users.clone()))
        .await?;

    let user = state
        .user_service()
        .update(*user_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// `DELETE /users/{user_id}`
pub async fn delete_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: Identity,
    user_id: web::Path<i32>,
) -> Result<HttpResponse> {
    SELF_OR_ADMIN
        .check(&req, &identity, &UserLookup(state.users.clone()))
        .await?;

    let user = state.user_service().delete(*user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// `PATCH /users/{user_id}/ban`
pub async fn ban_user(
    state: web::Data<AppState>,
    identity: Identity,
    user_id: web::Path<i32>,
    payload: web::Json<BanRequest>,
) -> Result<HttpResponse> {
    ADMIN_ONLY.check(&identity)?;

    let user = state
        .user_service()
        .set_ban(&identity, *user_id, payload.ban)
        .await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// `PATCH /users/{user_id}/role`
pub async fn change_role(
    state: web::Data<AppState>,
    identity: Identity,
    user_id: web::Path<i32>,
    payload: web::Json<ChangeRoleRequest>,
) -> Result<HttpResponse> {
    ADMIN_ONLY.check(&identity)?;

    let user = state
        .user_service()
        .change_role(&identity, *user_id, payload.role)
        .await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
