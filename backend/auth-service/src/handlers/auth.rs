/// Authentication handlers
use actix_web::{web, HttpRequest, HttpResponse};

use crate::{
    error::{AuthError, Result},
    middleware::bearer_token,
    models::user::{SigninForm, SignupRequest, UserResponse},
    AppState,
};

/// `POST /auth/signup`
pub async fn signup(
    state: web::Data<AppState>,
    payload: web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    let user = state.auth_service().signup(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// `POST /auth/signin` with a form body of `username` and `password`
pub async fn signin(
    state: web::Data<AppState>,
    form: web::Form<SigninForm>,
) -> Result<HttpResponse> {
    let pair = state
        .auth_service()
        .signin(&form.username, &form.password)
        .await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// `GET /auth/refresh_token` with the refresh token as the bearer credential
pub async fn refresh_token(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    let token = bearer_token(&req).map_err(|_| AuthError::InvalidRefreshToken)?;
    let pair = state.auth_service().refresh(token).await?;
    Ok(HttpResponse::Ok().json(pair))
}
