/// Image handlers
///
/// Only ownership bookkeeping lives here; uploads and transformations go
/// through the external media service.
use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::{
    error::{AuthError, Result},
    middleware::OwnershipGate,
    models::image::{CreateImageRequest, ListImagesQuery, UpdateImageRequest},
    models::{Identity, Role},
    AppState,
};

const MAX_PAGE_SIZE: i64 = 100;

const OWNER_OR_ADMIN: OwnershipGate = OwnershipGate::new(&[Role::Admin], "image_id");

fn image_not_found() -> AuthError {
    AuthError::NotFound("Image not found!".to_string())
}

/// `GET /images`
pub async fn list_images(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<ListImagesQuery>,
) -> Result<HttpResponse> {
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.max(0);

    let images = state.images.list_for_owner(identity.id, offset, limit).await?;
    Ok(HttpResponse::Ok().json(images))
}

/// `POST /images`
pub async fn create_image(
    state: web::Data<AppState>,
    identity: Identity,
    payload: web::Json<CreateImageRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let image = state
        .images
        .create(&identity, &payload.url, payload.description.as_deref())
        .await?;

    tracing::info!(image_id = image.id, user_id = identity.id, "Image registered");
    Ok(HttpResponse::Created().json(image))
}

/// `GET /images/{image_id}`
pub async fn get_image(
    state: web::Data<AppState>,
    identity: Identity,
    image_id: web::Path<i32>,
) -> Result<HttpResponse> {
    let image = state
        .images
        .get_single(&identity, *image_id)
        .await?
        .ok_or_else(image_not_found)?;
    Ok(HttpResponse::Ok().json(image))
}

/// `PATCH /images/{image_id}`
pub async fn update_image(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: Identity,
    image_id: web::Path<i32>,
    payload: web::Json<UpdateImageRequest>,
) -> Result<HttpResponse> {
    OWNER_OR_ADMIN
        .check(&req, &identity, state.images.as_ref())
        .await?;
    payload.validate()?;

    let image = state
        .images
        .update_description(*image_id, payload.description.as_deref())
        .await?
        .ok_or_else(image_not_found)?;
    Ok(HttpResponse::Ok().json(image))
}

/// `DELETE /images/{image_id}`
pub async fn delete_image(
    state: web::Data<AppState>,
    req: HttpRequest,
    identity: Identity,
    image_id: web::Path<i32>,
) -> Result<HttpResponse> {
    OWNER_OR_ADMIN
        .check(&req, &identity, state.images.as_ref())
        .await?;

    let image = state
        .images
        .delete(*image_id)
        .await?
        .ok_or_else(image_not_found)?;

    tracing::info!(image_id = image.id, user_id = identity.id, "Image deleted");
    Ok(HttpResponse::Ok().json(image))
}
