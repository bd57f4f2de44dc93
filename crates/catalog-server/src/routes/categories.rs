//! Category CRUD route handlers.

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use catalog_core::{Category, CategoryId, Error};

use crate::context::AppContext;
use crate::error::AppError;
use crate::form::CategoryForm;
use crate::service::RequestContext;

/// Path ids that are not integers can never match a row.
fn parse_id(raw: &str, rc: &RequestContext) -> Result<CategoryId, AppError> {
    raw.parse()
        .map_err(|_| AppError::for_request(Error::not_found("category", raw), rc))
}

async fn read_form(
    headers: &HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
    rc: &RequestContext,
) -> Result<CategoryForm, AppError> {
    CategoryForm::read(headers, multipart)
        .await
        .map_err(|e| AppError::for_request(e, rc))
}

/// GET /api/category
pub async fn list_categories(
    State(ctx): State<AppContext>,
    rc: RequestContext,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = ctx
        .categories
        .list(&rc)
        .await
        .map_err(|e| AppError::for_request(e, &rc))?;
    Ok(Json(categories))
}

/// GET /api/category/{id}
pub async fn get_category(
    State(ctx): State<AppContext>,
    rc: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<Category>, AppError> {
    let id = parse_id(&id, &rc)?;
    let category = ctx
        .categories
        .get(&rc, id)
        .await
        .map_err(|e| AppError::for_request(e, &rc))?;
    Ok(Json(category))
}

/// POST /api/category
pub async fn create_category(
    State(ctx): State<AppContext>,
    rc: RequestContext,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Category>, AppError> {
    let form = read_form(&headers, multipart, &rc).await?;
    let category = ctx
        .categories
        .create(&rc, form)
        .await
        .map_err(|e| AppError::for_request(e, &rc))?;
    Ok(Json(category))
}

/// POST /api/category/edit/{id}
pub async fn update_category(
    State(ctx): State<AppContext>,
    rc: RequestContext,
    Path(id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Category>, AppError> {
    let id = parse_id(&id, &rc)?;
    let form = read_form(&headers, multipart, &rc).await?;
    let category = ctx
        .categories
        .update(&rc, id, form)
        .await
        .map_err(|e| AppError::for_request(e, &rc))?;
    Ok(Json(category))
}

/// DELETE /api/category/{id}
pub async fn delete_category(
    State(ctx): State<AppContext>,
    rc: RequestContext,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, &rc)?;
    ctx.categories
        .delete(&rc, id)
        .await
        .map_err(|e| AppError::for_request(e, &rc))?;
    Ok(StatusCode::NO_CONTENT)
}
