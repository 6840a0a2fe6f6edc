use actix_web::{web, HttpResponse};
use std::sync::Arc;

use super::{parse_json_body, ApiError};
use crate::application::CreateOrderUseCase;
use crate::validation::validate_request;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/internal/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(list_orders))
            .route("/{id}", web::get().to(get_order)),
    );
}

async fn create_order(
    body: web::Bytes,
    use_case: web::Data<Arc<CreateOrderUseCase>>,
) -> Result<HttpResponse, ApiError> {
    let value = parse_json_body(&body)?;
    let request = validate_request(&value)?;
    let order = use_case.execute(request).await?;
    Ok(HttpResponse::Created().json(order))
}

async fn list_orders(use_case: web::Data<Arc<CreateOrderUseCase>>) -> Result<HttpResponse, ApiError> {
    let orders = use_case.repository().list().await?;
    Ok(HttpResponse::Ok().json(orders))
}

async fn get_order(
    id: web::Path<String>,
    use_case: web::Data<Arc<CreateOrderUseCase>>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    match use_case.repository().find_by_id(&id).await? {
        Some(order) => Ok(HttpResponse::Ok().json(order)),
        None => Err(ApiError::NotFound(id)),
    }
}
