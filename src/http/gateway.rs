use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use std::sync::Arc;

use super::{correlation_id, parse_json_body, ApiError, CORRELATION_HEADER};
use crate::application::SubmitOrderUseCase;
use crate::error::PipelineError;
use crate::metrics::Metrics;
use crate::validation::validate_request;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/orders", web::post().to(submit_order));
}

/// `POST /orders`: validate, publish, acknowledge. The order is not stored
/// yet when the 201 is returned.
async fn submit_order(
    req: HttpRequest,
    body: web::Bytes,
    use_case: web::Data<Arc<SubmitOrderUseCase>>,
    metrics: web::Data<Arc<Metrics>>,
) -> Result<HttpResponse, ApiError> {
    let correlation_id = correlation_id(&req);

    let parsed = parse_json_body(&body)
        .and_then(|value| validate_request(&value).map_err(PipelineError::from));
    let request = match parsed {
        Ok(request) => request,
        Err(e) => {
            metrics.record_submission("rejected");
            tracing::info!(
                correlation_id = %correlation_id,
                issues = e.issues().len(),
                "Rejected order submission"
            );
            return Err(e.into());
        }
    };

    let event = use_case.execute(request, &correlation_id).await?;

    Ok(HttpResponse::Created()
        .insert_header((CORRELATION_HEADER, correlation_id.clone()))
        .json(json!({
            "correlationId": correlation_id,
            "status": "accepted",
            "event": event,
        })))
}
