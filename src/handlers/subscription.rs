use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Subscription, SubscriptionInput, TotalCostQuery, TotalCostResponse};
use crate::services::SubscriptionService;

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::ValidationError(format!("invalid subscription id '{raw}'")))
}

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscription",
    request_body = SubscriptionInput,
    responses(
        (status = 201, description = "Subscription created", body = Subscription),
        (status = 400, description = "Invalid request body")
    )
)]
pub async fn create_subscription(
    service: web::Data<SubscriptionService>,
    request: web::Json<SubscriptionInput>,
) -> Result<HttpResponse> {
    let new = match request.validate() {
        Ok(new) => new,
        Err(e) => return Ok(e.error_response()),
    };

    match service.create(new).await {
        Ok(sub) => Ok(HttpResponse::Created().json(json!({"success": true, "data": sub}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscription",
    responses(
        (status = 200, description = "All subscriptions", body = Vec<Subscription>)
    )
)]
pub async fn get_subscriptions(service: web::Data<SubscriptionService>) -> Result<HttpResponse> {
    match service.get_all().await {
        Ok(subs) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": subs}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(
        ("id" = String, Path, description = "Subscription id")
    ),
    responses(
        (status = 200, description = "Subscription found", body = Subscription),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No subscription with this id")
    )
)]
pub async fn get_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match service.get_by_id(id).await {
        Ok(sub) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": sub}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(
        ("id" = String, Path, description = "Subscription id")
    ),
    request_body = SubscriptionInput,
    responses(
        (status = 200, description = "Subscription updated", body = Subscription),
        (status = 400, description = "Malformed id or request body"),
        (status = 404, description = "No subscription with this id")
    )
)]
pub async fn update_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
    request: web::Json<SubscriptionInput>,
) -> Result<HttpResponse> {
    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    let new = match request.validate() {
        Ok(new) => new,
        Err(e) => return Ok(e.error_response()),
    };

    match service.update(id, new).await {
        Ok(sub) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": sub}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(
        ("id" = String, Path, description = "Subscription id")
    ),
    responses(
        (status = 200, description = "Subscription deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No subscription with this id")
    )
)]
pub async fn delete_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match service.delete(id).await {
        Ok(()) => Ok(HttpResponse::Ok()
            .json(json!({"success": true, "message": "subscription deleted"}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/total-cost",
    tag = "subscription",
    params(
        ("from" = String, Query, description = "Start of the month range, MM-YYYY"),
        ("to" = String, Query, description = "End of the month range (inclusive), MM-YYYY"),
        ("user_id" = Option<String>, Query, description = "Only count this user's subscriptions"),
        ("service_name" = Option<String>, Query, description = "Only count this service")
    ),
    responses(
        (status = 200, description = "Summed price of matching subscriptions", body = TotalCostResponse),
        (status = 400, description = "Malformed range or filter")
    )
)]
pub async fn total_cost(
    service: web::Data<SubscriptionService>,
    query: web::Query<TotalCostQuery>,
) -> Result<HttpResponse> {
    let filter = match query.validate() {
        Ok(filter) => filter,
        Err(e) => return Ok(e.error_response()),
    };

    match service.total_cost(&filter).await {
        Ok(total) => Ok(HttpResponse::Ok()
            .json(json!({"success": true, "data": TotalCostResponse { total }}))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    // total-cost goes first so it is not swallowed by the {id} routes.
    cfg.service(
        web::scope("/subscriptions")
            .route("/total-cost", web::get().to(total_cost))
            .route("", web::post().to(create_subscription))
            .route("", web::get().to(get_subscriptions))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}", web::put().to(update_subscription))
            .route("/{id}", web::delete().to(delete_subscription)),
    );
}
