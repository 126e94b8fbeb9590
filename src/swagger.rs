use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Subscription Tracking API",
        description = "CRUD and monthly cost aggregation for user subscriptions to paid services"
    ),
    paths(
        handlers::subscription::create_subscription,
        handlers::subscription::get_subscriptions,
        handlers::subscription::get_subscription,
        handlers::subscription::update_subscription,
        handlers::subscription::delete_subscription,
        handlers::subscription::total_cost,
    ),
    components(schemas(
        Subscription,
        SubscriptionInput,
        MonthDate,
        TotalCostResponse,
    )),
    tags(
        (name = "subscription", description = "Subscription management endpoints")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
