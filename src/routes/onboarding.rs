use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireJWT};
use crate::models::onboarding::UpdateOnboardingRequest;
use crate::services::OnboardingService;

static ONBOARDING_SERVICE: Lazy<OnboardingService> = Lazy::new(OnboardingService::new_lazy);

pub async fn get_status(req: HttpRequest) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(RequireJWT::unauthorized());
    };
    ONBOARDING_SERVICE.get_status(&req, user_id).await
}

pub async fn update_status(
    req: HttpRequest,
    body: web::Json<UpdateOnboardingRequest>,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(RequireJWT::unauthorized());
    };
    ONBOARDING_SERVICE
        .update_status(&req, user_id, body.into_inner())
        .await
}

pub fn configure_onboarding_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/onboarding")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(get_status))
            .route("", web::put().to(update_status)),
    );
}
