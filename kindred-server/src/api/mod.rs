//! API implementation for the Kindred HTTP server

use std::sync::Arc;

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;

use crate::state::AppState;

pub mod dto;
pub mod members;
pub mod reputation;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        members::create_member,
        members::get_member,
        members::remove_member,
        members::get_family_tree,
        members::add_junior,
        members::break_link,
        members::dissolve_subtree,
        reputation::get_reputation,
        reputation::award_rep,
        reputation::deduct_rep,
        reputation::register_kill_activity,
        reputation::register_expedition_activity,
        reputation::reset_daily_rep,
    ),
    components(
        schemas(
            dto::MemberDto,
            dto::CreateMemberRequest,
            dto::AddJuniorRequest,
            dto::LinkDto,
            dto::ReasonRequest,
            dto::UpdatedMembersDto,
            dto::FamilyTreeDto,
            dto::ReputationDto,
            dto::AwardRepRequest,
            dto::DeductRepRequest,
            dto::KillActivityRequest,
            dto::ExpeditionActivityRequest,
            dto::ActivityResultDto,
            dto::ResetResultDto,
            dto::HealthDto,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "members", description = "Family member and link management"),
        (name = "reputation", description = "Reputation awards, deductions and activities"),
        (name = "admin", description = "Operational endpoints"),
    ),
    info(
        title = "Kindred Family Service API",
        description = "RESTful API for the Kindred family relationship and reputation service."
    )
)]
pub struct ApiDoc;

/// Build the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_spec))
        .route("/api/members", post(members::create_member))
        .route(
            "/api/members/{character_id}",
            get(members::get_member).delete(members::remove_member),
        )
        .route(
            "/api/members/{character_id}/tree",
            get(members::get_family_tree),
        )
        .route(
            "/api/members/{character_id}/juniors",
            post(members::add_junior),
        )
        .route(
            "/api/members/{character_id}/break-link",
            post(members::break_link),
        )
        .route(
            "/api/members/{character_id}/dissolve",
            post(members::dissolve_subtree),
        )
        .route(
            "/api/members/{character_id}/reputation",
            get(reputation::get_reputation),
        )
        .route(
            "/api/members/{character_id}/reputation/award",
            post(reputation::award_rep),
        )
        .route(
            "/api/members/{character_id}/reputation/deduct",
            post(reputation::deduct_rep),
        )
        .route(
            "/api/members/{character_id}/activities/kills",
            post(reputation::register_kill_activity),
        )
        .route(
            "/api/members/{character_id}/activities/expeditions",
            post(reputation::register_expedition_activity),
        )
        .route(
            "/api/admin/reputation/reset",
            post(reputation::reset_daily_rep),
        )
        .with_state(state)
}

/// Liveness probe
async fn health() -> Json<dto::HealthDto> {
    Json(dto::HealthDto::ok())
}

/// Serve the generated OpenAPI document
async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
