//! Reputation and activity endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Json;

use crate::api::dto::{
    ActivityResultDto, AwardRepRequest, DeductRepRequest, ExpeditionActivityRequest,
    KillActivityRequest, MemberDto, ReputationDto, ResetResultDto,
};
use crate::error::ServerResult;
use crate::state::AppState;

/// Fetch a member's reputation standing
#[utoipa::path(
    get,
    path = "/api/members/{character_id}/reputation",
    params(("character_id" = u32, Path, description = "External character id")),
    responses(
        (status = 200, description = "Reputation standing", body = ReputationDto),
        (status = 404, description = "Member not found")
    ),
    tag = "reputation"
)]
pub async fn get_reputation(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<u32>,
) -> ServerResult<Json<ReputationDto>> {
    let summary = state.manager.get_reputation(character_id).await?;
    Ok(Json(ReputationDto::from(summary)))
}

/// Award reputation directly to a member
#[utoipa::path(
    post,
    path = "/api/members/{character_id}/reputation/award",
    params(("character_id" = u32, Path, description = "External character id")),
    request_body = AwardRepRequest,
    responses(
        (status = 200, description = "Reputation awarded", body = MemberDto),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Daily cap exceeded")
    ),
    tag = "reputation"
)]
pub async fn award_rep(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<u32>,
    Json(req): Json<AwardRepRequest>,
) -> ServerResult<Json<MemberDto>> {
    let source = req.source.as_deref().unwrap_or("api");
    let member = state
        .manager
        .award_rep(character_id, req.amount, source)
        .await?;
    Ok(Json(MemberDto::from(member)))
}

/// Deduct reputation from a member
#[utoipa::path(
    post,
    path = "/api/members/{character_id}/reputation/deduct",
    params(("character_id" = u32, Path, description = "External character id")),
    request_body = DeductRepRequest,
    responses(
        (status = 200, description = "Reputation deducted", body = MemberDto),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Insufficient reputation")
    ),
    tag = "reputation"
)]
pub async fn deduct_rep(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<u32>,
    Json(req): Json<DeductRepRequest>,
) -> ServerResult<Json<MemberDto>> {
    let reason = req.reason.as_deref().unwrap_or("unspecified");
    let member = state
        .manager
        .deduct_rep(character_id, req.amount, reason)
        .await?;
    Ok(Json(MemberDto::from(member)))
}

/// Register a junior's kill tally, crediting its senior
#[utoipa::path(
    post,
    path = "/api/members/{character_id}/activities/kills",
    params(("character_id" = u32, Path, description = "The junior's character id")),
    request_body = KillActivityRequest,
    responses(
        (status = 200, description = "Activity processed", body = ActivityResultDto),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Junior has no senior, or cap exceeded")
    ),
    tag = "reputation"
)]
pub async fn register_kill_activity(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<u32>,
    Json(req): Json<KillActivityRequest>,
) -> ServerResult<Json<ActivityResultDto>> {
    let award = state
        .manager
        .register_kill_activity(character_id, req.kill_count)
        .await?;
    Ok(Json(ActivityResultDto::new(award)))
}

/// Register a junior's expedition reward, crediting its senior
#[utoipa::path(
    post,
    path = "/api/members/{character_id}/activities/expeditions",
    params(("character_id" = u32, Path, description = "The junior's character id")),
    request_body = ExpeditionActivityRequest,
    responses(
        (status = 200, description = "Activity processed", body = ActivityResultDto),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Junior has no senior, or cap exceeded")
    ),
    tag = "reputation"
)]
pub async fn register_expedition_activity(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<u32>,
    Json(req): Json<ExpeditionActivityRequest>,
) -> ServerResult<Json<ActivityResultDto>> {
    let award = state
        .manager
        .register_expedition_activity(character_id, req.coin_reward)
        .await?;
    Ok(Json(ActivityResultDto::new(award)))
}

/// Trigger the daily reputation reset on demand
#[utoipa::path(
    post,
    path = "/api/admin/reputation/reset",
    responses(
        (status = 200, description = "Reset executed", body = ResetResultDto)
    ),
    tag = "admin"
)]
pub async fn reset_daily_rep(
    State(state): State<Arc<AppState>>,
) -> ServerResult<Json<ResetResultDto>> {
    let result = state.manager.reset_daily_rep().await?;
    Ok(Json(ResetResultDto::from(result)))
}
