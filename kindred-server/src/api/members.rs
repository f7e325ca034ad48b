//! Member and link management endpoints

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;

use crate::api::dto::{
    AddJuniorRequest, CreateMemberRequest, FamilyTreeDto, LinkDto, MemberDto, ReasonRequest,
    UpdatedMembersDto,
};
use crate::error::ServerResult;
use crate::state::AppState;

const DEFAULT_REASON: &str = "unspecified";

/// Register a new family member
#[utoipa::path(
    post,
    path = "/api/members",
    request_body = CreateMemberRequest,
    responses(
        (status = 201, description = "Member created", body = MemberDto),
        (status = 409, description = "Character already registered"),
        (status = 400, description = "Invalid member data")
    ),
    tag = "members"
)]
pub async fn create_member(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMemberRequest>,
) -> ServerResult<(StatusCode, Json<MemberDto>)> {
    let tenant_id = req.tenant_id.unwrap_or(state.config.default_tenant);
    let member = state
        .manager
        .create_member(req.character_id, tenant_id, req.level, req.world, req.map_id)
        .await?;
    Ok((StatusCode::CREATED, Json(MemberDto::from(member))))
}

/// Fetch one family member
#[utoipa::path(
    get,
    path = "/api/members/{character_id}",
    params(("character_id" = u32, Path, description = "External character id")),
    responses(
        (status = 200, description = "The member", body = MemberDto),
        (status = 404, description = "Member not found")
    ),
    tag = "members"
)]
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<u32>,
) -> ServerResult<Json<MemberDto>> {
    let member = state.manager.get_member(character_id).await?;
    Ok(Json(MemberDto::from(member)))
}

/// Remove a member permanently, cascading to linked records
#[utoipa::path(
    delete,
    path = "/api/members/{character_id}",
    params(
        ("character_id" = u32, Path, description = "External character id"),
        ("reason" = Option<String>, Query, description = "Audit reason")
    ),
    responses(
        (status = 200, description = "Member removed", body = UpdatedMembersDto),
        (status = 404, description = "Member not found")
    ),
    tag = "members"
)]
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<u32>,
    Query(query): Query<ReasonRequest>,
) -> ServerResult<Json<UpdatedMembersDto>> {
    let reason = query.reason.as_deref().unwrap_or(DEFAULT_REASON);
    let updated = state.manager.remove_member(character_id, reason).await?;
    Ok(Json(UpdatedMembersDto::new(updated)))
}

/// Fetch a member's family tree (senior, self, direct juniors)
#[utoipa::path(
    get,
    path = "/api/members/{character_id}/tree",
    params(("character_id" = u32, Path, description = "External character id")),
    responses(
        (status = 200, description = "The family tree", body = FamilyTreeDto),
        (status = 404, description = "Member not found")
    ),
    tag = "members"
)]
pub async fn get_family_tree(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<u32>,
) -> ServerResult<Json<FamilyTreeDto>> {
    let members = state.manager.get_family_tree(character_id).await?;
    Ok(Json(FamilyTreeDto {
        character_id,
        members: members.iter().map(MemberDto::from).collect(),
    }))
}

/// Link a junior under this senior
#[utoipa::path(
    post,
    path = "/api/members/{character_id}/juniors",
    params(("character_id" = u32, Path, description = "The senior's character id")),
    request_body = AddJuniorRequest,
    responses(
        (status = 201, description = "Link created", body = LinkDto),
        (status = 404, description = "Senior not registered"),
        (status = 409, description = "Senior full or junior already linked"),
        (status = 400, description = "Level gap or location mismatch")
    ),
    tag = "members"
)]
pub async fn add_junior(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<u32>,
    Json(req): Json<AddJuniorRequest>,
) -> ServerResult<(StatusCode, Json<LinkDto>)> {
    let tenant_id = req.tenant_id.unwrap_or(state.config.default_tenant);
    let pair = state
        .manager
        .add_junior(
            character_id,
            req.junior_id,
            tenant_id,
            req.junior_level,
            req.world,
            req.map_id,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(LinkDto {
            senior: MemberDto::from(pair.senior),
            junior: MemberDto::from(pair.junior),
        }),
    ))
}

/// Break every link the member participates in
#[utoipa::path(
    post,
    path = "/api/members/{character_id}/break-link",
    params(("character_id" = u32, Path, description = "External character id")),
    request_body = ReasonRequest,
    responses(
        (status = 200, description = "Links broken", body = UpdatedMembersDto),
        (status = 404, description = "Member not found"),
        (status = 409, description = "No link exists to break")
    ),
    tag = "members"
)]
pub async fn break_link(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<u32>,
    Json(req): Json<ReasonRequest>,
) -> ServerResult<Json<UpdatedMembersDto>> {
    let reason = req.reason.as_deref().unwrap_or(DEFAULT_REASON);
    let updated = state.manager.break_link(character_id, reason).await?;
    Ok(Json(UpdatedMembersDto::new(updated)))
}

/// Dissolve the member's subtree: every direct junior, then the senior
#[utoipa::path(
    post,
    path = "/api/members/{character_id}/dissolve",
    params(("character_id" = u32, Path, description = "The senior's character id")),
    request_body = ReasonRequest,
    responses(
        (status = 200, description = "Subtree dissolved", body = UpdatedMembersDto),
        (status = 404, description = "Member not found"),
        (status = 500, description = "Dissolution failed partway")
    ),
    tag = "members"
)]
pub async fn dissolve_subtree(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<u32>,
    Json(req): Json<ReasonRequest>,
) -> ServerResult<Json<UpdatedMembersDto>> {
    let reason = req.reason.as_deref().unwrap_or(DEFAULT_REASON);
    let updated = state.manager.dissolve_subtree(character_id, reason).await?;
    Ok(Json(UpdatedMembersDto::new(updated)))
}
