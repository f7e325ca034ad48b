//! Data transfer objects for the REST API

use chrono::{DateTime, Utc};
use kindred::models::{FamilyMember, DAILY_REP_CAP};
use kindred::processor::{BatchResetResult, RepAward};
use kindred::service::ReputationSummary;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A family member as exposed over the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub id: u32,
    pub character_id: u32,
    pub tenant_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub senior_id: Option<u32>,
    pub junior_ids: Vec<u32>,
    pub rep: u32,
    pub daily_rep: u32,
    pub level: u16,
    pub world: u8,
    pub map_id: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&FamilyMember> for MemberDto {
    fn from(member: &FamilyMember) -> Self {
        Self {
            id: member.id(),
            character_id: member.character_id(),
            tenant_id: member.tenant_id(),
            senior_id: member.senior_id(),
            junior_ids: member.junior_ids().to_vec(),
            rep: member.rep(),
            daily_rep: member.daily_rep(),
            level: member.level(),
            world: member.world(),
            map_id: member.map_id(),
            created_at: member.created_at(),
            updated_at: member.updated_at(),
        }
    }
}

impl From<FamilyMember> for MemberDto {
    fn from(member: FamilyMember) -> Self {
        Self::from(&member)
    }
}

/// Request to register a new family member
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    pub character_id: u32,
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    pub level: u16,
    pub world: u8,
    pub map_id: u32,
}

/// Request to link a junior under a senior
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddJuniorRequest {
    pub junior_id: u32,
    pub junior_level: u16,
    pub world: u8,
    pub map_id: u32,
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
}

/// Both sides of a created link
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkDto {
    pub senior: MemberDto,
    pub junior: MemberDto,
}

/// Request carrying an optional audit reason
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReasonRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Records rewritten by a cascade operation
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedMembersDto {
    pub updated: Vec<MemberDto>,
}

impl UpdatedMembersDto {
    pub fn new(members: Vec<FamilyMember>) -> Self {
        Self {
            updated: members.iter().map(MemberDto::from).collect(),
        }
    }
}

/// A member's family tree: senior, the member itself, direct juniors
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FamilyTreeDto {
    pub character_id: u32,
    pub members: Vec<MemberDto>,
}

/// Reputation standing for one member
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReputationDto {
    pub character_id: u32,
    pub rep: u32,
    pub daily_rep: u32,
    pub daily_rep_cap: u32,
    pub remaining_daily_rep: u32,
}

impl From<ReputationSummary> for ReputationDto {
    fn from(summary: ReputationSummary) -> Self {
        Self {
            character_id: summary.character_id,
            rep: summary.rep,
            daily_rep: summary.daily_rep,
            daily_rep_cap: summary.daily_rep_cap,
            remaining_daily_rep: summary.remaining_daily_rep,
        }
    }
}

/// Request to award reputation directly to a member
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwardRepRequest {
    pub amount: u32,
    #[serde(default)]
    pub source: Option<String>,
}

/// Request to deduct reputation from a member
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeductRepRequest {
    pub amount: u32,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request to register a junior's kill tally
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KillActivityRequest {
    pub kill_count: u32,
}

/// Request to register a junior's expedition reward
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpeditionActivityRequest {
    pub coin_reward: u32,
}

/// Outcome of an activity registration
///
/// `awarded` is zero (and `senior` absent) when the tally floored to
/// nothing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResultDto {
    pub awarded: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub senior: Option<MemberDto>,
}

impl ActivityResultDto {
    pub fn new(award: Option<RepAward>) -> Self {
        match award {
            Some(award) => Self {
                awarded: award.awarded,
                senior: Some(MemberDto::from(&award.senior)),
            },
            None => Self {
                awarded: 0,
                senior: None,
            },
        }
    }
}

/// Outcome of a daily reputation reset
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetResultDto {
    pub affected_count: u64,
    pub reset_at: DateTime<Utc>,
}

impl From<BatchResetResult> for ResetResultDto {
    fn from(result: BatchResetResult) -> Self {
        Self {
            affected_count: result.affected_count,
            reset_at: result.reset_at,
        }
    }
}

/// Health probe response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthDto {
    pub status: String,
    pub version: String,
    pub daily_rep_cap: u32,
}

impl HealthDto {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
            version: kindred::VERSION.to_string(),
            daily_rep_cap: DAILY_REP_CAP,
        }
    }
}
