//! Pure domain validation predicates
//!
//! Stateless checks shared by the builder and the relationship processor.
//! Each failing predicate reports a specific [`ValidationError`] kind so that
//! callers can match on the cause without string comparison.

use uuid::Uuid;

use super::member::{DAILY_REP_CAP, MAX_JUNIORS, MAX_LEVEL_GAP};

/// Error kinds produced by domain validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("character id must be non-zero")]
    InvalidCharacterId,

    #[error("tenant id must not be nil")]
    InvalidTenantId,

    #[error("level must be greater than zero")]
    InvalidLevel,

    #[error("cannot have more than {max} juniors (got {count})")]
    TooManyJuniors { count: usize, max: usize },

    #[error("character {character_id} cannot reference itself")]
    SelfReference { character_id: u32 },

    #[error("junior {junior_id} appears more than once")]
    DuplicateJunior { junior_id: u32 },

    #[error("daily rep {daily_rep} exceeds the cap of {cap}")]
    DailyRepOutOfRange { daily_rep: u32, cap: u32 },
}

/// A character id is valid when non-zero.
pub fn validate_character_id(character_id: u32) -> Result<(), ValidationError> {
    if character_id == 0 {
        return Err(ValidationError::InvalidCharacterId);
    }
    Ok(())
}

/// A tenant id is valid when non-nil.
pub fn validate_tenant_id(tenant_id: Uuid) -> Result<(), ValidationError> {
    if tenant_id.is_nil() {
        return Err(ValidationError::InvalidTenantId);
    }
    Ok(())
}

/// A level is valid when greater than zero.
pub fn validate_level(level: u16) -> Result<(), ValidationError> {
    if level == 0 {
        return Err(ValidationError::InvalidLevel);
    }
    Ok(())
}

/// Validate a junior set: bounded fanout, no self-reference, no duplicates.
pub fn validate_junior_set(character_id: u32, junior_ids: &[u32]) -> Result<(), ValidationError> {
    if junior_ids.len() > MAX_JUNIORS {
        return Err(ValidationError::TooManyJuniors {
            count: junior_ids.len(),
            max: MAX_JUNIORS,
        });
    }

    for (i, &junior_id) in junior_ids.iter().enumerate() {
        if junior_id == character_id {
            return Err(ValidationError::SelfReference { character_id });
        }
        if junior_ids[..i].contains(&junior_id) {
            return Err(ValidationError::DuplicateJunior { junior_id });
        }
    }

    Ok(())
}

/// A senior reference is valid when it does not point back at the member.
pub fn validate_senior(character_id: u32, senior_id: Option<u32>) -> Result<(), ValidationError> {
    if senior_id == Some(character_id) {
        return Err(ValidationError::SelfReference { character_id });
    }
    Ok(())
}

/// A daily rep value is valid when within `[0, DAILY_REP_CAP]`.
pub fn validate_daily_rep(daily_rep: u32) -> Result<(), ValidationError> {
    if daily_rep > DAILY_REP_CAP {
        return Err(ValidationError::DailyRepOutOfRange {
            daily_rep,
            cap: DAILY_REP_CAP,
        });
    }
    Ok(())
}

/// True iff `current + additional` stays within the daily cap.
pub fn validate_daily_rep_cap(current: u32, additional: u32) -> bool {
    current
        .checked_add(additional)
        .is_some_and(|total| total <= DAILY_REP_CAP)
}

/// True iff the level gap between two characters is within the allowed range.
pub fn validate_level_difference(a: u16, b: u16) -> bool {
    a.abs_diff(b) <= MAX_LEVEL_GAP
}

/// True iff both characters are on the same world and map.
pub fn validate_same_location(world_a: u8, map_a: u32, world_b: u8, map_b: u32) -> bool {
    world_a == world_b && map_a == map_b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_id_must_be_non_zero() {
        assert!(validate_character_id(0).is_err());
        assert!(validate_character_id(1).is_ok());
    }

    #[test]
    fn tenant_id_must_be_non_nil() {
        assert!(validate_tenant_id(Uuid::nil()).is_err());
        assert!(validate_tenant_id(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn level_must_be_positive() {
        assert!(validate_level(0).is_err());
        assert!(validate_level(1).is_ok());
        assert!(validate_level(250).is_ok());
    }

    #[test]
    fn junior_set_accepts_up_to_two() {
        assert!(validate_junior_set(1000, &[]).is_ok());
        assert!(validate_junior_set(1000, &[2000]).is_ok());
        assert!(validate_junior_set(1000, &[2000, 3000]).is_ok());
        assert!(matches!(
            validate_junior_set(1000, &[2000, 3000, 4000]),
            Err(ValidationError::TooManyJuniors { count: 3, .. })
        ));
    }

    #[test]
    fn junior_set_rejects_self_and_duplicates() {
        assert!(matches!(
            validate_junior_set(1000, &[1000]),
            Err(ValidationError::SelfReference { character_id: 1000 })
        ));
        assert!(matches!(
            validate_junior_set(1000, &[2000, 2000]),
            Err(ValidationError::DuplicateJunior { junior_id: 2000 })
        ));
    }

    #[test]
    fn senior_cannot_be_self() {
        assert!(validate_senior(1000, None).is_ok());
        assert!(validate_senior(1000, Some(2000)).is_ok());
        assert!(validate_senior(1000, Some(1000)).is_err());
    }

    #[test]
    fn daily_rep_cap_arithmetic() {
        assert!(validate_daily_rep_cap(0, DAILY_REP_CAP));
        assert!(validate_daily_rep_cap(4500, 500));
        assert!(!validate_daily_rep_cap(4500, 501));
        assert!(validate_daily_rep_cap(DAILY_REP_CAP, 0));
        // Overflow must not wrap into acceptance.
        assert!(!validate_daily_rep_cap(u32::MAX, 1));
    }

    #[test]
    fn level_difference_bounds() {
        assert!(validate_level_difference(40, 60));
        assert!(validate_level_difference(60, 40));
        assert!(!validate_level_difference(40, 61));
        assert!(validate_level_difference(10, 10));
    }

    #[test]
    fn location_match_is_strict() {
        assert!(validate_same_location(0, 100, 0, 100));
        assert!(!validate_same_location(0, 100, 1, 100));
        assert!(!validate_same_location(0, 100, 0, 101));
    }
}
