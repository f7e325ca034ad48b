//! Processor behaviour tests against the in-memory store

use std::sync::Arc;

use uuid::Uuid;

use super::*;
use crate::models::{MemberBuilder, DAILY_REP_CAP};
use crate::storage::InMemoryMemberStore;

const WORLD: u8 = 0;
const MAP: u32 = 100_000_000;

fn processor() -> FamilyProcessor<InMemoryMemberStore> {
    FamilyProcessor::new(Arc::new(InMemoryMemberStore::new()))
}

async fn seed(p: &FamilyProcessor<InMemoryMemberStore>, character_id: u32, level: u16) {
    seed_at(p, character_id, level, WORLD, MAP).await;
}

async fn seed_at(
    p: &FamilyProcessor<InMemoryMemberStore>,
    character_id: u32,
    level: u16,
    world: u8,
    map_id: u32,
) {
    let member = MemberBuilder::new(character_id, Uuid::new_v4(), level, world, map_id)
        .build()
        .unwrap();
    p.store().save(member).await.unwrap();
}

async fn assert_invariants(p: &FamilyProcessor<InMemoryMemberStore>) {
    for member in p.store().list().await.unwrap() {
        assert!(member.junior_count() <= 2, "fanout bound violated");
        assert_ne!(member.senior_id(), Some(member.character_id()));
        assert!(!member.has_junior(member.character_id()));
        assert!(member.daily_rep() <= DAILY_REP_CAP);

        // Bidirectional consistency: every listed junior points back, and
        // every senior pointer is mirrored in that senior's junior list.
        for &junior_id in member.junior_ids() {
            let junior = p.store().get(junior_id).await.unwrap().unwrap();
            assert_eq!(junior.senior_id(), Some(member.character_id()));
        }
        if let Some(senior_id) = member.senior_id() {
            let senior = p.store().get(senior_id).await.unwrap().unwrap();
            assert!(senior.has_junior(member.character_id()));
        }
    }
}

mod link {
    use super::*;

    #[tokio::test]
    async fn creates_a_bidirectional_relationship() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;

        let pair = p.link(1000, 2000).await.unwrap();
        assert!(pair.senior.has_junior(2000));
        assert_eq!(pair.junior.senior_id(), Some(1000));

        let senior = p.get_by_character_id(1000).await.unwrap();
        let junior = p.get_by_character_id(2000).await.unwrap();
        assert!(senior.has_junior(2000));
        assert_eq!(junior.senior_id(), Some(1000));
        assert_invariants(&p).await;
    }

    #[tokio::test]
    async fn rejects_self_reference() {
        let p = processor();
        seed(&p, 1000, 45).await;
        let err = p.link(1000, 1000).await.unwrap_err();
        assert!(matches!(err, KindredError::SelfReference { character_id: 1000 }));
    }

    #[tokio::test]
    async fn rejects_missing_members() {
        let p = processor();
        let err = p.link(1000, 2000).await.unwrap_err();
        assert!(matches!(err, KindredError::SeniorNotFound { senior_id: 1000 }));

        seed(&p, 1000, 45).await;
        let err = p.link(1000, 2000).await.unwrap_err();
        assert!(matches!(err, KindredError::JuniorNotFound { junior_id: 2000 }));
    }

    #[tokio::test]
    async fn rejects_a_full_senior() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;
        seed(&p, 3000, 40).await;
        seed(&p, 4000, 40).await;

        p.link(1000, 2000).await.unwrap();
        p.link(1000, 3000).await.unwrap();
        let err = p.link(1000, 4000).await.unwrap_err();
        assert!(matches!(err, KindredError::SeniorFull { senior_id: 1000 }));

        // The rejected junior is untouched.
        let junior = p.get_by_character_id(4000).await.unwrap();
        assert_eq!(junior.senior_id(), None);
        assert_invariants(&p).await;
    }

    #[tokio::test]
    async fn linking_twice_reports_the_existing_senior() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;

        p.link(1000, 2000).await.unwrap();
        let err = p.link(1000, 2000).await.unwrap_err();
        assert!(matches!(
            err,
            KindredError::JuniorAlreadyLinked {
                junior_id: 2000,
                senior_id: 1000
            }
        ));

        // No duplicate entry was inserted.
        let senior = p.get_by_character_id(1000).await.unwrap();
        assert_eq!(senior.junior_ids(), &[2000]);
    }

    #[tokio::test]
    async fn rejects_a_junior_claimed_by_another_senior() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 1001, 45).await;
        seed(&p, 2000, 40).await;

        p.link(1000, 2000).await.unwrap();
        let err = p.link(1001, 2000).await.unwrap_err();
        assert!(matches!(
            err,
            KindredError::JuniorAlreadyLinked {
                junior_id: 2000,
                senior_id: 1000
            }
        ));
    }

    #[tokio::test]
    async fn rejects_a_level_gap_over_twenty() {
        let p = processor();
        seed(&p, 1000, 40).await;
        seed(&p, 2000, 61).await;

        let err = p.link(1000, 2000).await.unwrap_err();
        assert!(matches!(
            err,
            KindredError::LevelGapTooLarge {
                senior_level: 40,
                junior_level: 61
            }
        ));

        // Exactly twenty apart is allowed.
        seed(&p, 3000, 60).await;
        p.link(1000, 3000).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_location_mismatch_without_partial_state() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed_at(&p, 2000, 40, 1, MAP).await;
        seed_at(&p, 3000, 40, WORLD, MAP + 1).await;

        assert!(matches!(
            p.link(1000, 2000).await.unwrap_err(),
            KindredError::LocationMismatch { .. }
        ));
        assert!(matches!(
            p.link(1000, 3000).await.unwrap_err(),
            KindredError::LocationMismatch { .. }
        ));

        // Neither side was mutated by the rejected attempts.
        let senior = p.get_by_character_id(1000).await.unwrap();
        assert!(!senior.has_juniors());
        assert_eq!(p.get_by_character_id(2000).await.unwrap().senior_id(), None);
    }

    #[tokio::test]
    async fn concurrent_links_cannot_overfill_a_senior() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;
        seed(&p, 3000, 40).await;
        seed(&p, 4000, 40).await;
        p.link(1000, 2000).await.unwrap();

        // One junior slot left, two racing link calls: exactly one may win.
        let p_a = p.clone();
        let p_b = p.clone();
        let a = tokio::spawn(async move { p_a.link(1000, 3000).await });
        let b = tokio::spawn(async move { p_b.link(1000, 4000).await });
        let results = [a.await.unwrap(), b.await.unwrap()];

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(KindredError::SeniorFull { senior_id: 1000 })
        )));

        let senior = p.get_by_character_id(1000).await.unwrap();
        assert_eq!(senior.junior_count(), 2);
        assert_invariants(&p).await;
    }
}

mod unlink {
    use super::*;

    #[tokio::test]
    async fn restores_both_sides() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;
        p.link(1000, 2000).await.unwrap();

        p.unlink(2000).await.unwrap();

        let senior = p.get_by_character_id(1000).await.unwrap();
        let junior = p.get_by_character_id(2000).await.unwrap();
        assert!(!senior.has_junior(2000));
        assert_eq!(junior.senior_id(), None);
        assert_invariants(&p).await;
    }

    #[tokio::test]
    async fn clears_both_directions_for_a_mid_tree_member() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;
        seed(&p, 3000, 35).await;
        p.link(1000, 2000).await.unwrap();
        p.link(2000, 3000).await.unwrap();

        // 2000 has a senior (1000) and a junior (3000); both sides go.
        let updated = p.unlink(2000).await.unwrap();
        assert_eq!(updated.len(), 3);

        assert!(!p.get_by_character_id(1000).await.unwrap().has_juniors());
        let middle = p.get_by_character_id(2000).await.unwrap();
        assert_eq!(middle.senior_id(), None);
        assert!(!middle.has_juniors());
        assert_eq!(p.get_by_character_id(3000).await.unwrap().senior_id(), None);
        assert_invariants(&p).await;
    }

    #[tokio::test]
    async fn fails_when_no_relation_exists() {
        let p = processor();
        seed(&p, 1000, 45).await;
        let err = p.unlink(1000).await.unwrap_err();
        assert!(matches!(err, KindredError::NoLinkToBreak { character_id: 1000 }));
    }

    #[tokio::test]
    async fn fails_for_unknown_members() {
        let p = processor();
        let err = p.unlink(9999).await.unwrap_err();
        assert!(matches!(err, KindredError::MemberNotFound { character_id: 9999 }));
    }
}

mod remove {
    use super::*;

    #[tokio::test]
    async fn deletes_the_record_and_cascades() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;
        seed(&p, 3000, 35).await;
        p.link(1000, 2000).await.unwrap();
        p.link(2000, 3000).await.unwrap();

        let updated = p.remove(2000).await.unwrap();
        assert_eq!(updated.len(), 2);

        assert!(p.store().get(2000).await.unwrap().is_none());
        assert!(!p.get_by_character_id(1000).await.unwrap().has_junior(2000));
        assert_eq!(p.get_by_character_id(3000).await.unwrap().senior_id(), None);
        assert_invariants(&p).await;
    }

    #[tokio::test]
    async fn removing_a_root_frees_its_juniors() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;
        seed(&p, 3000, 40).await;
        p.link(1000, 2000).await.unwrap();
        p.link(1000, 3000).await.unwrap();

        p.remove(1000).await.unwrap();

        assert!(p.store().get(1000).await.unwrap().is_none());
        assert_eq!(p.get_by_character_id(2000).await.unwrap().senior_id(), None);
        assert_eq!(p.get_by_character_id(3000).await.unwrap().senior_id(), None);
    }
}

mod dissolve {
    use super::*;

    #[tokio::test]
    async fn removes_juniors_then_the_senior() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;
        seed(&p, 3000, 40).await;
        p.link(1000, 2000).await.unwrap();
        p.link(1000, 3000).await.unwrap();

        p.dissolve_subtree(1000).await.unwrap();

        assert!(p.store().get(1000).await.unwrap().is_none());
        assert!(p.store().get(2000).await.unwrap().is_none());
        assert!(p.store().get(3000).await.unwrap().is_none());
        assert_eq!(p.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_senior_reports_empty_progress() {
        let p = processor();
        let err = p.dissolve_subtree(1000).await.unwrap_err();
        assert!(err.updated.is_empty());
        assert!(matches!(
            err.source,
            KindredError::MemberNotFound { character_id: 1000 }
        ));
    }
}

mod reputation {
    use super::*;

    #[tokio::test]
    async fn award_increments_both_counters() {
        let p = processor();
        seed(&p, 1000, 45).await;

        let member = p.award_rep(1000, 250).await.unwrap();
        assert_eq!(member.rep(), 250);
        assert_eq!(member.daily_rep(), 250);

        let member = p.award_rep(1000, 50).await.unwrap();
        assert_eq!(member.rep(), 300);
        assert_eq!(member.daily_rep(), 300);
    }

    #[tokio::test]
    async fn cap_rejection_leaves_no_partial_increment() {
        let p = processor();
        seed(&p, 1000, 45).await;

        p.award_rep(1000, 4500).await.unwrap();
        let err = p.award_rep(1000, 600).await.unwrap_err();
        assert!(matches!(
            err,
            KindredError::RepCapExceeded {
                character_id: 1000,
                daily_rep: 4500,
                attempted: 600
            }
        ));

        let member = p.get_by_character_id(1000).await.unwrap();
        assert_eq!(member.daily_rep(), 4500);
        assert_eq!(member.rep(), 4500);

        // Filling exactly to the cap is allowed.
        let member = p.award_rep(1000, 500).await.unwrap();
        assert_eq!(member.daily_rep(), DAILY_REP_CAP);
    }

    #[tokio::test]
    async fn deduct_touches_lifetime_rep_only() {
        let p = processor();
        seed(&p, 1000, 45).await;
        p.award_rep(1000, 1000).await.unwrap();

        let member = p.deduct_rep(1000, 400).await.unwrap();
        assert_eq!(member.rep(), 600);
        assert_eq!(member.daily_rep(), 1000);
    }

    #[tokio::test]
    async fn deduct_rejects_overdraw() {
        let p = processor();
        seed(&p, 1000, 45).await;
        p.award_rep(1000, 100).await.unwrap();

        let err = p.deduct_rep(1000, 101).await.unwrap_err();
        assert!(matches!(
            err,
            KindredError::InsufficientRep {
                character_id: 1000,
                available: 100,
                attempted: 101
            }
        ));
        assert_eq!(p.get_by_character_id(1000).await.unwrap().rep(), 100);
    }

    #[tokio::test]
    async fn reset_counts_only_dirty_members_once() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 45).await;
        seed(&p, 3000, 45).await;
        p.award_rep(1000, 100).await.unwrap();
        p.award_rep(2000, 200).await.unwrap();

        let first = p.reset_daily_rep().await.unwrap();
        assert_eq!(first.affected_count, 2);

        let second = p.reset_daily_rep().await.unwrap();
        assert_eq!(second.affected_count, 0);

        // Lifetime totals survive the reset.
        let member = p.get_by_character_id(1000).await.unwrap();
        assert_eq!(member.rep(), 100);
        assert_eq!(member.daily_rep(), 0);
    }
}

mod senior_awards {
    use super::*;

    #[tokio::test]
    async fn credits_the_full_amount_to_a_higher_level_senior() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;
        p.link(1000, 2000).await.unwrap();

        let award = p.award_rep_to_senior(2000, 100, "quest").await.unwrap();
        assert_eq!(award.awarded, 100);
        assert_eq!(award.senior.character_id(), 1000);
        assert_eq!(award.senior.rep(), 100);
    }

    #[tokio::test]
    async fn halves_the_award_when_the_junior_outlevels() {
        let p = processor();
        seed(&p, 1000, 40).await;
        seed(&p, 2000, 60).await;
        p.link(1000, 2000).await.unwrap();

        let award = p.award_rep_to_senior(2000, 100, "quest").await.unwrap();
        assert_eq!(award.awarded, 50);
        assert_eq!(award.senior.rep(), 50);
        assert_eq!(award.senior.daily_rep(), 50);
    }

    #[tokio::test]
    async fn equal_levels_are_not_penalized() {
        let p = processor();
        seed(&p, 1000, 50).await;
        seed(&p, 2000, 50).await;
        p.link(1000, 2000).await.unwrap();

        let award = p.award_rep_to_senior(2000, 101, "quest").await.unwrap();
        assert_eq!(award.awarded, 101);
    }

    #[tokio::test]
    async fn unlinked_junior_has_no_senior_to_credit() {
        let p = processor();
        seed(&p, 2000, 40).await;
        let err = p.award_rep_to_senior(2000, 100, "quest").await.unwrap_err();
        assert!(matches!(err, KindredError::NoSenior { junior_id: 2000 }));
    }

    #[tokio::test]
    async fn senior_cap_applies_to_derived_awards() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;
        p.link(1000, 2000).await.unwrap();
        p.award_rep(1000, 4950).await.unwrap();

        let err = p.award_rep_to_senior(2000, 100, "quest").await.unwrap_err();
        assert!(matches!(err, KindredError::RepCapExceeded { .. }));
        assert_eq!(p.get_by_character_id(1000).await.unwrap().daily_rep(), 4950);
    }
}

mod activities {
    use super::*;

    #[tokio::test]
    async fn mob_kills_earn_two_rep_per_five_kills() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;
        p.link(1000, 2000).await.unwrap();

        let award = p.process_activity(2000, "mob_kill", 12).await.unwrap();
        assert_eq!(award.unwrap().awarded, 4);
        assert_eq!(p.get_by_character_id(1000).await.unwrap().rep(), 4);
    }

    #[tokio::test]
    async fn a_tally_below_threshold_is_a_noop() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;
        p.link(1000, 2000).await.unwrap();

        let award = p.process_activity(2000, "mob_kill", 4).await.unwrap();
        assert!(award.is_none());
        assert_eq!(p.get_by_character_id(1000).await.unwrap().rep(), 0);
    }

    #[tokio::test]
    async fn expeditions_earn_ten_rep_per_coin() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;
        p.link(1000, 2000).await.unwrap();

        let award = p.process_activity(2000, "expedition", 3).await.unwrap();
        assert_eq!(award.unwrap().awarded, 30);
    }

    #[tokio::test]
    async fn unknown_activity_types_are_rejected() {
        let p = processor();
        seed(&p, 2000, 40).await;
        let err = p.process_activity(2000, "fishing", 10).await.unwrap_err();
        assert!(matches!(err, KindredError::InvalidActivityType { .. }));
    }

    #[tokio::test]
    async fn zero_noop_never_reaches_the_senior_lookup() {
        // Even an unlinked junior gets a clean no-op for a sub-threshold
        // tally, since no award is attempted.
        let p = processor();
        seed(&p, 2000, 40).await;
        let award = p.process_activity(2000, "mob_kill", 4).await.unwrap();
        assert!(award.is_none());
    }
}

mod tree {
    use super::*;

    #[tokio::test]
    async fn tree_contains_senior_self_and_juniors() {
        let p = processor();
        seed(&p, 1000, 45).await;
        seed(&p, 2000, 40).await;
        seed(&p, 3000, 35).await;
        p.link(1000, 2000).await.unwrap();
        p.link(2000, 3000).await.unwrap();

        let tree = p.get_family_tree(2000).await.unwrap();
        let ids: Vec<u32> = tree.iter().map(|m| m.character_id()).collect();
        assert_eq!(ids, vec![1000, 2000, 3000]);
    }

    #[tokio::test]
    async fn a_root_without_juniors_is_alone_in_its_tree() {
        let p = processor();
        seed(&p, 1000, 45).await;
        let tree = p.get_family_tree(1000).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].character_id(), 1000);
    }
}
