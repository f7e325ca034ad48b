//! Daily reputation reset scheduler
//!
//! A single background loop that fires [`FamilyManager::reset_daily_rep`]
//! once per day at a configured wall-clock time. A failed reset is logged
//! (and surfaced as a rep-error event by the manager) and the loop advances
//! to the next day; shutdown interrupts the sleep without firing, while a
//! reset already in flight runs to completion.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::service::FamilyManager;
use crate::storage::traits::MemberStore;
use crate::{KindredError, Result};

/// Largest supported UTC offset, matching real-world zones (±18h).
const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// When the daily reset fires.
///
/// The time zone is expressed as a fixed offset from UTC in minutes; the
/// default is midnight UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Hour of day the reset fires, 0-23.
    pub reset_hour: u8,

    /// Minute of the hour the reset fires, 0-59.
    pub reset_minute: u8,

    /// Offset from UTC in minutes applied to the reset time.
    pub utc_offset_minutes: i32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reset_hour: 0,
            reset_minute: 0,
            utc_offset_minutes: 0,
        }
    }
}

impl SchedulerConfig {
    /// Validate the configured fire time. Run once at startup.
    pub fn validate(&self) -> Result<()> {
        if self.reset_hour > 23 {
            return Err(KindredError::Configuration(format!(
                "reset hour must be 0-23, got {}",
                self.reset_hour
            )));
        }
        if self.reset_minute > 59 {
            return Err(KindredError::Configuration(format!(
                "reset minute must be 0-59, got {}",
                self.reset_minute
            )));
        }
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(KindredError::Configuration(format!(
                "utc offset must be within ±{MAX_UTC_OFFSET_MINUTES} minutes, got {}",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }
}

/// The daily reset loop.
#[derive(Debug)]
pub struct ResetScheduler<S: MemberStore> {
    manager: Arc<FamilyManager<S>>,
    config: SchedulerConfig,
}

impl<S: MemberStore> ResetScheduler<S> {
    /// Create a scheduler, validating the configuration.
    pub fn new(manager: Arc<FamilyManager<S>>, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { manager, config })
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// The next instant the reset should fire, strictly after `now`.
    ///
    /// Today's configured wall-clock time in the configured offset; if that
    /// has already passed, exactly one day later.
    pub fn next_fire_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let offset = Duration::minutes(i64::from(self.config.utc_offset_minutes));
        let local_now = now + offset;

        let local_fire = local_now.date_naive().and_time(NaiveTime::MIN)
            + Duration::hours(i64::from(self.config.reset_hour))
            + Duration::minutes(i64::from(self.config.reset_minute));
        let fire = DateTime::<Utc>::from_naive_utc_and_offset(local_fire - offset, Utc);

        if fire <= now {
            fire + Duration::days(1)
        } else {
            fire
        }
    }

    /// Run the loop until the shutdown signal changes.
    ///
    /// A reset failure is never fatal: it is logged and the loop schedules
    /// the next day's fire. Cancellation during the sleep exits without
    /// firing.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            reset_hour = self.config.reset_hour,
            reset_minute = self.config.reset_minute,
            utc_offset_minutes = self.config.utc_offset_minutes,
            "reputation reset scheduler started"
        );

        loop {
            let now = Utc::now();
            let next_fire = self.next_fire_after(now);
            let sleep = (next_fire - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);

            info!(next_fire = %next_fire, "next reputation reset scheduled");

            tokio::select! {
                _ = shutdown.changed() => {
                    info!("reputation reset scheduler stopped");
                    return;
                }
                _ = tokio::time::sleep(sleep) => {
                    match self.manager.reset_daily_rep().await {
                        Ok(result) => {
                            info!(
                                affected_count = result.affected_count,
                                reset_at = %result.reset_at,
                                "daily reputation reset completed"
                            );
                        }
                        Err(err) => {
                            error!(error = %err, "daily reputation reset failed");
                        }
                    }
                }
            }
        }
    }

    /// Spawn the loop onto the runtime.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SinkRegistry;
    use crate::storage::InMemoryMemberStore;
    use chrono::TimeZone;

    fn scheduler(config: SchedulerConfig) -> ResetScheduler<InMemoryMemberStore> {
        let store = Arc::new(InMemoryMemberStore::new());
        let manager = Arc::new(FamilyManager::new(store, SinkRegistry::new()));
        ResetScheduler::new(manager, config).unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn rejects_out_of_range_config() {
        assert!(SchedulerConfig {
            reset_hour: 24,
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(SchedulerConfig {
            reset_minute: 60,
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(SchedulerConfig {
            utc_offset_minutes: 19 * 60,
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(SchedulerConfig::default().validate().is_ok());
    }

    #[tokio::test]
    async fn fires_later_today_when_not_yet_past() {
        let s = scheduler(SchedulerConfig {
            reset_hour: 2,
            reset_minute: 30,
            utc_offset_minutes: 0,
        });
        let next = s.next_fire_after(utc(2024, 3, 10, 1, 0));
        assert_eq!(next, utc(2024, 3, 10, 2, 30));
    }

    #[tokio::test]
    async fn started_after_todays_slot_fires_tomorrow() {
        // Configured 02:30 UTC, started 03:00 UTC on day N: first fire is
        // 02:30 UTC on day N+1.
        let s = scheduler(SchedulerConfig {
            reset_hour: 2,
            reset_minute: 30,
            utc_offset_minutes: 0,
        });
        let next = s.next_fire_after(utc(2024, 3, 10, 3, 0));
        assert_eq!(next, utc(2024, 3, 11, 2, 30));
    }

    #[tokio::test]
    async fn exact_fire_time_advances_a_full_day() {
        let s = scheduler(SchedulerConfig {
            reset_hour: 2,
            reset_minute: 30,
            utc_offset_minutes: 0,
        });
        let next = s.next_fire_after(utc(2024, 3, 10, 2, 30));
        assert_eq!(next, utc(2024, 3, 11, 2, 30));
    }

    #[tokio::test]
    async fn offset_shifts_the_utc_fire_instant() {
        // Midnight at UTC+9 is 15:00 UTC the previous day.
        let s = scheduler(SchedulerConfig {
            reset_hour: 0,
            reset_minute: 0,
            utc_offset_minutes: 9 * 60,
        });
        let next = s.next_fire_after(utc(2024, 3, 10, 12, 0));
        assert_eq!(next, utc(2024, 3, 10, 15, 0));

        let after = s.next_fire_after(utc(2024, 3, 10, 16, 0));
        assert_eq!(after, utc(2024, 3, 11, 15, 0));
    }

    #[tokio::test]
    async fn negative_offset_shifts_the_other_way() {
        // Midnight at UTC-5 is 05:00 UTC the same day.
        let s = scheduler(SchedulerConfig {
            reset_hour: 0,
            reset_minute: 0,
            utc_offset_minutes: -5 * 60,
        });
        let next = s.next_fire_after(utc(2024, 3, 10, 3, 0));
        assert_eq!(next, utc(2024, 3, 10, 5, 0));
    }

    #[tokio::test]
    async fn shutdown_interrupts_the_sleep_without_firing() {
        let store = Arc::new(InMemoryMemberStore::new());
        let manager = Arc::new(FamilyManager::new(
            Arc::clone(&store),
            SinkRegistry::new(),
        ));
        let s = ResetScheduler::new(
            manager,
            SchedulerConfig {
                reset_hour: 23,
                reset_minute: 59,
                utc_offset_minutes: 0,
            },
        )
        .unwrap();

        let (tx, rx) = watch::channel(false);
        let handle = s.spawn(rx);

        tx.send(true).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("scheduler did not stop on shutdown")
            .unwrap();
    }
}
