//! Cron-driven trigger for the daily digest.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use tracing::{info, warn};

use crate::digest::DigestService;
use crate::error::{BotError, Result};

/// A cron expression evaluated in a fixed timezone.
#[derive(Debug, Clone)]
pub struct DigestSchedule {
    schedule: Schedule,
    timezone: Tz,
}

impl DigestSchedule {
    /// Parse a cron expression (seconds field first) and an IANA timezone name.
    pub fn parse(expression: &str, timezone: &str) -> Result<Self> {
        let schedule = Schedule::from_str(expression).map_err(|e| BotError::InvalidConfig {
            setting: "DIGEST_CRON",
            reason: format!("invalid cron expression '{}': {}", expression, e),
        })?;
        let timezone = parse_timezone(timezone)?;
        Ok(Self { schedule, timezone })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// First firing strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&after.with_timezone(&self.timezone))
            .next()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Firings strictly after `start`, in order. Each one is computed from the
    /// previous firing, so moving the wall clock never yields a firing twice.
    pub fn firings(&self, start: DateTime<Utc>) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.schedule
            .after(&start.with_timezone(&self.timezone))
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Parse an IANA timezone name such as `Asia/Kolkata`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>().map_err(|e| BotError::InvalidConfig {
        setting: "DIGEST_TIMEZONE",
        reason: format!("invalid timezone '{}': {}", name, e),
    })
}

/// Background task: sleep until each firing and run the digest.
///
/// Firings that already passed while the task was busy or suspended are
/// skipped rather than replayed.
pub async fn digest_loop(schedule: DigestSchedule, digest: Arc<DigestService>) {
    for next in schedule.firings(Utc::now()) {
        let now = Utc::now();
        if next < now {
            warn!(missed = %next, "Skipping missed daily commit summary");
            continue;
        }

        info!(next = %next.with_timezone(&schedule.timezone()), "Next daily commit summary scheduled");
        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        info!("Cron job triggered: sending daily commit summary");
        let outcome = digest.run(Utc::now()).await;
        info!(?outcome, "Scheduled digest finished");
    }

    warn!("Digest schedule has no future firing; stopping scheduler");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_after_respects_timezone() {
        let schedule = DigestSchedule::parse("0 0 7 * * *", "Asia/Kolkata").unwrap();

        // 2026-10-18 00:00 UTC is 05:30 in Kolkata; 07:00 local is 01:30 UTC.
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
        assert_eq!(
            schedule.next_after(now),
            Some(Utc.with_ymd_and_hms(2026, 10, 18, 1, 30, 0).unwrap())
        );

        let later = Utc.with_ymd_and_hms(2026, 10, 18, 2, 0, 0).unwrap();
        assert_eq!(
            schedule.next_after(later),
            Some(Utc.with_ymd_and_hms(2026, 10, 19, 1, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_invalid_cron_is_config_error() {
        let err = DigestSchedule::parse("every morning", "UTC").unwrap_err();
        assert!(matches!(
            err,
            BotError::InvalidConfig {
                setting: "DIGEST_CRON",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_timezone_is_config_error() {
        let err = parse_timezone("Mars/Olympus").unwrap_err();
        assert!(matches!(
            err,
            BotError::InvalidConfig {
                setting: "DIGEST_TIMEZONE",
                ..
            }
        ));
    }

    #[test]
    fn test_firings_advance_from_previous_firing() {
        let schedule = DigestSchedule::parse("0 0 7 * * *", "Asia/Kolkata").unwrap();
        let start = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();

        let firings: Vec<_> = schedule.firings(start).take(3).collect();
        assert_eq!(
            firings,
            vec![
                Utc.with_ymd_and_hms(2026, 10, 18, 1, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 10, 19, 1, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 10, 20, 1, 30, 0).unwrap(),
            ]
        );

        // A clock stepped back to before the first firing does not bring it back.
        let mut after_first = schedule.firings(start).skip(1);
        assert_ne!(after_first.next(), schedule.next_after(start));
    }
}
