//! Display status of a registration record.

use crate::types::DomainRecord;
use crate::utils::parse_plain_date;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days before expiry at which a domain counts as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    Available,
    Expired,
    ExpiringSoon,
    Active,
    Error,
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Available => "available",
            Self::Expired => "expired",
            Self::ExpiringSoon => "expiring_soon",
            Self::Active => "active",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Classify a record from its expiration date and status tokens.
///
/// An availability token wins over everything; a missing expiration means
/// available when there are no statuses either, active otherwise.
pub fn classify_status(
    expiration_date: Option<&str>,
    status: &[String],
    today: NaiveDate,
) -> DomainStatus {
    const AVAILABLE_MARKERS: [&str; 4] = ["AVAILABLE", "FREE", "NO MATCH", "NOT FOUND"];

    let says_available = status.iter().any(|s| {
        let upper = s.to_uppercase();
        AVAILABLE_MARKERS.iter().any(|m| upper.contains(m))
    });
    if says_available {
        return DomainStatus::Available;
    }

    let Some(expiration) = expiration_date.map(str::trim).filter(|e| !e.is_empty()) else {
        return if status.is_empty() {
            DomainStatus::Available
        } else {
            DomainStatus::Active
        };
    };

    let Some(expires) = parse_plain_date(expiration) else {
        return DomainStatus::Error;
    };

    let days_left = (expires - today).num_days();
    if days_left < 0 {
        DomainStatus::Expired
    } else if days_left <= EXPIRING_SOON_DAYS {
        DomainStatus::ExpiringSoon
    } else {
        DomainStatus::Active
    }
}

/// Classify against today's UTC date.
pub fn classify_record(record: &DomainRecord) -> DomainStatus {
    classify_status(
        record.expiration_date.as_deref(),
        &record.status,
        Utc::now().date_naive(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn in_days(days: i64) -> String {
        (today() + Duration::days(days)).format("%Y-%m-%d").to_string()
    }

    #[test]
    fn test_no_data_is_available() {
        assert_eq!(classify_status(None, &[], today()), DomainStatus::Available);
    }

    #[test]
    fn test_status_without_expiration_is_active() {
        let status = vec!["ok".to_string()];
        assert_eq!(classify_status(None, &status, today()), DomainStatus::Active);
    }

    #[test]
    fn test_availability_tokens_win() {
        let status = vec!["AVAILABLE".to_string()];
        assert_eq!(
            classify_status(Some(&in_days(400)), &status, today()),
            DomainStatus::Available
        );
        let status = vec!["No match".to_string()];
        assert_eq!(classify_status(None, &status, today()), DomainStatus::Available);
    }

    #[test]
    fn test_expiry_boundaries() {
        let status = vec!["active".to_string()];
        assert_eq!(
            classify_status(Some(&in_days(30)), &status, today()),
            DomainStatus::ExpiringSoon
        );
        assert_eq!(
            classify_status(Some(&in_days(31)), &status, today()),
            DomainStatus::Active
        );
        assert_eq!(
            classify_status(Some(&in_days(-1)), &status, today()),
            DomainStatus::Expired
        );
        assert_eq!(
            classify_status(Some(&in_days(0)), &status, today()),
            DomainStatus::ExpiringSoon
        );
    }

    #[test]
    fn test_unparsable_date_is_error() {
        assert_eq!(
            classify_status(Some("sometime next year"), &[], today()),
            DomainStatus::Error
        );
    }
}
