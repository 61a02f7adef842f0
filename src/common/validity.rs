use crate::common::config::ConfigError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 密钥在生成时附带的有效期窗口，保证 `not_before <= not_after`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawValidityWindow")]
pub struct ValidityWindow {
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawValidityWindow {
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
}

impl TryFrom<RawValidityWindow> for ValidityWindow {
    type Error = ConfigError;

    fn try_from(raw: RawValidityWindow) -> Result<Self, Self::Error> {
        ValidityWindow::new(raw.not_before, raw.not_after)
    }
}

impl ValidityWindow {
    pub fn new(not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> Result<Self, ConfigError> {
        if not_before > not_after {
            return Err(ConfigError::InvalidValidityWindow {
                not_before,
                not_after,
            });
        }
        Ok(Self {
            not_before,
            not_after,
        })
    }

    /// `[start, start + days]`
    pub fn starting_at(start: DateTime<Utc>, days: u32) -> Result<Self, ConfigError> {
        let not_after = start
            .checked_add_signed(Duration::days(i64::from(days)))
            .ok_or(ConfigError::DayCountOutOfRange(days))?;
        Self::new(start, not_after)
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// 当前时间已越过 `not_after`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.not_after
    }

    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        now >= self.not_before && now <= self.not_after
    }
}
