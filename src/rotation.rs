pub mod manager;

pub use self::manager::{KeyLifecycleManager, RotationOutcome};

use crate::common::validity::ValidityWindow;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 触发轮换的条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationTrigger {
    /// 密钥自身的有效期已过
    ValidityElapsed,
    /// 过期之后又经过了完整的轮换间隔
    IntervalElapsed,
}

/// 评估两个独立的轮换条件，两个都会被检查。
///
/// 同时满足时报告更严格的 `IntervalElapsed`；都不满足时返回 `None`。
/// 这是纯函数，不做任何 I/O。
pub fn evaluate(
    window: &ValidityWindow,
    now: DateTime<Utc>,
    rotation_interval_days: u32,
) -> Option<RotationTrigger> {
    let validity_elapsed = window.is_expired_at(now);
    // 超出时间范围的截止点视为永远到不了
    let interval_elapsed = window
        .not_after()
        .checked_add_signed(Duration::days(i64::from(rotation_interval_days)))
        .is_some_and(|deadline| now > deadline);

    if interval_elapsed {
        Some(RotationTrigger::IntervalElapsed)
    } else if validity_elapsed {
        Some(RotationTrigger::ValidityElapsed)
    } else {
        None
    }
}

/// `evaluate` 的布尔形式
pub fn is_rotation_due(
    window: &ValidityWindow,
    now: DateTime<Utc>,
    rotation_interval_days: u32,
) -> bool {
    evaluate(window, now, rotation_interval_days).is_some()
}

/// 绑定了轮换间隔的策略值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPolicy {
    pub rotation_interval_days: u32,
}

impl RotationPolicy {
    pub fn new(rotation_interval_days: u32) -> Self {
        Self {
            rotation_interval_days,
        }
    }

    /// 没有有效期窗口时不适用轮换，返回 `None`。
    pub fn evaluate(
        &self,
        window: Option<&ValidityWindow>,
        now: DateTime<Utc>,
    ) -> Option<RotationTrigger> {
        window.and_then(|window| evaluate(window, now, self.rotation_interval_days))
    }

    pub fn is_due(&self, window: Option<&ValidityWindow>, now: DateTime<Utc>) -> bool {
        self.evaluate(window, now).is_some()
    }
}
