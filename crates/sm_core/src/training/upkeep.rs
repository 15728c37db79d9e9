// 경기 사이 컨디션 관리: 시간당 Freshness 회복, 훈련을 쉬면 만족도 감소
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::config::UpkeepConfig;
use crate::error::Result;
use crate::models::{Attribute, Player};

/// 한 번의 정산에서 나온 델타
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UpkeepDelta {
    pub freshness: f32,
    pub satisfaction: f32,
}

/// `0.65625 + 2.5 × Endurance / 2400`
pub fn recovery_per_hour(endurance: f32, config: &UpkeepConfig) -> f32 {
    config.recovery_base_per_hour + config.recovery_endurance_coeff * endurance / config.recovery_endurance_divisor
}

/// 회복량. Freshness 가 100 을 넘지 않도록 잘린다.
pub fn recover_freshness(freshness: f32, endurance: f32, hours: f32, config: &UpkeepConfig) -> f32 {
    let gained = hours.max(0.0) * recovery_per_hour(endurance, config);
    gained.min((100.0 - freshness).max(0.0))
}

/// 마지막 훈련 후 일수가 1보다 크고 주기(7일)의 배수인 날에만 감소
pub fn idle_satisfaction_decay(last_training: DateTime<Utc>, now: DateTime<Utc>, config: &UpkeepConfig) -> f32 {
    let days = (now - last_training).num_days();
    if config.idle_decay_period_days > 0 && days > 1 && days % config.idle_decay_period_days == 0 {
        -config.idle_decay
    } else {
        0.0
    }
}

/// 선수 한 명의 정산. `last_training` 이 없으면 만족도 감소도 없다.
pub fn settle(
    player: &Player,
    last_effort: DateTime<Utc>,
    last_training: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    config: &UpkeepConfig,
) -> Result<UpkeepDelta> {
    let freshness = player.freshness()?;
    let endurance = player.endurance()?;
    let hours = (now - last_effort).num_minutes() as f32 / 60.0;
    let satisfaction = last_training.map_or(0.0, |t| idle_satisfaction_decay(t, now, config));
    let delta = UpkeepDelta { freshness: recover_freshness(freshness, endurance, hours, config), satisfaction };
    log::trace!("upkeep for {}: {delta:?}", player.token);
    Ok(delta)
}

/// 정산 결과를 선수 레코드에 반영 (0-100 클램프)
pub fn apply(player: &mut Player, delta: UpkeepDelta) {
    player.attributes.apply_delta(Attribute::Freshness, delta.freshness);
    player.attributes.apply_delta(Attribute::Satisfaction, delta.satisfaction);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_recovery_rate() {
        let cfg = UpkeepConfig::default();
        // 0.65625 + 2.5 × 96 / 2400 = 0.75625
        assert!((recovery_per_hour(96.0, &cfg) - 0.75625).abs() < 1e-6);
        assert!((recover_freshness(50.0, 96.0, 10.0, &cfg) - 7.5625).abs() < 1e-4);
    }

    #[test]
    fn test_recovery_caps_at_full_freshness() {
        let cfg = UpkeepConfig::default();
        assert!((recover_freshness(98.0, 80.0, 48.0, &cfg) - 2.0).abs() < 1e-6);
        assert_eq!(recover_freshness(100.0, 80.0, 48.0, &cfg), 0.0);
        assert_eq!(recover_freshness(40.0, 80.0, -5.0, &cfg), 0.0);
    }

    #[test]
    fn test_idle_decay_every_seventh_day() {
        let cfg = UpkeepConfig::default();
        let start = at(1, 9);
        assert_eq!(idle_satisfaction_decay(start, start + Duration::days(7), &cfg), -2.0);
        assert_eq!(idle_satisfaction_decay(start, start + Duration::days(14), &cfg), -2.0);
        assert_eq!(idle_satisfaction_decay(start, start + Duration::days(8), &cfg), 0.0);
        assert_eq!(idle_satisfaction_decay(start, start + Duration::days(1), &cfg), 0.0);
        assert_eq!(idle_satisfaction_decay(start, start, &cfg), 0.0);
    }

    #[test]
    fn test_settle_and_apply() {
        let cfg = UpkeepConfig::default();
        let mut player = Player::new("p", "P").with_attributes(&[
            (Attribute::Freshness, 95.0),
            (Attribute::Endurance, 60.0),
            (Attribute::Satisfaction, 1.0),
        ]);
        let delta = settle(&player, at(1, 0), Some(at(1, 0)), at(8, 0), &cfg).unwrap();
        assert_eq!(delta.freshness, 5.0);
        assert_eq!(delta.satisfaction, -2.0);
        apply(&mut player, delta);
        assert_eq!(player.attr(Attribute::Freshness), 100.0);
        assert_eq!(player.attr(Attribute::Satisfaction), 0.0);
    }
}
