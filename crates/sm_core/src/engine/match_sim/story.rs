//! Event & Story Generator
//!
//! 아웃컴 모델이 만든 찬스를 선수 단위 이벤트로 풀어낸다.
//!
//! - 슈팅: 득점자 선택 → shot_attempt → goal (+ 도움) 또는 gk_save / block
//! - 파울: Aggression 가중으로 수비수 선택 → yellow_card (두 번째면 red_card + 퇴장)
//!
//! 후보 가중치 = 존 테이블 역할 가중치 × (공격 또는 패스 능력) × 존 보너스.

use rand::{Rng, RngCore};

use super::card_system::{Booking, CardSystem};
use super::zone::{Zone, ZoneRole};
use super::{Chance, ChanceKind, TeamSheet, TeamSide};
use crate::engine::config::EventConfig;
use crate::engine::sampling::weighted_choice;
use crate::models::{
    ActionKind, Attribute, EventLog, LineupEntry, MatchClock, MatchEvent, PerformanceBook, PlayerToken, Position, Side,
};

/// Mutable per-match state the generator writes into.
#[derive(Debug, Clone, Default)]
pub struct StoryLedger {
    pub events: EventLog,
    pub book: PerformanceBook,
    pub cards: CardSystem,
}

/// Who a narrated chance was attributed to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryBeat {
    pub shooter: Option<PlayerToken>,
    pub scored: bool,
    pub assister: Option<PlayerToken>,
    pub defender: Option<PlayerToken>,
    pub booking: Option<(PlayerToken, Booking)>,
}

#[derive(Debug, Clone)]
pub struct StoryGenerator {
    config: EventConfig,
}

impl StoryGenerator {
    pub fn new(config: EventConfig) -> Self {
        Self { config }
    }

    /// `fatigue` 는 기간 피로 계수 (정규 1.0, 연장 0.8 / 0.7): 도움과 선방 확률에 곱해진다.
    pub fn narrate(
        &self,
        chance: &Chance,
        home: &TeamSheet,
        away: &TeamSheet,
        fatigue: f32,
        ledger: &mut StoryLedger,
        rng: &mut dyn RngCore,
    ) -> StoryBeat {
        let (own, other) = match chance.side {
            TeamSide::Home => (home, away),
            TeamSide::Away => (away, home),
        };
        match chance.kind {
            ChanceKind::Shot { goal } => self.narrate_shot(chance, own, other, goal, fatigue, ledger, rng),
            ChanceKind::Foul => self.narrate_foul(chance.clock, own, ledger, rng),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn narrate_shot(
        &self,
        chance: &Chance,
        attacking: &TeamSheet,
        defending: &TeamSheet,
        goal: bool,
        fatigue: f32,
        ledger: &mut StoryLedger,
        rng: &mut dyn RngCore,
    ) -> StoryBeat {
        let mut beat = StoryBeat::default();
        let clock = chance.clock;
        let Some(shooter) = self.pick_scorer(attacking, chance.zone, &ledger.cards, rng) else {
            log::warn!("{}: no player available to take a shot at {clock:?}", attacking.team());
            return beat;
        };
        let team = attacking.team().clone();
        let name = shooter.player.display_name().to_string();

        ledger.events.push(MatchEvent::player(
            clock,
            shooter.token().clone(),
            team.clone(),
            ActionKind::ShotAttempt,
            format!("{name} shoots from zone {}", chance.zone.number()),
        ));
        if let Some(sheet) = ledger.book.get_mut(shooter.token()) {
            sheet.shots += 1;
        }
        beat.shooter = Some(shooter.token().clone());

        if goal {
            ledger.events.push(MatchEvent::player(
                clock,
                shooter.token().clone(),
                team.clone(),
                ActionKind::Goal,
                format!("Goal! {name} scores with a {}", finish_description(shooter)),
            ));
            if let Some(sheet) = ledger.book.get_mut(shooter.token()) {
                sheet.goals += 1;
            }
            beat.scored = true;

            if rng.gen::<f32>() < self.config.assist_probability * fatigue {
                if let Some(assister) =
                    self.pick_assister(attacking, chance.zone, shooter.token(), &ledger.cards, rng)
                {
                    let (lo, hi) = self.config.assist_lead_seconds;
                    let lead = rng.gen_range(lo..=hi.max(lo));
                    ledger.events.push(MatchEvent::player(
                        clock.rewind(lead),
                        assister.token().clone(),
                        team,
                        ActionKind::Assist,
                        format!("{} sets up {name}", assister.player.display_name()),
                    ));
                    if let Some(sheet) = ledger.book.get_mut(assister.token()) {
                        sheet.assists += 1;
                    }
                    beat.assister = Some(assister.token().clone());
                }
            }
            return beat;
        }

        let keeper = defending
            .lineup
            .goalkeeper()
            .filter(|gk| defending.is_available(gk.token()) && !ledger.cards.is_ejected(gk.token()));
        let saved = keeper.is_some() && rng.gen::<f32>() < self.config.gk_save_probability * fatigue;
        let (defender, kind) = match (saved, keeper) {
            (true, Some(gk)) => (Some(gk), ActionKind::GkSave),
            _ => match self.pick_blocker(defending, &ledger.cards, rng) {
                Some(blocker) => (Some(blocker), ActionKind::Block),
                None => (keeper, ActionKind::GkSave),
            },
        };
        if let Some(defender) = defender {
            let description = match kind {
                ActionKind::GkSave => format!("{} saves from {name}", defender.player.display_name()),
                _ => format!("{} blocks {name}'s shot", defender.player.display_name()),
            };
            ledger.events.push(MatchEvent::player(
                clock,
                defender.token().clone(),
                defending.team().clone(),
                kind,
                description,
            ));
            if let Some(sheet) = ledger.book.get_mut(defender.token()) {
                sheet.defense_actions += 1;
            }
            beat.defender = Some(defender.token().clone());
        }
        beat
    }

    fn narrate_foul(
        &self,
        clock: MatchClock,
        committing: &TeamSheet,
        ledger: &mut StoryLedger,
        rng: &mut dyn RngCore,
    ) -> StoryBeat {
        let mut beat = StoryBeat::default();
        let Some(fouler) = self.pick_fouler(committing, &ledger.cards, rng) else {
            return beat;
        };
        let Some(booking) = ledger.cards.caution(fouler.token(), clock.minute) else {
            return beat;
        };
        let name = fouler.player.display_name();
        for kind in booking.action_kinds() {
            let description = match kind {
                ActionKind::RedCard => format!("{name} is sent off after a second yellow"),
                _ => format!("{name} is booked for a foul"),
            };
            ledger.events.push(MatchEvent::player(
                clock,
                fouler.token().clone(),
                committing.team().clone(),
                *kind,
                description,
            ));
        }
        if let Some(sheet) = ledger.book.get_mut(fouler.token()) {
            sheet.yellow_cards = sheet.yellow_cards.saturating_add(1);
            if booking.is_ejection() {
                sheet.red_card = true;
                sheet.sent_off_at = Some(clock.minute);
            }
        }
        if booking.is_ejection() {
            log::debug!("{} ejected at {}'", fouler.token(), clock.minute);
        }
        beat.booking = Some((fouler.token().clone(), booking));
        beat
    }

    fn candidates<'s>(sheet: &'s TeamSheet, cards: &CardSystem) -> Vec<&'s LineupEntry> {
        sheet.available().filter(|e| !cards.is_ejected(e.token())).collect()
    }

    fn role_weight(&self, sheet: &TeamSheet, entry: &LineupEntry, zone: Zone) -> f32 {
        sheet.table.weight(zone, ZoneRole::of(entry)).unwrap_or(self.config.default_zone_weight)
    }

    /// 측면 존의 같은 쪽 측면 선수 ×1.5, 중앙 존의 CM/스트라이커 ×1.3
    fn zone_bonus(&self, entry: &LineupEntry, zone: Zone) -> f32 {
        let wide = matches!(entry.position, Position::Forward | Position::Winger | Position::WideMidfielder)
            && entry.side() != Side::Centre;
        match zone {
            Zone::AttackCentre if matches!(entry.position, Position::CentralMidfielder | Position::Striker) => {
                self.config.central_zone_bonus
            }
            Zone::AttackLeft | Zone::AttackRight if wide && entry.side() == zone.side() => {
                self.config.wide_zone_bonus
            }
            _ => 1.0,
        }
    }

    fn pass_ability(&self, entry: &LineupEntry) -> f32 {
        let total: f32 = self.config.pass_ability_weights.values().sum();
        if total <= 0.0 {
            return 0.0;
        }
        self.config.pass_ability_weights.iter().map(|(a, w)| entry.player.attr(*a) * w).sum::<f32>() / (total * 100.0)
    }

    /// 출전 가능한 선수가 없으면 라인업 전체에서 고른다 (득점은 반드시 누군가에게 귀속).
    pub fn pick_scorer<'s>(
        &self,
        sheet: &'s TeamSheet,
        zone: Zone,
        cards: &CardSystem,
        rng: &mut dyn RngCore,
    ) -> Option<&'s LineupEntry> {
        let mut pool = Self::candidates(sheet, cards);
        if pool.is_empty() {
            pool = sheet.lineup.entries.iter().collect();
        }
        weighted_choice(rng, &pool, |e| {
            self.role_weight(sheet, e, zone) * sheet.attack_rating(e.token()) * self.zone_bonus(e, zone)
        })
        .copied()
    }

    pub fn pick_assister<'s>(
        &self,
        sheet: &'s TeamSheet,
        zone: Zone,
        scorer: &PlayerToken,
        cards: &CardSystem,
        rng: &mut dyn RngCore,
    ) -> Option<&'s LineupEntry> {
        let pool: Vec<&LineupEntry> = Self::candidates(sheet, cards)
            .into_iter()
            .filter(|e| e.token() != scorer)
            .filter(|e| matches!(e.position, Position::Forward | Position::Winger | Position::WideMidfielder))
            .collect();
        weighted_choice(rng, &pool, |e| {
            self.role_weight(sheet, e, zone) * self.pass_ability(e) * self.zone_bonus(e, zone)
        })
        .copied()
    }

    fn pick_blocker<'s>(
        &self,
        sheet: &'s TeamSheet,
        cards: &CardSystem,
        rng: &mut dyn RngCore,
    ) -> Option<&'s LineupEntry> {
        let pool: Vec<&LineupEntry> = Self::candidates(sheet, cards)
            .into_iter()
            .filter(|e| self.config.block_roles.contains(&ZoneRole::of(e)))
            .collect();
        weighted_choice(rng, &pool, |e| e.player.attr(Attribute::Physicality) / 100.0).copied()
    }

    fn pick_fouler<'s>(
        &self,
        sheet: &'s TeamSheet,
        cards: &CardSystem,
        rng: &mut dyn RngCore,
    ) -> Option<&'s LineupEntry> {
        let pool: Vec<&LineupEntry> =
            Self::candidates(sheet, cards).into_iter().filter(|e| e.position.is_outfield()).collect();
        weighted_choice(rng, &pool, |e| e.player.attr(Attribute::Aggression) / 100.0).copied()
    }
}

fn finish_description(entry: &LineupEntry) -> &'static str {
    if entry.position == Position::CentreBack {
        return "header from a set piece";
    }
    let finishes = [
        (Attribute::ShootPrecision, "placed finish"),
        (Attribute::ShootPower, "powerful strike"),
        (Attribute::Heading, "header"),
        (Attribute::Dribble, "finish after a solo run"),
    ];
    finishes
        .iter()
        .max_by(|a, b| entry.player.attr(a.0).total_cmp(&entry.player.attr(b.0)))
        .map(|(_, label)| *label)
        .unwrap_or("shot")
}
