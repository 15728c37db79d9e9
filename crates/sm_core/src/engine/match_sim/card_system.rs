//! Booking ledger for one match: yellow accumulation and ejection minutes.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{ActionKind, PlayerToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Booking {
    /// 첫 경고
    Caution,
    /// 두 번째 경고 → 레드, 퇴장
    SecondYellow,
}

impl Booking {
    pub fn is_ejection(self) -> bool {
        !matches!(self, Booking::Caution)
    }

    /// Event kinds this booking writes to the log, in order.
    pub fn action_kinds(self) -> &'static [ActionKind] {
        match self {
            Booking::Caution => &[ActionKind::YellowCard],
            Booking::SecondYellow => &[ActionKind::YellowCard, ActionKind::RedCard],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CardSystem {
    yellow_cards: HashMap<PlayerToken, u8>,
    ejected: BTreeMap<PlayerToken, u8>,
}

impl CardSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이미 퇴장당한 선수에게는 아무것도 하지 않고 None.
    pub fn caution(&mut self, player: &PlayerToken, minute: u8) -> Option<Booking> {
        if self.is_ejected(player) {
            return None;
        }
        let count = self.yellow_cards.entry(player.clone()).or_insert(0);
        *count = count.saturating_add(1);
        if *count >= 2 {
            self.ejected.insert(player.clone(), minute);
            Some(Booking::SecondYellow)
        } else {
            Some(Booking::Caution)
        }
    }

    pub fn is_ejected(&self, player: &PlayerToken) -> bool {
        self.ejected.contains_key(player)
    }

    pub fn ejected_at(&self, player: &PlayerToken) -> Option<u8> {
        self.ejected.get(player).copied()
    }

    pub fn yellow_count(&self, player: &PlayerToken) -> u8 {
        self.yellow_cards.get(player).copied().unwrap_or(0)
    }

    pub fn ejected_players(&self) -> HashSet<PlayerToken> {
        self.ejected.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_yellow_ejects() {
        let mut cards = CardSystem::new();
        let p = PlayerToken::from("p7");
        assert_eq!(cards.caution(&p, 12), Some(Booking::Caution));
        assert!(!cards.is_ejected(&p));

        let booking = cards.caution(&p, 55).unwrap();
        assert_eq!(booking, Booking::SecondYellow);
        assert_eq!(booking.action_kinds(), &[ActionKind::YellowCard, ActionKind::RedCard]);
        assert_eq!(cards.ejected_at(&p), Some(55));
        assert_eq!(cards.yellow_count(&p), 2);
    }

    #[test]
    fn test_ejected_player_collects_nothing_more() {
        let mut cards = CardSystem::new();
        let p = PlayerToken::from("p3");
        cards.caution(&p, 20);
        cards.caution(&p, 30);
        assert_eq!(cards.caution(&p, 40), None);
        assert_eq!(cards.yellow_count(&p), 2);
        assert_eq!(cards.ejected_at(&p), Some(30));
        assert_eq!(cards.ejected_players().len(), 1);
        assert!(!cards.is_ejected(&PlayerToken::from("p4")));
    }
}
