use crate::Money;
use serde::Serialize;
use std::fmt;

pub trait Gambler {
    fn name(&self) -> &str;
    fn balance(&self) -> Money;
    fn bankrupt(&self) -> bool;
    fn hit_target(&self) -> bool;
    fn win(&mut self, amount: Money);
    fn lose(&mut self, amount: Money);
    /// How much to put on the next game. Never more than the current balance.
    fn bet_size(&self) -> Money;
    fn strategy(&self) -> &'static str;

    fn is_finished(&self) -> bool {
        self.bankrupt() || self.hit_target()
    }

    fn status(&self) -> Status {
        if self.bankrupt() {
            Status::Bankrupt
        } else if self.hit_target() {
            Status::HitTarget
        } else {
            Status::Playing
        }
    }
}

#[derive(Serialize, Debug, Copy, Clone, PartialEq)]
pub enum Status {
    Playing,
    Bankrupt,
    HitTarget,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Playing => write!(f, "still playing"),
            Status::Bankrupt => write!(f, "bankrupt"),
            Status::HitTarget => write!(f, "hit target"),
        }
    }
}

pub(crate) struct GamblerCommon {
    name: String,
    balance: Money,
    target: Money,
}

impl GamblerCommon {
    pub(crate) fn new(name: &str, balance: Money, target: Money) -> Self {
        Self {
            name: name.to_string(),
            balance,
            target,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn balance(&self) -> Money {
        self.balance
    }

    pub(crate) fn bankrupt(&self) -> bool {
        self.balance <= 0.0
    }

    pub(crate) fn hit_target(&self) -> bool {
        self.balance >= self.target
    }

    pub(crate) fn win(&mut self, amount: Money) {
        assert!(amount >= 0.0);
        self.balance += amount;
    }

    pub(crate) fn lose(&mut self, amount: Money) {
        assert!(amount >= 0.0);
        // a loss can never take more than what was on the table
        assert!(
            amount <= self.balance,
            "{} cannot lose {:.2}",
            self,
            amount
        );
        self.balance -= amount;
    }
}

impl fmt::Display for GamblerCommon {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "Gambler<{} balance={:.2} target={:.2}>",
            self.name, self.balance, self.target
        )
    }
}

macro_rules! impl_gamblercommon_passthrough_for_gambler {
    () => {
        fn name(&self) -> &str {
            self.common.name()
        }

        fn balance(&self) -> Money {
            self.common.balance()
        }

        fn bankrupt(&self) -> bool {
            self.common.bankrupt()
        }

        fn hit_target(&self) -> bool {
            self.common.hit_target()
        }

        fn win(&mut self, amount: Money) {
            self.common.win(amount)
        }

        fn lose(&mut self, amount: Money) {
            self.common.lose(amount)
        }
    };
}

/// Always puts the same amount down, or whatever is left if that is less.
pub struct StableGambler {
    common: GamblerCommon,
    bet: Money,
}

impl StableGambler {
    pub fn new(name: &str, balance: Money, target: Money, bet: Money) -> Self {
        Self {
            common: GamblerCommon::new(name, balance, target),
            bet,
        }
    }
}

impl Gambler for StableGambler {
    fn bet_size(&self) -> Money {
        self.bet.min(self.common.balance())
    }

    fn strategy(&self) -> &'static str {
        "stable"
    }

    impl_gamblercommon_passthrough_for_gambler!();
}

/// Bets half the balance, and everything once the balance drops to the yolo amount.
pub struct HighRiskGambler {
    common: GamblerCommon,
    yolo: Money,
}

impl HighRiskGambler {
    pub fn new(name: &str, balance: Money, target: Money, yolo: Money) -> Self {
        Self {
            common: GamblerCommon::new(name, balance, target),
            yolo,
        }
    }
}

impl Gambler for HighRiskGambler {
    fn bet_size(&self) -> Money {
        let balance = self.common.balance();
        if balance <= self.yolo {
            balance
        } else {
            balance / 2.0
        }
    }

    fn strategy(&self) -> &'static str {
        "highrisk"
    }

    impl_gamblercommon_passthrough_for_gambler!();
}

/// Bets a fixed opening amount until the balance falls to the minimum, then goes all in.
///
/// Only the current balance matters. Past wins and losses are not tracked.
pub struct StreakGambler {
    common: GamblerCommon,
    initial_bet: Money,
    minimum: Money,
}

impl StreakGambler {
    pub fn new(name: &str, balance: Money, target: Money, initial_bet: Money, minimum: Money) -> Self {
        Self {
            common: GamblerCommon::new(name, balance, target),
            initial_bet,
            minimum,
        }
    }
}

impl Gambler for StreakGambler {
    fn bet_size(&self) -> Money {
        let balance = self.common.balance();
        if balance <= self.minimum {
            balance
        } else {
            self.initial_bet.min(balance)
        }
    }

    fn strategy(&self) -> &'static str {
        "streak"
    }

    impl_gamblercommon_passthrough_for_gambler!();
}

#[cfg(test)]
mod tests {
    use super::{Gambler, HighRiskGambler, StableGambler, Status, StreakGambler};

    fn all_strategies(balance: f64) -> Vec<Box<dyn Gambler>> {
        vec![
            Box::new(StableGambler::new("s", balance, 1000.0, 10.0)),
            Box::new(HighRiskGambler::new("h", balance, 1000.0, 20.0)),
            Box::new(StreakGambler::new("k", balance, 1000.0, 10.0, 2.0)),
        ]
    }

    #[test]
    fn never_bets_more_than_balance() {
        for balance in [0.0, 0.5, 1.0, 2.0, 3.0, 7.25, 10.0, 19.99, 20.0, 20.01, 55.0, 999.0].iter() {
            for g in all_strategies(*balance) {
                let bet = g.bet_size();
                assert!(bet <= g.balance(), "{} bet {} over {}", g.strategy(), bet, balance);
                assert!(bet >= 0.0);
            }
        }
    }

    #[test]
    fn finished_at_start_when_target_below_balance() {
        let g = StableGambler::new("Alice", 100.0, 15.0, 10.0);
        assert!(g.is_finished());
        assert!(g.hit_target());
        assert!(!g.bankrupt());
        assert_eq!(g.status(), Status::HitTarget);
    }

    #[test]
    fn highrisk_boundaries() {
        let g = HighRiskGambler::new("Bob", 50.0, 10.0, 20.0);
        assert!(g.is_finished());
        let g = HighRiskGambler::new("Bob", 50.0, 1000.0, 20.0);
        assert!(!g.is_finished());
        assert_eq!(g.bet_size(), 25.0);
    }

    #[test]
    fn highrisk_yolo() {
        // at or below the yolo amount, everything goes in
        for balance in [20.0, 19.0, 0.5].iter() {
            let g = HighRiskGambler::new("Bob", *balance, 1000.0, 20.0);
            assert_eq!(g.bet_size(), *balance);
        }
    }

    #[test]
    fn stable_clamps_to_balance() {
        let g = StableGambler::new("Alice", 100.0, 1000.0, 10.0);
        assert_eq!(g.bet_size(), 10.0);
        let g = StableGambler::new("Alice", 4.0, 1000.0, 10.0);
        assert_eq!(g.bet_size(), 4.0);
    }

    #[test]
    fn streak_threshold() {
        let g = StreakGambler::new("Camille", 200.0, 1000.0, 10.0, 2.0);
        assert_eq!(g.bet_size(), 10.0);
        let g = StreakGambler::new("Camille", 2.0, 1000.0, 10.0, 2.0);
        assert_eq!(g.bet_size(), 2.0);
        // between the minimum and the opening bet, the bet is whatever is left
        let g = StreakGambler::new("Camille", 6.0, 1000.0, 10.0, 2.0);
        assert_eq!(g.bet_size(), 6.0);
    }

    #[test]
    fn win_and_lose() {
        let mut g = StableGambler::new("Alice", 100.0, 150.0, 10.0);
        g.win(9.0);
        assert_eq!(g.balance(), 109.0);
        g.lose(10.0);
        assert_eq!(g.balance(), 99.0);
        g.lose(99.0);
        assert!(g.bankrupt());
        assert_eq!(g.status(), Status::Bankrupt);
    }

    #[test]
    #[should_panic]
    fn cant_lose_more_than_balance() {
        let mut g = StableGambler::new("Alice", 5.0, 150.0, 10.0);
        g.lose(10.0);
    }
}
