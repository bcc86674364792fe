use crate::book::BetBook;
use crate::gambler::Gambler;
use crate::game::{settle, winnings, Call, Game, GameReport};
use crate::global::PIG_PAYOUTS;
use crate::house::Ledger;
use crate::Money;
use rand::{Rng, RngCore};

pub const NUM_PIGS: usize = 4;

/// Pick a distinct pig for each wager, in book order.
///
/// A wager's amount doubles as its pig choice: it is clamped to `0..=3` and rounded to the
/// nearest pig. If that pig is already backed, the next one up is tried, wrapping around
/// after the last. Once all four pigs are backed, later wagers get `None`.
pub fn select_pigs(amounts: &[Money]) -> Vec<Option<u8>> {
    let mut taken = [false; NUM_PIGS];
    amounts
        .iter()
        .map(|amount| {
            if taken.iter().all(|t| *t) {
                return None;
            }
            let mut pig = amount.max(0.0).min((NUM_PIGS - 1) as f64).round() as usize;
            while taken[pig] {
                pig = (pig + 1) % NUM_PIGS;
            }
            taken[pig] = true;
            Some(pig as u8)
        })
        .collect()
}

/// One race per round. Each gambler backs a different pig, and the payout depends on which
/// pig won.
#[derive(Debug)]
pub struct GuineaPigRace {
    winning_pig: u8,
    payouts: [f64; NUM_PIGS],
}

impl GuineaPigRace {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        GuineaPigRace::with_winning_pig(rng.gen_range(0, NUM_PIGS as u8))
    }

    pub fn with_winning_pig(winning_pig: u8) -> Self {
        assert!((winning_pig as usize) < NUM_PIGS);
        GuineaPigRace {
            winning_pig,
            payouts: PIG_PAYOUTS,
        }
    }

    pub fn winning_pig(&self) -> u8 {
        self.winning_pig
    }

    pub fn net(&self, wager: Money, pig: u8) -> Money {
        if pig == self.winning_pig {
            winnings(wager, self.payouts[self.winning_pig as usize])
        } else {
            -wager
        }
    }
}

impl Game for GuineaPigRace {
    fn name(&self) -> &'static str {
        "Off-track Guinea Pig Racing"
    }

    fn drawn(&self) -> Option<u8> {
        Some(self.winning_pig)
    }

    fn simulate_game(
        &self,
        book: &BetBook,
        gamblers: &mut [Box<dyn Gambler>],
        ledger: &mut Ledger,
        _rng: &mut dyn RngCore,
    ) -> GameReport {
        log::debug!("The winning pig was {}", self.winning_pig);
        let mut report = GameReport::new(self);
        let picks = select_pigs(&book.amounts());
        for (w, pick) in book.wagers().iter().zip(picks) {
            let outcome = match pick {
                Some(pig) => {
                    let net = self.net(w.amount(), pig);
                    settle(gamblers, ledger, *w, Call::Pig(pig), pig == self.winning_pig, net)
                }
                None => settle(gamblers, ledger, *w, Call::Scratched, false, 0.0),
            };
            report.outcomes.push(outcome);
        }
        report
    }
}
