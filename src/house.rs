use crate::book::BetBook;
use crate::gambler::{Gambler, Status};
use crate::game::{fresh_games, GameReport};
use crate::Money;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

/// The house's running profit. Only games move it, while settling wagers.
#[derive(Debug, Default)]
pub struct Ledger {
    profit: Money,
}

impl Ledger {
    pub fn profit(&self) -> Money {
        self.profit
    }

    pub(crate) fn add_profit(&mut self, amount: Money) {
        self.profit += amount;
    }
}

/// Who gets asked for a bet.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Participation {
    /// Gamblers that went bankrupt or hit their target stop playing, even partway through a
    /// round. The simulation ends early once nobody is left.
    Retire,
    /// The whole roster bets every game regardless of how it is doing.
    Everyone,
}

impl Default for Participation {
    fn default() -> Self {
        Participation::Retire
    }
}

impl Participation {
    pub fn includes(self, g: &dyn Gambler) -> bool {
        match self {
            Participation::Retire => !g.is_finished(),
            Participation::Everyone => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HouseConfig {
    pub max_rounds: u32,
    pub participation: Participation,
    /// None seeds from entropy
    pub seed: Option<u64>,
}

impl Default for HouseConfig {
    fn default() -> Self {
        Self {
            max_rounds: 5,
            participation: Participation::default(),
            seed: None,
        }
    }
}

pub trait HouseRecorder {
    fn record(&mut self, round: &RoundReport, gamblers: &[Box<dyn Gambler>]);
    fn done(&mut self);
    fn read_output(&self) -> Value;
}

/// Cumulative house profit after each round.
#[derive(Default)]
pub struct ProfitRecorder {
    out: Value,
    data: Vec<Money>,
}

impl ProfitRecorder {
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }
}

impl HouseRecorder for ProfitRecorder {
    fn record(&mut self, round: &RoundReport, _gamblers: &[Box<dyn Gambler>]) {
        self.data.push(round.total_profit);
    }

    fn done(&mut self) {
        self.out = json!(&self.data);
        self.data.clear();
    }

    fn read_output(&self) -> Value {
        self.out.clone()
    }
}

/// Every gambler's balance after each round, keyed by name.
#[derive(Default)]
pub struct BalanceRecorder {
    out: Value,
    data: BTreeMap<String, Vec<Money>>,
}

impl BalanceRecorder {
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }
}

impl HouseRecorder for BalanceRecorder {
    fn record(&mut self, _round: &RoundReport, gamblers: &[Box<dyn Gambler>]) {
        for g in gamblers {
            self.data
                .entry(g.name().to_string())
                .or_insert_with(Vec::new)
                .push(g.balance());
        }
    }

    fn done(&mut self) {
        self.out = json!(&self.data);
        self.data.clear();
    }

    fn read_output(&self) -> Value {
        self.out.clone()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundReport {
    pub round: u32,
    pub games: Vec<GameReport>,
    pub profit_delta: Money,
    pub total_profit: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct Standing {
    pub name: String,
    pub strategy: &'static str,
    pub balance: Money,
    pub net: Money,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub rounds_played: u32,
    pub profit: Money,
    pub gamblers: Vec<Standing>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(
            f,
            "simulation complete after {} rounds. total profit: {:.2}",
            self.rounds_played, self.profit
        )?;
        for s in self.gamblers.iter() {
            writeln!(
                f,
                "  {} ({}): {:.2} ({:+.2}), {}",
                s.name, s.strategy, s.balance, s.net, s.status
            )?;
        }
        Ok(())
    }
}

pub struct House {
    gamblers: Vec<Box<dyn Gambler>>,
    starting: Vec<Money>,
    ledger: Ledger,
    max_rounds: u32,
    current_round: u32,
    participation: Participation,
    rng: StdRng,
    recorder: Option<Box<dyn HouseRecorder>>,
}

impl House {
    pub fn new(gamblers: Vec<Box<dyn Gambler>>, conf: &HouseConfig) -> Self {
        let rng = match conf.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        House {
            starting: gamblers.iter().map(|g| g.balance()).collect(),
            gamblers,
            ledger: Ledger::default(),
            max_rounds: conf.max_rounds,
            current_round: 0,
            participation: conf.participation,
            rng,
            recorder: None,
        }
    }

    pub fn attach_recorder(&mut self, r: Box<dyn HouseRecorder>) {
        assert!(self.recorder.is_none());
        self.recorder = Some(r);
    }

    pub fn recorder_output(&self) -> Value {
        if let Some(r) = &self.recorder {
            r.read_output()
        } else {
            Value::Null
        }
    }

    pub fn gamblers(&self) -> &[Box<dyn Gambler>] {
        &self.gamblers
    }

    pub fn profit(&self) -> Money {
        self.ledger.profit()
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Number of gamblers that would be asked for a bet right now.
    pub fn active(&self) -> usize {
        let participation = self.participation;
        self.gamblers
            .iter()
            .filter(|&g| participation.includes(&**g))
            .count()
    }

    pub fn is_done(&self) -> bool {
        self.current_round >= self.max_rounds || self.active() == 0
    }

    pub fn simulate_one_round(&mut self) -> RoundReport {
        let starting_profit = self.ledger.profit();
        log::info!("beginning round {}", self.current_round);
        let participation = self.participation;
        let mut games = Vec::new();
        for game in fresh_games(&mut self.rng) {
            let book = BetBook::collect(&self.gamblers, |g| participation.includes(g));
            for w in book.wagers() {
                log::debug!("{} bets: ${:.2}", self.gamblers[w.seat].name(), w.amount());
            }
            log::debug!("playing {} with {}", game.name(), book);
            let report = game.simulate_game(&book, &mut self.gamblers, &mut self.ledger, &mut self.rng);
            games.push(report);
        }
        let report = RoundReport {
            round: self.current_round,
            games,
            profit_delta: self.ledger.profit() - starting_profit,
            total_profit: self.ledger.profit(),
        };
        log::info!("round complete. house made: {:.2}", report.profit_delta);
        log::info!("total profit: {:.2}", report.total_profit);
        if let Some(r) = &mut self.recorder {
            r.record(&report, &self.gamblers);
        }
        self.current_round += 1;
        report
    }

    /// Play rounds until the round limit is reached or nobody is left to play.
    pub fn simulate(&mut self) -> Summary {
        while !self.is_done() {
            self.simulate_one_round();
        }
        self.finish()
    }

    pub fn finish(&mut self) -> Summary {
        if let Some(r) = &mut self.recorder {
            r.done();
        }
        if self.active() == 0 {
            log::info!("no gamblers left after {} rounds", self.current_round);
        }
        log::info!("simulation complete");
        self.summary()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            rounds_played: self.current_round,
            profit: self.ledger.profit(),
            gamblers: self
                .gamblers
                .iter()
                .zip(self.starting.iter())
                .map(|(g, start)| Standing {
                    name: g.name().to_string(),
                    strategy: g.strategy(),
                    balance: g.balance(),
                    net: g.balance() - start,
                    status: g.status(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "House<round={}/{} profit={:.2} active={}>",
            self.current_round,
            self.max_rounds,
            self.ledger.profit(),
            self.active()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{BalanceRecorder, House, HouseConfig, Participation, ProfitRecorder};
    use crate::gambler::{Gambler, HighRiskGambler, StableGambler, StreakGambler};
    use crate::game::tests::close;
    use crate::game::Call;
    use crate::roster;

    fn conf(max_rounds: u32, participation: Participation, seed: u64) -> HouseConfig {
        HouseConfig {
            max_rounds,
            participation,
            seed: Some(seed),
        }
    }

    fn deep_pockets() -> Vec<Box<dyn Gambler>> {
        // balances far from both exits so nobody finishes
        vec![
            Box::new(StableGambler::new("Alice", 1e6, 1e9, 10.0)),
            Box::new(StreakGambler::new("Camille", 1e6, 1e9, 10.0, 2.0)),
        ]
    }

    fn all_in(n: usize) -> Vec<Box<dyn Gambler>> {
        (0..n)
            .map(|i| {
                Box::new(HighRiskGambler::new(&format!("y{}", i), 10.0, 30.0, 1000.0))
                    as Box<dyn Gambler>
            })
            .collect()
    }

    fn balances(h: &House) -> Vec<f64> {
        h.gamblers().iter().map(|g| g.balance()).collect()
    }

    #[test]
    fn exact_round_count() {
        for participation in [Participation::Retire, Participation::Everyone].iter() {
            let mut h = House::new(deep_pockets(), &conf(7, *participation, 11));
            let s = h.simulate();
            assert_eq!(s.rounds_played, 7);
            assert_eq!(h.current_round(), 7);
            assert!(h.is_done());
        }
    }

    #[test]
    fn rounds_are_zero_sum() {
        let mut h = House::new(roster::classic(), &conf(20, Participation::Everyone, 3));
        for _ in 0..20 {
            let before = balances(&h);
            let profit_before = h.profit();
            let report = h.simulate_one_round();
            let gambler_net: f64 = balances(&h)
                .iter()
                .zip(before.iter())
                .map(|(a, b)| a - b)
                .sum();
            assert!(close(gambler_net, -(h.profit() - profit_before)));
            assert!(close(report.profit_delta, h.profit() - profit_before));
            let from_games: f64 = report.games.iter().map(|g| g.house_net()).sum();
            assert!(close(from_games, report.profit_delta));
            assert!(h.gamblers().iter().all(|g| g.balance() >= 0.0));
        }
    }

    #[test]
    fn game_order_fixed() {
        let mut h = House::new(deep_pockets(), &conf(1, Participation::Retire, 8));
        let report = h.simulate_one_round();
        let names: Vec<&str> = report.games.iter().map(|g| g.game).collect();
        assert_eq!(
            names,
            vec!["Tails I Win", "Guess the Number", "Off-track Guinea Pig Racing"]
        );
        for g in report.games.iter() {
            let seats: Vec<usize> = g.outcomes.iter().map(|o| o.seat).collect();
            assert_eq!(seats, vec![0, 1]);
        }
    }

    #[test]
    fn classic_roster_retires_immediately() {
        // every classic gambler starts at or above target
        let mut h = House::new(roster::classic(), &conf(5, Participation::Retire, 1));
        assert_eq!(h.active(), 0);
        let s = h.simulate();
        assert_eq!(s.rounds_played, 0);
        assert_eq!(s.profit, 0.0);
    }

    #[test]
    fn classic_roster_keeps_playing() {
        let mut h = House::new(roster::classic(), &conf(5, Participation::Everyone, 1));
        assert_eq!(h.active(), 3);
        let s = h.simulate();
        assert_eq!(s.rounds_played, 5);
        assert_eq!(s.gamblers.len(), 3);
    }

    #[test]
    fn finished_gamblers_leave_mid_round() {
        for seed in 0..30 {
            let gamblers = all_in(4);
            let mut balance: Vec<f64> = gamblers.iter().map(|g| g.balance()).collect();
            let mut h = House::new(gamblers, &conf(50, Participation::Retire, seed));
            while !h.is_done() {
                let report = h.simulate_one_round();
                for game in report.games.iter() {
                    for o in game.outcomes.iter() {
                        let b = balance[o.seat];
                        assert!(b > 0.0 && b < 30.0, "seat {} played while finished", o.seat);
                        balance[o.seat] += o.net;
                    }
                }
            }
            let s = h.finish();
            assert!(s.rounds_played == 50 || h.active() == 0);
            for (g, b) in h.gamblers().iter().zip(balance.iter()) {
                assert!(close(g.balance(), *b));
            }
        }
    }

    #[test]
    fn ends_early_when_everyone_finishes() {
        // a single all-in gambler is done in at most a handful of games
        let mut h = House::new(all_in(1), &conf(1000, Participation::Retire, 21));
        let s = h.simulate();
        assert!(s.rounds_played < 1000);
        assert_eq!(h.active(), 0);
        assert!(h.gamblers()[0].is_finished());
    }

    #[test]
    fn pig_race_scratches_extra_gamblers() {
        let mut h = House::new(all_in(6), &conf(1, Participation::Everyone, 2));
        let report = h.simulate_one_round();
        let race = &report.games[2];
        assert_eq!(race.outcomes.len(), 6);
        let scratched = race
            .outcomes
            .iter()
            .filter(|o| o.call == Call::Scratched)
            .count();
        assert_eq!(scratched, 2);
    }

    #[test]
    fn same_seed_same_run() {
        let run = |seed| {
            let mut h = House::new(roster::classic(), &conf(10, Participation::Everyone, seed));
            let s = h.simulate();
            (s.profit, balances(&h))
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn recorders() {
        let mut h = House::new(deep_pockets(), &conf(4, Participation::Retire, 6));
        h.attach_recorder(Box::new(ProfitRecorder::new()));
        let s = h.simulate();
        let out: Vec<f64> = serde_json::from_value(h.recorder_output()).unwrap();
        assert_eq!(out.len(), 4);
        assert!(close(out[3], s.profit));

        let mut h = House::new(deep_pockets(), &conf(3, Participation::Retire, 6));
        h.attach_recorder(Box::new(BalanceRecorder::new()));
        h.simulate();
        let out = h.recorder_output();
        assert_eq!(out["Alice"].as_array().unwrap().len(), 3);
        assert_eq!(out["Camille"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn summary_nets() {
        let mut h = House::new(deep_pockets(), &conf(5, Participation::Retire, 9));
        let s = h.simulate();
        let gambler_net: f64 = s.gamblers.iter().map(|g| g.net).sum();
        assert!(close(gambler_net, -s.profit));
    }
}
