use crate::book::{BetBook, Wager};
use crate::gambler::Gambler;
use crate::global::{COIN_PAYOUT, GUESS_PAYOUT, GUESS_RANGE};
use crate::house::Ledger;
use crate::pigrace::GuineaPigRace;
use crate::Money;
use rand::{Rng, RngCore};
use serde::Serialize;
use std::fmt;

pub trait Game {
    fn name(&self) -> &'static str;

    /// The outcome drawn when the game was built, if the game draws one up front.
    fn drawn(&self) -> Option<u8>;

    /// Settle every wager in the book. Each gambler's balance moves by `net` and the house
    /// profit by `-net`.
    fn simulate_game(
        &self,
        book: &BetBook,
        gamblers: &mut [Box<dyn Gambler>],
        ledger: &mut Ledger,
        rng: &mut dyn RngCore,
    ) -> GameReport;
}

#[derive(Serialize, Debug, Copy, Clone, PartialEq)]
pub enum Side {
    Heads,
    Tails,
}

/// What decided a single wager.
#[derive(Serialize, Debug, Copy, Clone, PartialEq)]
pub enum Call {
    Coin(Side),
    Number(u8),
    Pig(u8),
    /// Every pig was already taken.
    Scratched,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Call::Coin(Side::Heads) => write!(f, "coin was heads"),
            Call::Coin(Side::Tails) => write!(f, "coin was tails"),
            Call::Number(n) => write!(f, "guessed {}", n),
            Call::Pig(p) => write!(f, "backed pig {}", p),
            Call::Scratched => write!(f, "no pig left"),
        }
    }
}

#[derive(Serialize, Debug, Copy, Clone, PartialEq)]
pub struct Outcome {
    pub seat: usize,
    pub wager: Money,
    pub call: Call,
    pub won: bool,
    /// Change to the gambler's balance.
    pub net: Money,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GameReport {
    pub game: &'static str,
    pub drawn: Option<u8>,
    pub outcomes: Vec<Outcome>,
}

impl GameReport {
    pub fn new(game: &dyn Game) -> Self {
        GameReport {
            game: game.name(),
            drawn: game.drawn(),
            outcomes: vec![],
        }
    }

    pub fn house_net(&self) -> Money {
        -self.outcomes.iter().map(|o| o.net).sum::<Money>()
    }
}

/// Net gain on a winning wager that pays `payout` times the stake.
pub fn winnings(wager: Money, payout: f64) -> Money {
    wager * payout - wager
}

/// Move `net` from the house to the gambler sitting at the wager's seat (or the other way
/// round when `net` is negative).
pub(crate) fn settle(
    gamblers: &mut [Box<dyn Gambler>],
    ledger: &mut Ledger,
    wager: Wager,
    call: Call,
    won: bool,
    net: Money,
) -> Outcome {
    let g = &mut gamblers[wager.seat];
    if net >= 0.0 {
        g.win(net);
    } else {
        g.lose(-net);
    }
    ledger.add_profit(-net);
    match (call, won) {
        (Call::Scratched, _) => log::debug!("{}: {}", g.name(), call),
        (_, true) => log::debug!("{}: {}. They won: ${:.2}", g.name(), call, net),
        (_, false) => log::debug!("{}: {}. They lost: ${:.2}", g.name(), call, -net),
    }
    Outcome {
        seat: wager.seat,
        wager: wager.amount(),
        call,
        won,
        net,
    }
}

/// A coin is flipped for every wager. Tails pays 1.9 to 1.
#[derive(Debug, Default)]
pub struct TailsIWin;

impl TailsIWin {
    pub fn new() -> Self {
        TailsIWin
    }

    pub fn net(wager: Money, side: Side) -> Money {
        match side {
            Side::Tails => winnings(wager, COIN_PAYOUT),
            Side::Heads => -wager,
        }
    }
}

impl Game for TailsIWin {
    fn name(&self) -> &'static str {
        "Tails I Win"
    }

    fn drawn(&self) -> Option<u8> {
        None
    }

    fn simulate_game(
        &self,
        book: &BetBook,
        gamblers: &mut [Box<dyn Gambler>],
        ledger: &mut Ledger,
        rng: &mut dyn RngCore,
    ) -> GameReport {
        let mut report = GameReport::new(self);
        for w in book.wagers() {
            let side = if rng.gen_bool(0.5) {
                Side::Tails
            } else {
                Side::Heads
            };
            let net = TailsIWin::net(w.amount(), side);
            let won = side == Side::Tails;
            report
                .outcomes
                .push(settle(gamblers, ledger, *w, Call::Coin(side), won, net));
        }
        report
    }
}

/// One number is drawn for the whole book and every gambler guesses independently. A correct
/// guess pays 4.5 to 1.
#[derive(Debug)]
pub struct GuessTheNumber {
    winning_number: u8,
}

impl GuessTheNumber {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        GuessTheNumber::with_winning_number(rng.gen_range(0, GUESS_RANGE))
    }

    pub fn with_winning_number(winning_number: u8) -> Self {
        assert!(winning_number < GUESS_RANGE);
        GuessTheNumber { winning_number }
    }

    pub fn winning_number(&self) -> u8 {
        self.winning_number
    }

    pub fn net(&self, wager: Money, guess: u8) -> Money {
        if guess == self.winning_number {
            winnings(wager, GUESS_PAYOUT)
        } else {
            -wager
        }
    }
}

impl Game for GuessTheNumber {
    fn name(&self) -> &'static str {
        "Guess the Number"
    }

    fn drawn(&self) -> Option<u8> {
        Some(self.winning_number)
    }

    fn simulate_game(
        &self,
        book: &BetBook,
        gamblers: &mut [Box<dyn Gambler>],
        ledger: &mut Ledger,
        rng: &mut dyn RngCore,
    ) -> GameReport {
        log::debug!("The correct answer is: {}", self.winning_number);
        let mut report = GameReport::new(self);
        for w in book.wagers() {
            let guess: u8 = rng.gen_range(0, GUESS_RANGE);
            let net = self.net(w.amount(), guess);
            let won = guess == self.winning_number;
            report
                .outcomes
                .push(settle(gamblers, ledger, *w, Call::Number(guess), won, net));
        }
        report
    }
}

/// The games played every round, in the order they are played.
pub fn fresh_games(rng: &mut dyn RngCore) -> Vec<Box<dyn Game>> {
    vec![
        Box::new(TailsIWin::new()),
        Box::new(GuessTheNumber::new(rng)),
        Box::new(GuineaPigRace::new(rng)),
    ]
}
