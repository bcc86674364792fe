use crate::gambler::Gambler;
use crate::Money;
use std::fmt;

/// One gambler's stake in a single game. `seat` is the gambler's position in the house roster.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Wager {
    pub seat: usize,
    amount: Money,
}

impl Wager {
    pub fn new(seat: usize, amount: Money) -> Self {
        assert!(amount >= 0.0, "negative wager {}", amount);
        Wager { seat, amount }
    }

    pub fn amount(self) -> Money {
        self.amount
    }
}

/// The wagers collected for one game in one round, in roster order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BetBook {
    wagers: Vec<Wager>,
}

impl BetBook {
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }

    /// Ask every gambler the filter lets through for its bet.
    ///
    /// Panics if a strategy asks to stake more than it holds.
    pub fn collect<F>(gamblers: &[Box<dyn Gambler>], mut include: F) -> Self
    where
        F: FnMut(&dyn Gambler) -> bool,
    {
        let mut book = BetBook::new();
        for (seat, g) in gamblers.iter().enumerate() {
            if !include(&**g) {
                log::trace!("{} sits this one out", g.name());
                continue;
            }
            let amount = g.bet_size();
            assert!(
                amount <= g.balance(),
                "{} ({}) wants to bet {} but only has {}",
                g.name(),
                g.strategy(),
                amount,
                g.balance()
            );
            book.place(Wager::new(seat, amount));
        }
        book
    }

    pub fn place(&mut self, w: Wager) {
        assert!(
            self.wagers.iter().all(|x| x.seat != w.seat),
            "seat {} already has a wager",
            w.seat
        );
        self.wagers.push(w);
    }

    pub fn wagers(&self) -> &[Wager] {
        &self.wagers
    }

    pub fn amounts(&self) -> Vec<Money> {
        self.wagers.iter().map(|w| w.amount()).collect()
    }

    pub fn total(&self) -> Money {
        self.wagers.iter().map(|w| w.amount()).sum()
    }

    pub fn len(&self) -> usize {
        self.wagers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wagers.is_empty()
    }
}

impl fmt::Display for BetBook {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "Book<num_wagers={} total={:.2}>", self.len(), self.total())
    }
}
