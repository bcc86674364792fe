pub const COIN_PAYOUT: f64 = 1.9;
pub const GUESS_PAYOUT: f64 = 4.5;
pub const GUESS_RANGE: u8 = 5;
pub const PIG_PAYOUTS: [f64; 4] = [1.9, 3.8, 7.6, 7.6];

pub mod conf_def {
    pub const NUM_ROUNDS: &str = "5";
    pub const NUM_SIMS: &str = "1";
    pub const PARTICIPATION: &str = "Retire";
    pub const OUTFMT: &str = "Log";
}
