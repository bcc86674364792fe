pub mod book;
pub mod gambler;
pub mod game;
pub mod global;
pub mod house;
pub mod pigrace;
pub mod roster;
pub mod stats;

pub type Money = f64;
