//! Reward computation core. Pure and synchronous: no IO, no global RNG.

pub mod character;
pub mod error;
pub mod formula;
pub mod records;
pub mod resolver;
pub mod rng;

pub use character::*;
pub use error::*;
pub use formula::*;
pub use records::*;
pub use resolver::*;
pub use rng::*;
