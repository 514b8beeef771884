//! Contact view: state, tiles, birthdays and the controller tying them to
//! backend requests.

pub mod birthdays;
pub mod controller;
pub mod sequence;
pub mod state;
pub mod tiles;
