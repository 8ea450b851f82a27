pub mod core;
pub mod people;
pub mod roster;
pub mod setup;
