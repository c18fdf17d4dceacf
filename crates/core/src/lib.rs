#![forbid(unsafe_code)]

pub mod generators;
pub mod model;
pub mod progression;
pub mod reaction;
pub mod scoring;
pub mod time;

pub use time::Clock;
