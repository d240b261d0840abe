pub mod cc;
pub mod config;
pub mod error;
pub mod graph;
pub mod pattern;
pub mod trace;

pub use error::ScheduleError;

#[cfg(test)]
mod test;
