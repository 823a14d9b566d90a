//! Command implementations.

mod info;
mod poll;
mod run;
mod validate;

pub use info::run_info;
pub use poll::run_poll;
pub use run::run_station;
pub use validate::run_validate;
