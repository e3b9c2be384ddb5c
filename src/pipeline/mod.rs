//! Pipeline entry points for prospector operations.
//!
//! - `run_search`: One discovery call, persisted
//! - `run_continuous`: Repeated discovery rounds until stopped

pub mod continuous;
pub mod search;

pub use continuous::{PersistingSink, run_continuous};
pub use search::{SearchReport, run_search};
