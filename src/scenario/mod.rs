//! RON-defined reactor scenarios: layout, overrides, a timeline of operator
//! actions and checks on the finished run

pub mod actions;
pub mod definition;
pub mod executor;
pub mod results;
pub mod verification;

pub use actions::{ScenarioAction, TimedAction};
pub use definition::{CoolantSupply, ScenarioDefinition};
pub use executor::{RunOptions, ScenarioExecutor};
pub use results::{IntervalRow, MeltdownSummary, NeutronTotals, RunReport};
pub use verification::{VerificationCondition, VerificationResult};
