//! Model-facing analysis helpers: prompt building, reply coercion and
//! time-series statistics. Pure functions, no I/O.

pub mod extract;
pub mod prompts;
pub mod statistics;

pub use extract::{model_output_to_value, ExtractError, FromModelOutput};
pub use prompts::{build_prompt, Framework, Subject, SYSTEM_PROMPT};
pub use statistics::{linear_slope, summarize};
