//! Output records for scored repositories
//!
//! Every evaluated repository becomes one flat JSON object on its own line
//! (newline-delimited JSON), so results can be streamed to other tools as they are
//! produced. Scores and latencies are rounded to two decimals; a metric that could
//! not be computed is written as [`UNAVAILABLE`].

mod ndjson;

pub use ndjson::{UNAVAILABLE, generate as generate_ndjson};
