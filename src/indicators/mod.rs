// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators driving the
// staged-entry rules. Values are `Option<f64>` aligned index-for-index with
// the input series: `None` until a full trailing window exists, never zero.

pub mod rsi;
pub mod sma;
pub mod snapshot;
pub mod window;

pub use snapshot::{
    compute_snapshots, last_two_complete, IndicatorParams, IndicatorSnapshot, Reading,
};
