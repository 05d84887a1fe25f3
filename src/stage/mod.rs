// =============================================================================
// Staged-Entry Module
// =============================================================================
//
// The persistent state machine behind the tranche notifications:
// - `evaluator` — strict-priority transition rules plus countdown decay
// - `store`     — CSV-backed stage table, loaded/saved once per run

pub mod evaluator;
pub mod store;

pub use evaluator::{evaluate, StageOutcome, StageRules};
pub use store::{StageStore, StageTable};
