/// One-shot match analysis requests.
pub mod advice_service;
/// Per-match build lookups.
pub mod enrichment;
/// Ranked standing lookups.
pub mod rank_service;
/// Match history synchronization controller.
pub mod sync_controller;
