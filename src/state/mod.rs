//! Controller-owned state: the phase machine, the match collection, the enrichment map
//! and the manual refresh throttle.

/// Ordered, deduplicated match list.
pub mod collection;
/// Published state and build map.
pub mod snapshot;
/// Phase machine.
pub mod sync_machine;
/// Manual refresh cooldown.
pub mod throttle;

pub use self::collection::MatchCollection;
pub use self::snapshot::{EnrichmentMap, SyncSnapshot};
pub use self::sync_machine::{InvalidTransition, SyncEvent, SyncPhase, SyncStateMachine};
pub use self::throttle::{RefreshGate, RefreshThrottle};
