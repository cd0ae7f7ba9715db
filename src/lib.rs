//! Library crate for match-history-sync: keeps a player's match history in sync with the
//! backend and enriches it with builds, ranks and advice.

/// Synchronization settings.
pub mod config;
/// Backend access and wire models.
pub mod dao;
/// Presentation-neutral views.
pub mod dto;
/// Service layer errors.
pub mod error;
/// Controller and one-shot lookups.
pub mod services;
/// Controller state types.
pub mod state;
