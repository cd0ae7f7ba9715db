/// Backend access for match history, builds, ranks and advice.
pub mod match_store;
/// Wire and domain model definitions.
pub mod models;
/// Backend-agnostic error types.
pub mod storage;
