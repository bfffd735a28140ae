/// Database model definitions.
pub mod models;
/// Match and user storage backends.
pub mod roster_store;
/// Storage abstraction layer for database operations.
pub mod storage;
