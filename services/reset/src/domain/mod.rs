pub mod challenge_store;
pub mod repository;
pub mod secret;
pub mod token_store;
pub mod types;
