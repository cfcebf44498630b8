pub mod accounts;
pub mod clock;
pub mod delivery;
pub mod memory;
pub mod redis_store;
pub mod store;
pub mod sweep;
