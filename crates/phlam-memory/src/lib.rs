mod store;

pub use store::{MemoryStore, DEFAULT_TIMEZONE, TURN_CAP};
