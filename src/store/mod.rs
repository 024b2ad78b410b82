mod persistence;
mod state;
mod stats;
#[cfg(test)]
mod tests;

pub use persistence::{
    FileStorage, MemoryStorage, PersistedEnvelope, SharedPersistence, StatePersistence,
    StoreSnapshot, DEFAULT_STORAGE_KEY,
};
pub use state::{format_local_time, DeviceStore};
pub use stats::DeviceStats;
