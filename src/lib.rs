pub mod app;
pub mod card;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod fault;
pub mod feed;
pub mod keyboard_input;
pub mod model;
pub mod seed;
pub mod store;

#[cfg(feature = "server")]
pub mod server;

pub use app::{ComponentState, DashboardOrchestrator, ShutdownReason};
pub use card::{DeviceCard, DeviceCardView, SliderView};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardSync, DashboardView};
pub use error::{DashboardError, GestureError, Result, StorageError};
pub use events::{
    DashboardEvent, EventBus, EventFilter, EventHandler, EventMetrics, EventReceiver,
};
pub use fault::{AlwaysFail, FaultInjector, NeverFail, RandomFaults, ScriptedFaults};
pub use feed::{CameraFeed, CameraFeedView, FeedPhase, FeedTiming};
pub use model::{Camera, ConnectionStatus, Device, DeviceType, SliderConfig};
pub use seed::MockSeed;
pub use store::{DeviceStats, DeviceStore, FileStorage, MemoryStorage, StatePersistence};

#[cfg(feature = "server")]
pub use server::{DashboardServer, DashboardServerBuilder};
