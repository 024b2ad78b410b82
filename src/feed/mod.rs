mod component;
mod phase;
mod view;

pub use component::{CameraFeed, FeedTiming};
pub use phase::{FeedFlags, FeedPhase};
pub use view::{CameraFeedView, FeedOverlay};
