//! Page composition: grouped device cards, camera feeds and the system
//! status counters, rendered as a view model or as terminal text.

mod composition;
mod sync;
mod text;
mod view;
#[cfg(test)]
mod tests;

pub use composition::{Dashboard, SyncReport};
pub use sync::DashboardSync;
pub use view::{
    group_title, CameraSection, DashboardView, DeviceGroup, DeviceSection, SectionHeader,
    SystemStatus, DASHBOARD_SUBTITLE, DASHBOARD_TITLE,
};
