use super::composition::Dashboard;
use crate::error::EventBusError;
use crate::events::{DashboardEvent, EventFilter, EventHandler};
use async_trait::async_trait;
use std::sync::Arc;

/// Keeps mounted feeds and cards in step with wholesale collection swaps
pub struct DashboardSync {
    dashboard: Arc<Dashboard>,
}

impl DashboardSync {
    pub fn new(dashboard: Arc<Dashboard>) -> Self {
        Self { dashboard }
    }
}

#[async_trait]
impl EventHandler for DashboardSync {
    async fn handle_event(&mut self, _event: DashboardEvent) -> Result<(), EventBusError> {
        self.dashboard.sync();
        Ok(())
    }

    fn handler_name(&self) -> &str {
        "dashboard_sync"
    }

    fn event_filter(&self) -> EventFilter {
        EventFilter::EventTypes(vec!["devices_replaced", "cameras_replaced"])
    }
}
