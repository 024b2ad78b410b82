mod handlers;
mod page;
mod routes;

pub use handlers::{ApiError, StatusRequest, ValueRequest};
pub use routes::{router, DashboardServer, DashboardServerBuilder, ServerState};
