//! HTTP surface: check-in ingestion, dashboard queries and operator actions.

mod handlers;
mod middleware;
mod router;
mod state;

pub use router::{build_router, run_api_server};
pub use state::ApiState;
