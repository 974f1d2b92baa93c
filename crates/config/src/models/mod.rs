pub mod api_observability;
pub mod app_config;
pub mod dispatcher;
pub mod event_queue;
pub mod logging;
pub mod resilience;

pub use api_observability::*;
pub use app_config::*;
pub use dispatcher::*;
pub use event_queue::*;
pub use logging::*;
pub use resilience::*;
