//! Infrastructure: relay transport, chart repositories and local storage.

pub mod http_chart_repository;
pub mod inmemory_chart_repository;
pub mod local_store;
pub mod relay;

pub use http_chart_repository::HttpChartRepository;
pub use inmemory_chart_repository::InMemoryChartRepository;
pub use local_store::{FLOW_KEY, LocalFlowStore};
pub use relay::{ACK_TIMEOUT, RelayConnection, RelayEvent, relay_url};
