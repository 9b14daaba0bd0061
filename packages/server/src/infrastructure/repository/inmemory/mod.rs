//! HashMap-backed repositories. All state lives for the lifetime of the process.

mod chart;
mod room;

pub use chart::InMemoryChartRepository;
pub use room::InMemoryRoomRepository;
