//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types shared across the crate.
//! - `adapters`: filesystem and watcher implementations.

pub mod adapters;
pub mod bus;
pub mod ports;

pub use bus::{sync_bus, SyncBusReceiver, SyncBusSender, SyncEvent};
