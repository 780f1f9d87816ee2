//! Memory: bounded ring buffer (§4.3), CRDT replicated log (§4.3), and the
//! memory crystallizer (§4.9).

pub mod buffer;
pub mod crystal;
pub mod log;

pub use buffer::{MemoryBuffer, MemoryEvent, MemoryFilter, MemoryKind, MetadataValue};
pub use crystal::{MemoryCrystal, MemoryCrystallizerConfig};
pub use log::MemoryLog;
