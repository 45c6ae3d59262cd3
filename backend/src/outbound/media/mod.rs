//! Image storage adapters.

mod cap_std_store;
mod memory_store;

pub use cap_std_store::CapStdImageStore;
pub use memory_store::InMemoryImageStore;
