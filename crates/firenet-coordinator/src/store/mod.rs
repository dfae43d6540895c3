//! Server store implementations

mod file;
mod memory;

pub use file::TomlServerStore;
pub use memory::MemoryServerStore;
