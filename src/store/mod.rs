pub mod disk;
pub mod memory;

pub use disk::DiskQuoteCache;
pub use memory::MemoryQuoteCache;
