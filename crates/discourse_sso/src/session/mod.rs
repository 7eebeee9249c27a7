mod definition;
mod memory;

pub use definition::SessionSlot;
pub use memory::MemorySlot;
