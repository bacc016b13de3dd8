//! Log sink backends - append-only files and an in-memory buffer.

mod file;
mod layout;
mod memory;

pub use file::FileSink;
pub use layout::LogLayout;
pub use memory::InMemorySink;
