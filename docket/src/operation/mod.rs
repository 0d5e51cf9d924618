mod options;
mod read_operations;
mod write_operations;

pub use options::*;
pub use read_operations::*;
pub use write_operations::*;
