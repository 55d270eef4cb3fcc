mod definitions;
pub use definitions::*;

mod format;
pub use format::*;
