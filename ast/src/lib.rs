mod error;
mod nodes;

pub use error::*;
pub use nodes::*;
