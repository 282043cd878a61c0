pub mod row;
pub mod artifact;

pub use row::*;
pub use artifact::*;
