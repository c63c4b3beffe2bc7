pub mod capacity;
pub mod model;
pub mod value;

pub use capacity::*;
pub use model::*;
pub use value::*;
