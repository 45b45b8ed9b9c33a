pub mod common;
pub mod docs;

pub use common::*;
pub use docs::*;
