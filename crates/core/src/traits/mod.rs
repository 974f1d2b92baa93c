pub mod coordination;
pub mod publisher;
pub mod runtime;

pub use coordination::*;
pub use publisher::*;
pub use runtime::*;
