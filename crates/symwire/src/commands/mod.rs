pub mod encode;
pub mod escape;
pub mod hex;

pub use encode::*;
pub use escape::*;
pub use hex::*;
