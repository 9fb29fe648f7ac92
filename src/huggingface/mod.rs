//! Client for the hosted Hugging Face inference APIs.
mod core;
mod fetch;

pub use self::core::*;
pub use self::fetch::*;
