mod models;
mod session;

pub use models::*;
pub use session::*;
