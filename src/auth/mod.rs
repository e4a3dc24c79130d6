pub mod identity;
pub mod session;

pub use identity::{sign_in, IdentityClaims};
