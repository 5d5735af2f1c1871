pub mod gate;
pub mod password;
pub mod token;

pub use gate::require_auth;
pub use token::{Claims, TokenSigner};
