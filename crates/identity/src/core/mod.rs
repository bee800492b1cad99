//! Core types for credential acquisition

mod error;
mod secret;
mod token;

pub use error::{AuthError, Result};
pub use secret::SecretString;
pub use token::AccessToken;
