//! Auth primitives shared across Yata services.
//!
//! Provides bearer-token validation ([`token::TokenService`]) and the salted
//! password digest ([`password::PasswordHasher`]).

pub mod password;
pub mod token;
