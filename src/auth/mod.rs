//! Authentication module
//!
//! Argon2id password hashing and HS256 bearer tokens.

mod password;
mod token;

pub use password::{CredentialError, CredentialManager};
pub use token::{AuthError, Claims, IssueError, TokenService};
