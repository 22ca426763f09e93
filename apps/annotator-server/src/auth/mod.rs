//! Authentication: password hashing, session tokens, and the request extractor

mod extractor;
mod password;
mod token;

pub use extractor::*;
pub use password::*;
pub use token::*;
