mod error;
mod functions;
mod traits;
mod types;

pub use error::AuthError;
pub use functions::{
    calculate_expiry, generate_session_token, hash_password, is_session_expired, parse_token,
    verify_password,
};
pub use traits::{Result, SessionRepository};
pub use types::{Session, SessionToken};
