pub mod gate;
pub mod token;

pub use gate::{AdminIdentity, SESSION_COOKIE, clear_session_cookie, session_cookie, session_token};
pub use token::TokenCodec;
