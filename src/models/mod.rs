//! Data models for session state.

pub mod session;

pub use session::{Session, SessionError, SessionUser, TokenState, UserSnapshot};
