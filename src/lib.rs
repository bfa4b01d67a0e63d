pub mod auth;
pub mod config;
pub mod cookie;
pub mod directory;
pub mod error;
pub mod identity;
pub mod models;
pub mod session;
pub mod token;
pub mod ui;
pub mod utils;

pub use auth::{
    Authenticator, DefaultHooks, LoginHooks, LogoutCallback, LogoutDecision, RenderContext,
};
pub use config::{Config, CookieConfig, LdapConfig, LoginConfig, LogoutConfig, SessionStateConfig};
pub use error::AuthError;
pub use models::{Flow, UserInfo};
