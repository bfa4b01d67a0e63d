mod event;
mod flow;
pub mod user;

pub use event::{AuthEvent, SigninEvent, SignoutEvent};
pub use flow::Flow;
pub use user::UserInfo;
