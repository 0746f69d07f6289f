pub mod activity;
pub mod comment;
pub mod settings;
pub mod subscription;
pub mod user;
pub mod vote;

pub use activity::*;
pub use comment::*;
pub use settings::*;
pub use subscription::*;
pub use user::*;
pub use vote::*;
