pub mod admin;
pub mod comments;
pub mod hooks;
pub mod profile;
