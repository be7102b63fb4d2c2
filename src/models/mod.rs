pub mod comment;
pub mod movie;
pub mod user;
pub mod views;
