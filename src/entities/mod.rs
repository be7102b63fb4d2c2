pub mod prelude;

pub mod comments;
pub mod movies;
pub mod user_favorites;
pub mod users;
