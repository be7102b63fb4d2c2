pub use super::comments::Entity as Comments;
pub use super::movies::Entity as Movies;
pub use super::user_favorites::Entity as UserFavorites;
pub use super::users::Entity as Users;
