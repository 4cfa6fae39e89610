// src/services/mod.rs

pub mod posts;
pub mod users;

pub use posts::PostsService;
pub use users::UsersService;
