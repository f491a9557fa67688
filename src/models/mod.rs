pub mod blog;
pub mod contact;
pub mod image;
pub mod project;
pub mod user;

pub use blog::*;
pub use contact::*;
pub use image::*;
pub use project::*;
pub use user::*;
