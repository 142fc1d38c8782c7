pub mod blog;
pub mod contact;
pub mod education;
pub mod experience;
pub mod profile;
pub mod project;
pub mod shared;
