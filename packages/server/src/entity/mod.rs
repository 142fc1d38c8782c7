pub mod blog;
pub mod contact_message;
pub mod education;
pub mod experience;
pub mod profile;
pub mod project;
