pub mod build;
pub mod layout;
