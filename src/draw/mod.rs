pub mod build;
pub mod primitive;
