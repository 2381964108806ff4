pub mod model;
pub mod supplier;
