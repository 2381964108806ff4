pub mod fetch;
pub mod renderer;
pub mod surface;
