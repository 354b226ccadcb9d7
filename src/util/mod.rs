pub mod position;
pub mod vec2;
