pub mod aquarium;
pub mod constants;
pub mod perception;
pub mod state;
pub mod systems;
