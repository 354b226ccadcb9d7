pub mod clock;
pub mod steering;
pub mod swimmer;
