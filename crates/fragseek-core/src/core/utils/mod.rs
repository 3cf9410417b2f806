pub mod codes;
pub mod geometry;
pub mod superposition;
