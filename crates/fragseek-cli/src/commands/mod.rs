pub mod common;
pub mod linear;
pub mod spot;
pub mod stems;
