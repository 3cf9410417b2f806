pub mod pdb;
pub mod traits;
