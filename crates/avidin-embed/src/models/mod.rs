pub mod chemberta;
pub mod esm2;
