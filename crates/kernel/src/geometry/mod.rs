pub mod basis;
pub mod point;
pub mod vector;
