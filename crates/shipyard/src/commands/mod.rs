pub mod package;
pub mod push;
pub mod tags;
