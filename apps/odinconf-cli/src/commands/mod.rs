pub mod generate;
pub mod pairs;
pub mod show;
