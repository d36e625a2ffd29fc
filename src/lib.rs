pub mod config;
pub mod ibutton;
pub mod importers;
pub mod report;
pub mod utils;
pub mod writers;
