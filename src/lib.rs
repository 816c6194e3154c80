pub mod config;
pub mod exposure_stack;
pub mod logger;
