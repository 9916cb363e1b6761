pub mod industry_commands;
pub mod user_commands;
pub mod utils;
