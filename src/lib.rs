pub mod cart;
pub mod schema;
pub mod services;
pub mod settings;
pub mod types;
