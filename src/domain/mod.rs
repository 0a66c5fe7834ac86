pub mod bluetooth;
pub mod models;
pub mod pagination;
pub mod settings;
