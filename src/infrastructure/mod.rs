pub mod api;
pub mod bluetooth;
pub mod logging;
