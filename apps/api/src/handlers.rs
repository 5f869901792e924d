pub mod fallback;
pub mod health;
pub mod request_log;
