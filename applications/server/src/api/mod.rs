/// API route modules
pub mod envelope;
pub mod fallback;
pub mod health;
pub mod users;
