pub use handlers::polka_webhook;

mod handlers;
pub mod types;
