mod credentials;
mod dispatch;
mod error;
mod log_entry;
