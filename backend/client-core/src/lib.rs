pub mod connection;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod session;
pub mod state;

#[cfg(test)]
mod tests;

pub const CONTROLLER_HOSTNAME: &str = "127.0.0.1";
pub const CONTROLLER_PORT: u16 = 8055;
pub const CONTROLLER_DEFAULT_URL: &str =
    const_format::concatcp!("ws://", CONTROLLER_HOSTNAME, ":", CONTROLLER_PORT);
