mod helpers;
mod session;
