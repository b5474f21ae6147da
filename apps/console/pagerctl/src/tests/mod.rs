mod commands;
mod logger;
