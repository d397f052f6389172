pub mod app;
pub mod client;
pub mod conf;
pub mod envelope;
pub mod publish;
pub mod server;
pub mod source;
pub mod trigger;
