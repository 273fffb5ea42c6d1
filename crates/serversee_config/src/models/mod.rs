pub mod client;
pub mod logging;
pub mod server;
pub mod serversee;
