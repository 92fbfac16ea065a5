pub mod daemon;
pub mod http;
