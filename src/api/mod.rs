pub mod client;
pub mod error;
pub mod odata;
pub mod transport;

pub use client::HttpClient;
pub use transport::Transport;
