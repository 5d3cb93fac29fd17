mod dto;
mod error;
mod http_client;

pub use error::RemoteError;
pub use http_client::HttpRemoteService;
