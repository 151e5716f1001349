pub mod file_source;
pub mod http_client;
