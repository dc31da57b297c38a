pub mod ingest;
pub mod init;
pub mod report;
pub mod server;
pub mod user;
