pub mod booking;
pub mod config;
pub mod error;
pub mod export;
pub mod intake;
pub mod llm;
pub mod scan;
pub mod session;
pub mod storage;
pub mod store;
pub mod transport;
