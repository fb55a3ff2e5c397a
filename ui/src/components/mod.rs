pub mod app;
pub mod booking_detail;
pub mod booking_state;
pub mod browser;
pub mod chat_widget;
pub mod config;
pub mod landing;
pub mod login;
pub mod markdown;
pub mod ops_center;
pub mod session_state;
