pub mod comment_service;
pub mod report_service;
pub mod session_service;
pub mod user_service;
