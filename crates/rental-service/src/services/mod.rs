pub mod apartment_service;
pub mod review_service;
pub mod revocation_service;
pub mod session_service;
pub mod user_service;
