pub mod account_service;
pub mod identifiers;
pub mod session_service;
