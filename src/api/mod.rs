pub mod dashboard;
pub mod health;
pub mod leave_request;
