pub mod dashboard;
pub mod leave;
