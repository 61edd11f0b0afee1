pub mod auth;
pub mod catalog;
pub mod fees;
pub mod health;
pub mod payments;
pub mod reports;
pub mod students;
pub mod terms;
pub mod users;
