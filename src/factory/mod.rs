pub mod employee;
pub mod job;
pub mod notification;
pub mod user;
