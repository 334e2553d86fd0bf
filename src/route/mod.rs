pub mod application;
pub mod auth;
pub mod employee;
#[cfg(test)]
mod employee_test;
pub mod job;
pub mod notification;
pub mod public;
pub mod user;
