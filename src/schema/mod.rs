pub mod application;
pub mod auth;
pub mod common;
pub mod employee;
pub mod job;
pub mod notification;
pub mod user;
