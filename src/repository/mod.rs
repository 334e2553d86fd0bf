pub mod application_link;
pub mod employee;
pub mod job;
pub mod job_application;
pub mod notification;
pub mod user;
