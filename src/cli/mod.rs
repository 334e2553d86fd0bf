pub mod auth;
pub mod db;
