pub mod db;
pub mod evaluation;
pub mod security;
pub mod session;
pub mod sqlx_utils;
#[cfg(test)]
pub mod test_utils;
pub mod token;
pub mod utils;
pub mod validation;
