pub mod bearer;
pub mod health;
pub mod password_reset;
