pub mod consume_token;
pub mod input;
pub mod request_challenge;
pub mod verify_challenge;
