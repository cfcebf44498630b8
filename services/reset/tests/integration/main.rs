mod helpers;

mod consume_token_test;
mod request_challenge_test;
