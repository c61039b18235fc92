pub mod clock;
pub mod db;
pub mod limiter;
pub mod mail;
pub mod recaptcha;
pub mod utils;
