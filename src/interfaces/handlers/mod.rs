pub mod contact;
pub mod home;
pub mod newsletter;
pub mod system;
