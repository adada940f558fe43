pub mod admin;
pub mod auth;
pub mod feed;
pub mod participant;
pub mod signup;
