#![warn(clippy::pedantic)]

pub mod local_storage;
pub mod rest;
pub mod rows;

pub use rest::{Client, GlooNetSendRequest, SendRequest};
