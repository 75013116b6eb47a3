//! Core domain types

pub mod contact;
pub mod user;

pub use contact::*;
pub use user::*;
