// src/models/mod.rs

pub mod attachment;
pub mod comment;
pub mod post;
pub mod user;
