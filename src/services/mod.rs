// src/services/mod.rs

pub mod feed;
pub mod media;
