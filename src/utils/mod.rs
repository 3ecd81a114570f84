// src/utils/mod.rs

pub mod html;
pub mod slug;
