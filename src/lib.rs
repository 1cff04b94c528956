// src/lib.rs

//! blogsync: headless client for the content site's blog, likes, comments and forms

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
