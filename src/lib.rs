// src/lib.rs

//! postmirror: static mirror of Naver/Tistory blog feeds

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
