// src/lib.rs

//! jobscout: boss.az and ejob.az listing scraper library

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
