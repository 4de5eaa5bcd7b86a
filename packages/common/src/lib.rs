#![no_std]

pub mod time;
pub mod ttl;
pub mod utils;
