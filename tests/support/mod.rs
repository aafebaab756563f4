#![allow(dead_code)]

pub mod harness;
pub mod records;
pub mod suspending_queue;
