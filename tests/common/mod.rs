#![allow(dead_code)]

pub use depqueue_test_utils::*;
