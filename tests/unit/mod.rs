//! Unit Tests Module
//!
//! Component tests that run without a live node.
