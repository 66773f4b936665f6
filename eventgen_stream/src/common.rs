//! Common configuration pieces shared by the event stream modules

pub mod config;
