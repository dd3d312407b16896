//! Core plumbing shared by the scheduler

pub mod time;
