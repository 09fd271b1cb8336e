// Service module exports
// Everything that talks to SQLite or holds the local mirror lives here

pub mod config;
pub mod database;
pub mod persistence;
pub mod schedule;
pub mod storage;
