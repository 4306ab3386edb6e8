//! Core library for the gsync command line application.
//!
//! The library mirrors remote spreadsheets into local files and keeps them in
//! step by comparing modification times. Remote access lives under
//! [`gsync::remote`], the in-memory table in [`gsync::model`], local file
//! formats in [`gsync::io`], the per-sheet synchronization logic in
//! [`gsync::sync`], and bulk orchestration in [`gsync::manager`].

pub mod gsync;

pub use gsync::{Result, SyncError, config, error, io, manager, model, remote, sync};
