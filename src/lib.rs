//! Zest - task state and synchronization core for a Todoist-backed task manager
//!
//! This library keeps a unified view of a user's tasks, backed either by the
//! Todoist REST and Sync APIs (when a credential is stored) or by an offline
//! task list persisted locally.
//!
//! # Modules
//!
//! * [`config`] - Application configuration management
//! * [`storage`] - Durable key/value storage
//! * [`todoist`] - Todoist API client and wire types
//! * [`backend`] - Backend trait and normalisation into [`task::Task`]
//! * [`state`] - Application state and reducer
//! * [`sync`] - Runs remote operations through the reducer
//! * [`local`] - Offline task list
//! * [`workspace`] - Routes intents to the remote or local list

/// Backend abstraction layer
pub mod backend;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Offline task list
pub mod local;

/// File logging setup
pub mod logger;

/// Repository layer for database operations
pub mod repositories;

/// Application state and reducer
pub mod state;

/// Durable client storage
pub mod storage;

/// Remote operation dispatch
pub mod sync;

/// Unified task model
pub mod task;

/// Todoist API client and data models
pub mod todoist;

/// Utility functions for date/time handling
pub mod utils;

/// Intent routing between remote and local task lists
pub mod workspace;

pub use task::{Priority, Task, TaskChanges, TaskDraft};
