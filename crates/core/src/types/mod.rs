//! Core types for Roster.
//!
//! This module provides type-safe wrappers for the roster domain.

pub mod account;
pub mod id;
pub mod record;
pub mod role;
pub mod username;
pub mod validation;

pub use account::{UserAccount, UserRef};
pub use id::*;
pub use record::{
    CustomerRecord, FULL_NAME_COLUMN, PHONE_NUMBER_COLUMN, REQUIRED_COLUMNS, RecordPatch,
    TAX_ID_COLUMN,
};
pub use role::Role;
pub use username::{Username, UsernameError};
pub use validation::{FieldErrors, describe_error_payload};
