//! repo-upload - upload local branches of a multi-repository workspace for code review
//!
//! The library is organised around the upload round trip:
//! - [`options`] - review metadata, its text format and persistence
//! - [`upload`] - edit-script protocol, confirmation and push/report
//! - [`remote`] - review server classification and push transport
//! - [`repo`], [`editor`], [`prompt`], [`config`] - collaborators

pub mod config;
pub mod editor;
pub mod error;
pub mod options;
pub mod prompt;
pub mod remote;
pub mod repo;
pub mod types;
pub mod upload;
