//! Identity resolution.
//!
//! Maps an external identity-provider subject to an internal user row,
//! creating the row lazily on first sight. Every other module takes a
//! resolved [`AppUser`] or an internal user id; nothing outside this module
//! touches the external subject.

pub mod models;
pub mod resolver;

pub use models::AppUser;
pub use resolver::{find_by_external_id, resolve};
