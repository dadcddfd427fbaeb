//! Client-side core for importing mod folders into a catalog and generating
//! their preview media.
//!
//! The host shell implements the collaborator traits in
//! [`services::backend`] and drives the state objects from its UI.

pub mod services;
pub mod types;
#[cfg(test)]
pub mod test_utils;
