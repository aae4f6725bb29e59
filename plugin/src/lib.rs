//! Studio Pages Deploy
//!
//! Headless studio tool for triggering and monitoring Pages deployments.
//! Deployment configurations live as documents in the studio's content
//! lake; a list/form controller reconciles the live change feed into local
//! state and creates new configurations through the form flow.

pub mod errors;
pub mod logs;
pub mod models;
pub mod pages;
pub mod store;
pub mod sync;
pub mod tool;
pub mod workers;
