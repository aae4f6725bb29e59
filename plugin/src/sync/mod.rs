//! Change-feed reconciliation

pub mod reconcile;
