//! # Core Interaction Logic
//!
//! This module contains Feedwire's gesture handling.
//! It talks to the server and the window only through traits.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Action (dispatch)    │
//!                    │  • Reconciler           │
//!                    │  • MenuTracker          │
//!                    │  • DisabledControl      │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │  Backend   │      │    Host    │      │    Page    │
//!     │ (reqwest)  │      │ (alert,    │      │ (arena     │
//!     │            │      │  reload)   │      │  DOM)      │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`action`]: gestures, the `Action` enum and the ordered dispatch table
//! - [`reconciler`]: request round trips and DOM reconciliation
//! - [`guard`]: disable-until-settled scoping for request controls
//! - [`menu`]: the single open post menu
//! - [`label`]: comment count label arithmetic
//! - [`config`]: settings and their override order

pub mod action;
pub mod config;
pub mod guard;
pub mod label;
pub mod menu;
pub mod page;
pub mod reconciler;
