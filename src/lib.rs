//! Cell cursor navigation over tables.
//!
//! [`nav::Navigator`] is the selection state machine; it drives any host that
//! implements [`nav::GridModel`] and [`nav::Presentation`]. The rest of the
//! crate is the terminal front end built on top of it.

pub mod app;
pub mod input;
pub mod model;
pub mod msg;
pub mod nav;
