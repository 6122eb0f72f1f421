//! Page composition engine for the widget builder.
//!
//! A page is an ordered list of column-container rows; each row splits a
//! 12-unit grid into columns and each column holds content widgets (text,
//! image, button, card, table). This crate owns the document model and the
//! three protocols that mutate it: drag-and-drop insertion and reordering,
//! the inspector's draft/commit workflow, and named-layout persistence. The
//! rendering layer reads the document and feeds gestures in as payloads,
//! targets, and draft edits.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::Builder`] facade driven by the rendering layer |
//! | [`doc`] | Document store, [`doc::Command`] reducer and [`doc::Action`] results |
//! | [`widget`] | Row, column and leaf widget types plus their wire records |
//! | [`factory`] | Default widget content, column presets, identity generation |
//! | [`dnd`] | Transfer payloads and drop classification |
//! | [`inspector`] | Draft editor state machine and validation |
//! | [`persistence`] | Named layout snapshots over a key/value [`persistence::Storage`] |
//! | [`config`] | Environment-driven configuration |
//! | [`error`] | Error codes and error-kind classification |
//! | [`consts`] | Grid and default-content constants |

pub mod config;
pub mod consts;
pub mod dnd;
pub mod doc;
pub mod engine;
pub mod error;
pub mod factory;
pub mod inspector;
pub mod persistence;
pub mod widget;
