//! State core of the dashboard builder.
//!
//! A dashboard is a canvas of chart widgets that users place, drag, resize,
//! customize, and save. This crate owns the widget records and everything
//! needed to persist and restore them: the snapshot wire format, the
//! session-scoped snapshot store, the restoration engine that decides what
//! the canvas shows when the editor opens, and the save orchestrator that
//! pushes snapshots to the remote dashboard API. Drawing charts and producing
//! pointer gestures are left to the host through the [`render::ChartSurface`]
//! and [`interaction::InteractionHandler`] seams.
//!
//! The same crate also ships the dashboard API server (`axum` + `sqlx`) that
//! the save orchestrator talks to.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`snapshot`] | Wire types: widget snapshots, chart configs, canvas sizes |
//! | [`chart`] | Normalized chart model, customization edits, color helpers |
//! | [`widget`] | Widget records and the insertion-ordered arena |
//! | [`render`] | Rendering surface trait |
//! | [`serializer`] | Widget record <-> snapshot |
//! | [`canvas_size`] | Preset/custom canvas-size negotiation |
//! | [`store`] | Snapshot store trait, typed access, session state |
//! | [`editor`] | Editor aggregate and user-level operations |
//! | [`interaction`] | Drag/resize capability interface |
//! | [`restore`] | One-shot restoration engine |
//! | [`flight`] | Keyed single-flight guard |
//! | [`save`] | Local capture/persist and the remote save orchestrator |
//! | [`api`] | Remote dashboard API trait and HTTP client |
//! | [`config`] | Environment-driven configuration |
//! | [`db`], [`services`], [`routes`], [`state`] | Dashboard API server |
//! | [`consts`] | Shared constants (store keys, default geometry, presets) |
//! | [`error`] | Error-code contract shared by all error enums |

pub mod api;
pub mod canvas_size;
pub mod chart;
pub mod config;
pub mod consts;
pub mod db;
pub mod editor;
pub mod error;
pub mod flight;
pub mod interaction;
pub mod render;
pub mod restore;
pub mod routes;
pub mod save;
pub mod serializer;
pub mod services;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod widget;
