//! # cropsend
//!
//! Two small engines behind a photo upload flow:
//!
//! - an **image picker** that takes a picked image through a zoomable,
//!   pannable crop overlay and hands back a bitmap cropped to a fixed frame;
//! - an **error-classifying request wrapper** that sends JSON or multipart
//!   requests and reports each call through exactly one success or failure
//!   callback.
//!
//! Both run headless: gestures are method calls on a [`picker::CropSession`],
//! and HTTP goes through a [`network::Transport`] that tests can script.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Crop geometry: recentering, visible region, center crop, PNG encoding via the `image` crate |
//! | [`picker`] | Picker session state machine, zoom/pan gestures, image sources |
//! | [`network`] | Resources, parameter encoding, multipart bodies, transport, failure classification |
//! | [`config`] | `cropsend.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Pipeline
//!
//! ```text
//! ImageSource ─pick─▶ ImagePicker ─gestures─▶ CropSession
//!                          │
//!                       confirm: render visible region → center crop
//!                          ▼
//!                     on_finished(Bitmap) ─encode_png─▶ ApiClient::upload
//!                                                          │
//!                                  on_success(Value) ◀─────┴────▶ on_failure(reason, error)
//! ```
//!
//! # Design Decisions
//!
//! ## Caller-Owned Picker
//!
//! There is no process-wide picker. Each [`picker::ImagePicker`] runs one
//! session and owns its handlers, so two pickers never see each other's
//! callbacks.
//!
//! ## Blocking Requests
//!
//! The wrapper uses `reqwest::blocking`. A call returns only after its single
//! callback has run, which keeps callback ordering trivial for callers.

pub mod config;
pub mod imaging;
pub mod network;
pub mod output;
pub mod picker;
