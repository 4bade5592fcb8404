//! Batch scientific volume rendering on top of the `scivis` engine.
//!
//! The flow mirrors the engine's object graph: load a [`Volume`], give it a
//! [`TransferFunction`], point a [`Camera`] at it, then let the [`Renderer`]
//! assemble the scene graph and encode frames. The renderer caches the scene
//! graph and only rebuilds it when the volume, render kind or isovalues
//! change.

mod camera;
mod colormap;
mod config;
mod error;
mod renderer;
mod transfer_function;
mod volume;

pub use camera::Camera;
pub use colormap::ColorMap;
pub use config::Config;
pub use error::{Error, Result};
pub use renderer::{ImageType, Renderer};
pub use transfer_function::{TransferFunction, TABLE_SIZE};
pub use volume::Volume;
