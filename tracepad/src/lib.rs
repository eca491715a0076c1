#![allow(clippy::new_without_default, clippy::derive_partial_eq_without_eq)]

pub mod config;
pub mod coords;
pub mod error;
pub mod event;
pub mod graphics;
pub mod history;
pub mod i18n;
pub mod overlay;
pub mod render;
pub mod session;
pub mod stroke;
pub mod tess;

pub extern crate lyon;
pub extern crate rand;

pub use crate::{
    config::Config,
    error::{Error, ErrorExt, ErrorKind},
    event::Event,
    graphics::{Color, PixelPos, Rect, Size, SurfacePos},
    history::History,
    overlay::{ImageLoader, Overlay, ReferenceRequest},
    render::{DisplayList, Surface},
    session::{Response, Session},
    stroke::{Stroke, StrokeElement},
};

pub const DEFAULT_BRUSH: f32 = 10.;
pub const MAX_BRUSH: f32 = 100.;
pub const MIN_BRUSH: f32 = 1.;

/// Opacity of the reference picture under the strokes.
pub const OVERLAY_ALPHA: f32 = 0.4;

/// Anything a surface can paint as an overlay. Only the natural size matters
/// to the model; pixels stay with the backend.
pub trait ImageHandle: std::fmt::Debug {
    fn size(&self) -> Size;
}

/// A bare size stands in for an image wherever pixels are irrelevant, such as
/// when recording to a [`DisplayList`].
impl ImageHandle for Size {
    fn size(&self) -> Size {
        *self
    }
}
