//! Viewport to surface coordinate mapping.
//!
//! A canvas has a logical pixel buffer and an on-screen box, and the two
//! drift apart whenever the page is zoomed or the box is resized by layout.
//! Every input sample goes through [`client_to_surface`] so strokes stay under
//! the pointer regardless.

use crate::graphics::{PixelPos, Rect, Size, SurfacePos};

/// One raw input sample: where the pointer was in the viewport, and where the
/// surface was on screen at that moment.
#[derive(Default, Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sample {
    pub client: PixelPos,
    pub bounds: Rect,
}

impl Sample {
    pub fn new(client: PixelPos, bounds: Rect) -> Self {
        Sample { client, bounds }
    }

    /// A sample on a surface drawn at its natural size at the viewport origin.
    pub fn unscaled(x: f32, y: f32, logical: Size) -> Self {
        Sample {
            client: PixelPos { x, y },
            bounds: Rect::new(0., 0., logical.width, logical.height),
        }
    }
}

fn axis_scale(logical: f32, rendered: f32) -> f32 {
    if rendered > 0. && logical > 0. {
        logical / rendered
    } else {
        1.
    }
}

/// `(client - origin) * (logical / rendered)`, per axis.
pub fn client_to_surface(sample: Sample, logical: Size) -> SurfacePos {
    let Sample { client, bounds } = sample;
    let sx = axis_scale(logical.width, bounds.width);
    let sy = axis_scale(logical.height, bounds.height);

    SurfacePos {
        x: (client.x - bounds.x) * sx,
        y: (client.y - bounds.y) * sy,
    }
}
