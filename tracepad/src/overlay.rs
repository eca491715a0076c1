use crate::{
    config::Reference,
    error::Error,
    graphics::{fit_rect, Rect, Size},
    ImageHandle,
};
use std::future::Future;

/// The reference picture shown under the strokes.
///
/// Only the image is kept. Its placement is derived from the surface size each
/// time it is painted, so a resize can never leave it at stale coordinates.
#[derive(Debug)]
pub struct Overlay<I: ImageHandle> {
    image: I,
    name: String,
}

impl<I: ImageHandle> Overlay<I> {
    pub fn new(image: I, name: impl Into<String>) -> Self {
        Overlay {
            image,
            name: name.into(),
        }
    }

    pub fn image(&self) -> &I {
        &self.image
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fit_rect(&self, surface: Size) -> Rect {
        fit_rect(self.image.size(), surface)
    }
}

/// Identifies one Show-Reference request. A result is only installed if its
/// ticket is still current when it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTicket {
    pub(crate) generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRequest {
    pub ticket: ReferenceTicket,
    pub reference: Reference,
}

impl ReferenceRequest {
    pub fn path(&self) -> &str {
        &self.reference.path
    }

    pub fn name(&self) -> &str {
        &self.reference.name
    }
}

/// Decodes reference pictures. Failures should carry
/// [`ErrorKind::ImageLoad`](crate::error::ErrorKind::ImageLoad).
pub trait ImageLoader {
    type Image: ImageHandle;

    fn load(&self, path: &str) -> impl Future<Output = Result<Self::Image, Error>>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn placement_follows_surface() {
        let overlay = Overlay::new(Size::new(200., 100.), "dog");

        let small = overlay.fit_rect(Size::new(600., 400.));
        assert_eq!(small, Rect::new(0., 50., 600., 300.));

        let big = overlay.fit_rect(Size::new(1000., 400.));
        assert_eq!(big, Rect::new(100., 0., 800., 400.));
    }
}
