use image::{Rgba, RgbaImage};
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Transform,
};
use tracepad::{
    lyon::lyon_tessellation::StrokeTessellator,
    stroke::StrokeElement,
    tess::{self, Mesh},
    Color, Error, ErrorExt, ErrorKind, ImageHandle, Rect, Size, Surface,
};

/// A decoded reference picture, premultiplied and ready to blit.
#[derive(Debug, Clone)]
pub struct Picture(Pixmap);

impl Picture {
    /// `None` for an image with no pixels.
    pub fn from_rgba(image: &RgbaImage) -> Option<Picture> {
        let mut pixmap = Pixmap::new(image.width(), image.height())?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Some(Picture(pixmap))
    }
}

impl ImageHandle for Picture {
    fn size(&self) -> Size {
        Size::new(self.0.width() as f32, self.0.height() as f32)
    }
}

/// Software surface. Strokes are tessellated with lyon and the mesh is filled
/// by tiny-skia.
pub struct Raster {
    pixmap: Pixmap,
    background: Color,
    tessellator: StrokeTessellator,
}

fn buffer_dim(len: f32) -> u32 {
    if len.is_finite() && len >= 1. {
        len.round() as u32
    } else {
        1
    }
}

fn skia_color(color: Color) -> tiny_skia::Color {
    let [r, g, b] = color.0;
    tiny_skia::Color::from_rgba8(r, g, b, 0xff)
}

/// One closed subpath per triangle, all wound the same way so the nonzero
/// rule fills their union.
fn mesh_path(mesh: &Mesh) -> Option<Path> {
    let mut path = PathBuilder::new();
    for tri in mesh.indices.chunks_exact(3) {
        let a = mesh.vertices[tri[0] as usize];
        let mut b = mesh.vertices[tri[1] as usize];
        let mut c = mesh.vertices[tri[2] as usize];
        if (b - a).cross(c - a) < 0. {
            std::mem::swap(&mut b, &mut c);
        }

        path.move_to(a.x, a.y);
        path.line_to(b.x, b.y);
        path.line_to(c.x, c.y);
        path.close();
    }
    path.finish()
}

impl Raster {
    pub fn new(size: Size, background: Color) -> Result<Self, Error> {
        let (width, height) = (buffer_dim(size.width), buffer_dim(size.height));
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            Error::from(std::io::Error::new(
                std::io::ErrorKind::OutOfMemory,
                format!("cannot allocate a {width}x{height} surface"),
            ))
        })?;
        pixmap.fill(skia_color(background));

        Ok(Raster {
            pixmap,
            background,
            tessellator: StrokeTessellator::new(),
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    pub fn to_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let color = src.demultiply();
            *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
        }
        image
    }

    pub fn save(&self, path: &std::path::Path) -> image::ImageResult<()> {
        log::info!(
            "write {}x{} to {}",
            self.pixmap.width(),
            self.pixmap.height(),
            path.display()
        );
        self.to_image().save(path)
    }

    fn fill_mesh(&mut self, mesh: &Mesh, color: Color) {
        let Some(path) = mesh_path(mesh) else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(skia_color(color));
        paint.anti_alias = true;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

impl Surface<Picture> for Raster {
    fn size(&self) -> Size {
        Size::new(self.pixmap.width() as f32, self.pixmap.height() as f32)
    }

    fn resize(&mut self, size: Size) {
        match Raster::new(size, self.background) {
            Ok(resized) => *self = resized,
            Err(err) => err.display(),
        }
    }

    fn clear(&mut self) {
        self.pixmap.fill(skia_color(self.background));
    }

    fn draw_image(&mut self, image: &Picture, rect: Rect, alpha: f32) {
        let natural = image.size();
        if natural.is_empty() || rect.is_empty() {
            return;
        }

        let transform = Transform::from_row(
            rect.width / natural.width,
            0.,
            0.,
            rect.height / natural.height,
            rect.x,
            rect.y,
        );
        let paint = PixmapPaint {
            opacity: alpha,
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, image.0.as_ref(), &paint, transform, None);
    }

    fn stroke_polyline(&mut self, points: &[StrokeElement], color: Color, width: f32) {
        match tess::tessellate_polyline(&mut self.tessellator, points, width) {
            Ok(mesh) => self.fill_mesh(&mesh, color),
            Err(err) => err.display(),
        }
    }
}
