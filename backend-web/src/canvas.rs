use tracepad::{stroke::StrokeElement, Color, ImageHandle, Rect, Size, Surface};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// A reference picture decoded by the browser.
#[derive(Debug, Clone)]
pub struct WebImage(pub HtmlImageElement);

impl ImageHandle for WebImage {
    fn size(&self) -> Size {
        Size::new(
            self.0.natural_width() as f32,
            self.0.natural_height() as f32,
        )
    }
}

/// The canvas 2D context as a drawing surface. The canvas element's
/// `width`/`height` attributes are the logical size, CSS decides the
/// rendered size.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        let surface = CanvasSurface { canvas, ctx };
        surface.set_pen();
        surface
    }

    /// Where the canvas content currently sits on screen. The bounding rect
    /// includes the border, which the bitmap is not stretched over.
    pub fn bounds(&self) -> Rect {
        let rect = self.canvas.get_bounding_client_rect();
        let canvas: &web_sys::Element = &self.canvas;
        content_box(
            Rect::new(
                rect.left() as f32,
                rect.top() as f32,
                rect.width() as f32,
                rect.height() as f32,
            ),
            (canvas.client_left(), canvas.client_top()),
            (canvas.client_width(), canvas.client_height()),
        )
    }

    // setting width or height resets the whole context state
    fn set_pen(&self) {
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
    }
}

/// The part of a border box the bitmap is drawn into.
fn content_box(border_box: Rect, border: (i32, i32), client: (i32, i32)) -> Rect {
    Rect::new(
        border_box.x + border.0 as f32,
        border_box.y + border.1 as f32,
        client.0 as f32,
        client.1 as f32,
    )
}

impl Surface<WebImage> for CanvasSurface {
    fn size(&self) -> Size {
        Size::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn resize(&mut self, size: Size) {
        self.canvas.set_width(size.width.max(0.) as u32);
        self.canvas.set_height(size.height.max(0.) as u32);
        self.set_pen();
    }

    fn clear(&mut self) {
        let size = Surface::<WebImage>::size(self);
        self.ctx
            .clear_rect(0., 0., size.width as f64, size.height as f64);
    }

    fn draw_image(&mut self, image: &WebImage, rect: Rect, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
        if let Err(err) = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            &image.0,
            rect.x as f64,
            rect.y as f64,
            rect.width as f64,
            rect.height as f64,
        ) {
            log::error!("draw_image: {err:?}");
        }
        self.ctx.set_global_alpha(1.);
    }

    fn stroke_polyline(&mut self, points: &[StrokeElement], color: Color, width: f32) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };

        self.ctx.set_stroke_style_str(&color.to_hex());
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        if rest.is_empty() {
            // a zero length subpath still gets round caps
            self.ctx.line_to(first.x as f64, first.y as f64);
        }
        for point in rest {
            self.ctx.line_to(point.x as f64, point.y as f64);
        }
        self.ctx.stroke();
    }
}
