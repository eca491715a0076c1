use crate::{
    graphics::{Color, Rect, Size, SurfacePos},
    overlay::Overlay,
    stroke::{Stroke, StrokeElement},
    ImageHandle,
};

/// A paintable pixel buffer. `size` is the logical buffer size, which is what
/// input samples are mapped into.
pub trait Surface<I: ImageHandle> {
    fn size(&self) -> Size;
    fn resize(&mut self, size: Size);
    fn clear(&mut self);
    fn draw_image(&mut self, image: &I, rect: Rect, alpha: f32);

    /// Draws a connected line through `points` at full opacity with round
    /// caps and joins. Per-point color and width are ignored.
    fn stroke_polyline(&mut self, points: &[StrokeElement], color: Color, width: f32);
}

pub fn paint_stroke<I, S>(surface: &mut S, stroke: &Stroke)
where
    I: ImageHandle,
    S: Surface<I>,
{
    surface.stroke_polyline(stroke.points(), stroke.color(), stroke.width());
}

/// Live feedback for one new sample. Uses the same primitive as a full
/// redraw so a later redraw covers exactly the same pixels.
pub fn paint_segment<I, S>(surface: &mut S, from: StrokeElement, to: StrokeElement)
where
    I: ImageHandle,
    S: Surface<I>,
{
    surface.stroke_polyline(&[from, to], from.color, from.width);
}

/// Rebuilds the whole surface: clear, overlay at reduced opacity, then every
/// stroke in paint order.
pub fn redraw<I, S>(surface: &mut S, overlay: Option<&Overlay<I>>, strokes: &[Stroke], alpha: f32)
where
    I: ImageHandle,
    S: Surface<I>,
{
    surface.clear();

    if let Some(overlay) = overlay {
        let rect = overlay.fit_rect(surface.size());
        if !rect.is_empty() {
            surface.draw_image(overlay.image(), rect, alpha);
        }
    }

    for stroke in strokes {
        paint_stroke::<I, S>(surface, stroke);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Size),
    Image {
        image: Size,
        rect: Rect,
        alpha: f32,
    },
    Polyline {
        points: Vec<SurfacePos>,
        color: Color,
        width: f32,
    },
}

/// Records draw calls instead of painting them. Clearing drops everything
/// recorded so far, so after a redraw the list is exactly one frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DisplayList {
    size: Size,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(size: Size) -> Self {
        DisplayList {
            size,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn polylines(&self) -> impl Iterator<Item = (&[SurfacePos], Color, f32)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Polyline {
                points,
                color,
                width,
            } => Some((points.as_slice(), *color, *width)),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = Rect> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Image { rect, .. } => Some(*rect),
            _ => None,
        })
    }
}

impl<I: ImageHandle> Surface<I> for DisplayList {
    fn size(&self) -> Size {
        self.size
    }

    fn resize(&mut self, size: Size) {
        self.size = size;
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(self.size));
    }

    fn draw_image(&mut self, image: &I, rect: Rect, alpha: f32) {
        self.commands.push(DrawCommand::Image {
            image: image.size(),
            rect,
            alpha,
        });
    }

    fn stroke_polyline(&mut self, points: &[StrokeElement], color: Color, width: f32) {
        self.commands.push(DrawCommand::Polyline {
            points: points.iter().map(SurfacePos::from).collect(),
            color,
            width,
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn stroke(color: Color, coords: &[(f32, f32)]) -> Stroke {
        Stroke::with_points(
            coords
                .iter()
                .map(|&(x, y)| StrokeElement::new(SurfacePos { x, y }, color, 10.))
                .collect(),
        )
        .unwrap()
    }

    fn frame(list: &mut DisplayList, overlay: Option<&Overlay<Size>>, strokes: &[Stroke]) {
        redraw(list, overlay, strokes, crate::OVERLAY_ALPHA);
    }

    #[test]
    fn overlay_goes_under_strokes_in_order() {
        let overlay = Overlay::new(Size::new(100., 100.), "cat");
        let strokes = [
            stroke(Color::RED, &[(0., 0.), (5., 5.), (9., 1.)]),
            stroke(Color::BLUE, &[(3., 3.), (4., 4.)]),
        ];
        let mut list = DisplayList::new(Size::new(600., 400.));
        frame(&mut list, Some(&overlay), &strokes);

        let commands = list.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0], DrawCommand::Clear(Size::new(600., 400.)));
        assert_eq!(
            commands[1],
            DrawCommand::Image {
                image: Size::new(100., 100.),
                rect: Rect::new(100., 0., 400., 400.),
                alpha: crate::OVERLAY_ALPHA,
            }
        );

        let colors = list.polylines().map(|(_, color, _)| color).collect::<Vec<_>>();
        assert_eq!(colors, [Color::RED, Color::BLUE]);
        let lens = list.polylines().map(|(points, _, _)| points.len()).collect::<Vec<_>>();
        assert_eq!(lens, [3, 2]);
    }

    #[test]
    fn redraw_is_idempotent() {
        let overlay = Overlay::new(Size::new(30., 70.), "elephant");
        let strokes = [stroke(Color::GREEN, &[(1., 1.), (2., 8.)])];
        let mut list = DisplayList::new(Size::new(320., 240.));

        frame(&mut list, Some(&overlay), &strokes);
        let first = list.clone();
        frame(&mut list, Some(&overlay), &strokes);
        assert_eq!(first, list);
    }

    #[test]
    fn redraw_forgets_live_segments() {
        let strokes = [stroke(Color::BLACK, &[(0., 0.), (1., 1.)])];
        let mut list = DisplayList::new(Size::new(10., 10.));
        frame(&mut list, None, &strokes);
        let clean = list.clone();

        let a = StrokeElement::new(SurfacePos { x: 2., y: 2. }, Color::RED, 4.);
        let b = StrokeElement::new(SurfacePos { x: 3., y: 3. }, Color::RED, 4.);
        paint_segment::<Size, _>(&mut list, a, b);
        assert_ne!(clean, list);

        frame(&mut list, None, &strokes);
        assert_eq!(clean, list);
    }

    #[test]
    fn overlay_is_refit_after_resize() {
        let overlay = Overlay::new(Size::new(200., 100.), "dog");
        let mut list = DisplayList::new(Size::new(600., 400.));
        frame(&mut list, Some(&overlay), &[]);
        assert_eq!(list.images().collect::<Vec<_>>(), [Rect::new(0., 50., 600., 300.)]);

        Surface::<Size>::resize(&mut list, Size::new(300., 300.));
        frame(&mut list, Some(&overlay), &[]);
        assert_eq!(list.images().collect::<Vec<_>>(), [Rect::new(0., 75., 300., 150.)]);
    }
}
