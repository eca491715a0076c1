use crate::graphics::{Color, SurfacePos};

/// One captured input sample. Color and width are fixed at capture time so
/// later palette changes never repaint old strokes.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeElement {
    pub x: f32,
    pub y: f32,
    pub color: Color,
    pub width: f32,
}

impl StrokeElement {
    pub fn new(pos: SurfacePos, color: Color, width: f32) -> Self {
        StrokeElement {
            x: pos.x,
            y: pos.y,
            color,
            width,
        }
    }

    pub fn pos(&self) -> SurfacePos {
        SurfacePos {
            x: self.x,
            y: self.y,
        }
    }
}

impl From<StrokeElement> for SurfacePos {
    fn from(elt: StrokeElement) -> SurfacePos {
        elt.pos()
    }
}

impl From<&StrokeElement> for SurfacePos {
    fn from(elt: &StrokeElement) -> SurfacePos {
        elt.pos()
    }
}

impl std::fmt::Display for StrokeElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.02},{:.02} {} {:.02}", self.x, self.y, self.color, self.width)
    }
}

/// A continuous line from input-down to input-up. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<StrokeElement>,
}

impl Stroke {
    /// Fewest points that produce a visible segment.
    pub const MIN_POINTS: usize = 2;

    pub fn new(first: StrokeElement) -> Self {
        Stroke {
            points: vec![first],
        }
    }

    /// `None` if `points` is empty.
    pub fn with_points(points: Vec<StrokeElement>) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Stroke { points })
        }
    }

    pub fn points(&self) -> &[StrokeElement] {
        &self.points
    }

    pub fn first(&self) -> &StrokeElement {
        &self.points[0]
    }

    pub fn last(&self) -> &StrokeElement {
        &self.points[self.points.len() - 1]
    }

    /// The whole stroke paints with the color of its first sample.
    pub fn color(&self) -> Color {
        self.first().color
    }

    pub fn width(&self) -> f32 {
        self.first().width
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn add_point(&mut self, point: StrokeElement) {
        self.points.push(point);
    }

    pub fn is_committable(&self) -> bool {
        self.points.len() >= Self::MIN_POINTS
    }
}

#[test]
fn stroke_uses_first_sample_style() {
    let mut stroke = Stroke::new(StrokeElement::new(
        SurfacePos { x: 1., y: 2. },
        Color::RED,
        10.,
    ));
    assert!(!stroke.is_committable());

    stroke.add_point(StrokeElement::new(
        SurfacePos { x: 3., y: 4. },
        Color::BLUE,
        4.,
    ));

    assert!(stroke.is_committable());
    assert_eq!(stroke.color(), Color::RED);
    assert_eq!(stroke.width(), 10.);
    assert_eq!(stroke.last().pos(), SurfacePos { x: 3., y: 4. });
    assert!(Stroke::with_points(Vec::new()).is_none());
}
