use crate::{error::Error, stroke::StrokeElement};
use lyon::{
    geom::point as point2d,
    lyon_tessellation::{
        BuffersBuilder, LineCap, LineJoin, StrokeOptions, StrokeTessellator, StrokeVertex,
        VertexBuffers,
    },
    math::Point,
    path::Path,
};

/// u32 indices: a long stroke with round joins outgrows u16.
pub type Mesh = VertexBuffers<Point, u32>;

/// Round caps and joins, matching what a 2D canvas does with
/// `lineCap = lineJoin = "round"`.
pub fn stroke_options(width: f32) -> StrokeOptions {
    StrokeOptions::default()
        .with_line_cap(LineCap::Round)
        .with_line_join(LineJoin::Round)
        .with_line_width(width)
        .with_tolerance(0.05)
}

/// Triangulates the outline of a polyline drawn with the given width.
pub fn tessellate_polyline(
    tessellator: &mut StrokeTessellator,
    points: &[StrokeElement],
    width: f32,
) -> Result<Mesh, Error> {
    let mut mesh = Mesh::new();
    let Some(first) = points.first() else {
        return Ok(mesh);
    };

    let mut path = Path::builder();
    path.begin(point2d(first.x, first.y));
    points.iter().skip(1).for_each(|point| {
        path.line_to(point2d(point.x, point.y));
    });
    path.end(false);
    let path = path.build();

    let mut builder = BuffersBuilder::new(&mut mesh, |vertex: StrokeVertex| vertex.position());
    tessellator.tessellate_path(&path, &stroke_options(width), &mut builder)?;

    Ok(mesh)
}
