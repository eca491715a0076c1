use crate::stroke::{Stroke, StrokeElement};

/// Committed strokes in paint order, plus the stroke currently being drawn.
///
/// Every operation is total. Out-of-order input (extend before begin, undo on
/// an empty history) is ignored rather than reported.
#[derive(Debug, Default)]
pub struct History {
    strokes: Vec<Stroke>,
    current: Option<Stroke>,
}

impl History {
    pub fn new() -> Self {
        History {
            strokes: Vec::new(),
            current: None,
        }
    }

    /// Start a new stroke, dropping any stroke already in progress.
    pub fn begin_stroke(&mut self, point: StrokeElement) {
        if self.current.is_some() {
            log::debug!("begin replaces unfinished stroke");
        }
        self.current = Some(Stroke::new(point));
    }

    /// Returns the point that precedes `point`, so the caller can paint the new
    /// segment. `None` if no stroke is in progress.
    pub fn extend_stroke(&mut self, point: StrokeElement) -> Option<StrokeElement> {
        let current = self.current.as_mut()?;
        let prev = *current.last();
        current.add_point(point);
        Some(prev)
    }

    /// Returns true if a stroke was added to the history.
    pub fn commit_stroke(&mut self) -> bool {
        match self.current.take() {
            Some(stroke) if stroke.is_committable() => {
                log::debug!("commit stroke of {} points", stroke.len());
                self.strokes.push(stroke);
                true
            }

            Some(stroke) => {
                log::debug!("discard stroke of {} points", stroke.len());
                false
            }

            None => false,
        }
    }

    /// Pops the most recent stroke.
    pub fn undo(&mut self) -> Option<Stroke> {
        let undone = self.strokes.pop();
        if undone.is_none() {
            log::debug!("nothing to undo");
        }
        undone
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    #[must_use]
    pub fn last(&self) -> Option<&Stroke> {
        self.strokes.last()
    }

    pub fn in_progress(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}
