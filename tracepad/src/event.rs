use crate::{coords::Sample, graphics::Color, graphics::Size};

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Event {
    PointerDown(Sample),
    PointerMove(Sample),
    PointerUp,
    PointerLeave,

    Touch(Touch),

    SelectColor(Color),
    Clear,
    Undo,
    ShowReference,

    /// The surface container changed size; carries the new logical size.
    Resize(Size),
}

#[derive(PartialEq, Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Only the first touch point is tracked. `sample` is `None` once the last
/// finger has lifted.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Touch {
    pub phase: TouchPhase,
    pub sample: Option<Sample>,
}

impl Touch {
    pub fn start(sample: Sample) -> Self {
        Touch {
            phase: TouchPhase::Start,
            sample: Some(sample),
        }
    }

    pub fn moved(sample: Sample) -> Self {
        Touch {
            phase: TouchPhase::Move,
            sample: Some(sample),
        }
    }

    pub fn end() -> Self {
        Touch {
            phase: TouchPhase::End,
            sample: None,
        }
    }

    pub fn cancel() -> Self {
        Touch {
            phase: TouchPhase::Cancel,
            sample: None,
        }
    }
}

impl Event {
    /// Whether the event is a user command rather than a stroke sample.
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            Event::SelectColor(_) | Event::Clear | Event::Undo | Event::ShowReference
        )
    }
}
