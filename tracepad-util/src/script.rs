use serde::Deserialize;
use std::path::Path;
use tracepad::{
    coords::Sample,
    event::{Event, Touch},
    s, Color, Error, ErrorExt, ErrorKind, Size,
};

/// One line of a replay script, in surface coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum Step {
    Color(Color),
    Down(f32, f32),
    Move(f32, f32),
    Up,
    Leave,
    /// Down, moves and up in one go.
    Stroke(Vec<(f32, f32)>),
    /// Same as `Stroke` but through touch events.
    Finger(Vec<(f32, f32)>),
    Undo,
    Clear,
    Reference,
    Resize(f32, f32),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    pub steps: Vec<Step>,
}

impl Step {
    /// Events for this step on a surface whose logical size is `logical`,
    /// drawn unscaled at the viewport origin.
    pub fn events(&self, logical: Size) -> Vec<Event> {
        let at = |x: f32, y: f32| Sample::unscaled(x, y, logical);

        match self {
            Step::Color(color) => vec![Event::SelectColor(*color)],
            Step::Down(x, y) => vec![Event::PointerDown(at(*x, *y))],
            Step::Move(x, y) => vec![Event::PointerMove(at(*x, *y))],
            Step::Up => vec![Event::PointerUp],
            Step::Leave => vec![Event::PointerLeave],

            Step::Stroke(points) => {
                let mut events = points
                    .iter()
                    .enumerate()
                    .map(|(i, &(x, y))| {
                        if i == 0 {
                            Event::PointerDown(at(x, y))
                        } else {
                            Event::PointerMove(at(x, y))
                        }
                    })
                    .collect::<Vec<_>>();
                events.push(Event::PointerUp);
                events
            }

            Step::Finger(points) => {
                let mut events = points
                    .iter()
                    .enumerate()
                    .map(|(i, &(x, y))| {
                        if i == 0 {
                            Event::Touch(Touch::start(at(x, y)))
                        } else {
                            Event::Touch(Touch::moved(at(x, y)))
                        }
                    })
                    .collect::<Vec<_>>();
                events.push(Event::Touch(Touch::end()));
                events
            }

            Step::Undo => vec![Event::Undo],
            Step::Clear => vec![Event::Clear],
            Step::Reference => vec![Event::ShowReference],
            Step::Resize(w, h) => vec![Event::Resize(Size::new(*w, *h))],
        }
    }
}

impl Script {
    pub fn from_ron(contents: &str) -> Result<Script, Error> {
        ron::from_str(contents).map_err(|err| {
            let why = format!("{err}");
            Error::because(ErrorKind::Script(why.clone()), why)
        })
    }

    pub fn from_disk(path: &Path) -> Result<Script, Error> {
        log::info!("read script {}", path.display());
        let contents = std::fs::read_to_string(path)
            .map_err(Error::from)
            .problem(s!(CouldNotReadScript))?;
        Script::from_ron(&contents).problem(s!(CouldNotReadScript))
    }

    /// Script dimensions win over the fallback, which is usually the
    /// configured maximum.
    pub fn size(&self, fallback: Size) -> Size {
        Size::new(
            self.width.unwrap_or(fallback.width),
            self.height.unwrap_or(fallback.height),
        )
    }
}
