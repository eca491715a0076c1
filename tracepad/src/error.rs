use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};

pub trait ErrorExt {
    fn display(self);
    fn problem(self, why: String) -> Self;
}

impl<T> ErrorExt for Result<T, Error> {
    fn display(self) {
        if let Err(err) = self {
            err.display();
        }
    }

    fn problem(mut self, why: String) -> Self {
        if let Some(err) = self.as_mut().err() {
            err.why.push(why);
        }

        self
    }
}

impl ErrorExt for Error {
    fn display(self) {
        log::error!("{}: {}", self.kind, self.message());
    }

    fn problem(mut self, why: String) -> Self {
        self.why.push(why);
        self
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    why: Vec<String>,
}

impl Error {
    pub fn because(kind: ErrorKind, reason: String) -> Self {
        Error {
            kind,
            why: vec![reason],
        }
    }

    pub fn new(kind: ErrorKind) -> Self {
        Error {
            kind,
            why: Vec::new(),
        }
    }

    pub fn image_load(path: impl Into<String>) -> Self {
        let path = path.into();
        Error::because(ErrorKind::ImageLoad { path: path.clone() }, path)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Reasons from outermost to innermost, for showing to a user.
    pub fn message(&self) -> String {
        self.why
            .iter()
            .rev()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.kind)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::Io(err) => Some(err),
            ErrorKind::Config(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ErrorKind {
    ImageLoad { path: String },
    Io(std::io::Error),
    Config(ron::error::SpannedError),
    Script(String),
    Tessellation(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let problem = format!("{err}");
        Error::new(ErrorKind::Io(err)).problem(problem)
    }
}

impl From<ron::error::SpannedError> for Error {
    fn from(err: ron::error::SpannedError) -> Self {
        let problem = format!("{err}");
        Error::new(ErrorKind::Config(err)).problem(problem)
    }
}

impl From<lyon::tessellation::TessellationError> for Error {
    fn from(err: lyon::tessellation::TessellationError) -> Self {
        let problem = format!("{err:?}");
        Error::new(ErrorKind::Tessellation(problem.clone())).problem(problem)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ErrorKind::ImageLoad { path } => write!(f, "Could not load image {path}"),
            ErrorKind::Io(err) => write!(f, "{err}"),
            ErrorKind::Config(err) => write!(f, "{err}"),
            ErrorKind::Script(why) => write!(f, "Bad script: {why}"),
            ErrorKind::Tessellation(why) => write!(f, "Could not tessellate stroke: {why}"),
        }
    }
}

#[test]
fn problems_read_outermost_first() {
    let err = Error::image_load("cat.png").problem(String::from("Could not load the picture."));
    assert!(matches!(err.kind(), ErrorKind::ImageLoad { path } if path == "cat.png"));
    assert_eq!(err.message(), "Could not load the picture. cat.png");

    let result: Result<(), Error> = Err(Error::new(ErrorKind::Script(String::from("eof"))));
    let result = result.problem(String::from("inner")).problem(String::from("outer"));
    assert_eq!(result.unwrap_err().message(), "outer inner");
}
