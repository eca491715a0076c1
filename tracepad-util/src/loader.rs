use crate::raster::Picture;
use std::path::PathBuf;
use tracepad::{Error, ErrorKind, ImageLoader};

/// Loads reference pictures from a directory with the `image` crate.
#[derive(Debug)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsLoader { root: root.into() }
    }
}

impl ImageLoader for FsLoader {
    type Image = Picture;

    async fn load(&self, path: &str) -> Result<Picture, Error> {
        let full = self.root.join(path);
        log::debug!("load {}", full.display());

        let failed = |why: String| {
            Error::because(
                ErrorKind::ImageLoad {
                    path: path.to_string(),
                },
                why,
            )
        };

        let image = image::open(&full)
            .map_err(|err| failed(format!("{}: {err}", full.display())))?;
        Picture::from_rgba(&image.to_rgba8())
            .ok_or_else(|| failed(format!("{} has no pixels", full.display())))
    }
}
