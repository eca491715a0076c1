use crate::{
    error::{Error, ErrorExt},
    graphics::{Color, Size},
    s,
};
use std::path::{Path, PathBuf};

/// A named picture that Show-Reference may pick.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Reference {
    pub name: String,
    pub path: String,
}

impl Reference {
    pub fn new(name: &str, path: &str) -> Self {
        Reference {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

macro_rules! config {
    ($($field:ident : $ty:ty $default:block),* $(,)?) => {
        paste::paste! {
            mod default {
                use super::*;
                $(pub fn $field() -> $ty $default)*
            }

            #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
            pub struct Config {
                $(
                    #[serde(default = "default::" $field)]
                    pub $field: $ty,
                )*

                #[serde(skip)]
                had_error_parsing: bool,
            }

            impl Config {
                pub fn new() -> Self {
                    Self {
                        $($field: default::$field(),)*
                        had_error_parsing: false,
                    }
                }
            }
        }
    };
}

config!(
    default_color: Color { Color::BLACK },
    palette: Vec<Color> {
        vec![
            Color::BLACK,
            Color::RED,
            Color::BLUE,
            Color::GREEN,
            Color::YELLOW,
            Color::ORANGE,
            Color::PURPLE,
            Color::BROWN,
        ]
    },
    brush_width: f32 { crate::DEFAULT_BRUSH },
    overlay_alpha: f32 { crate::OVERLAY_ALPHA },
    reference_images: Vec<Reference> {
        vec![
            Reference::new("dog", "dog.png"),
            Reference::new("cat", "cat.png"),
            Reference::new("elephant", "elephant.png"),
        ]
    },
    surface_width_fraction: f32 { 0.8 },
    surface_max_width: f32 { 600. },
    surface_height_fraction: f32 { 0.6 },
    surface_max_height: f32 { 400. },
    language: Option<String> { None },
);

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    fn with_error(self) -> Config {
        Config {
            had_error_parsing: true,
            ..self
        }
    }

    pub fn had_error(&self) -> bool {
        self.had_error_parsing
    }

    pub fn config_path(config_dir: Option<PathBuf>) -> Result<PathBuf, Error> {
        let mut path = config_dir.ok_or_else(|| {
            Error::from(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no config directory",
            ))
        })?;
        path.push("tracepad");

        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }

        path.push("config.ron");
        Ok(path)
    }

    pub fn from_ron(contents: &str) -> Result<Config, Error> {
        let config: Config = ron::from_str(contents)?;
        Ok(config.sanitized())
    }

    /// Never fails. A missing file gives the defaults; an unreadable or
    /// broken one gives the defaults and logs why.
    pub fn from_disk(path: &Path) -> Config {
        log::info!("load config from {}", path.display());
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Config::default();
            }
            Err(err) => {
                Error::from(err).problem(s!(CouldNotOpenConfigFile)).display();
                return Config::default().with_error();
            }
        };

        match Config::from_ron(&contents) {
            Ok(config) => config,
            Err(err) => {
                err.problem(s!(CouldNotOpenConfigFile)).display();
                Config::default().with_error()
            }
        }
    }

    pub fn to_ron_string(&self) -> String {
        let pretty = ron::ser::PrettyConfig::new()
            .new_line(String::from("\n"))
            .indentor(String::from("  "))
            .compact_arrays(true);

        match ron::ser::to_string_pretty(self, pretty) {
            Ok(contents) => {
                format!("// tracepad config. missing fields take their default.\n{contents}")
            }
            Err(err) => {
                log::error!("could not serialize config: {err}");
                String::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        log::info!("save config to {}", path.display());

        if self.had_error_parsing {
            // don't overwrite broken configs
            log::error!("had error");
            return Ok(());
        }

        std::fs::write(path, self.to_ron_string())?;
        Ok(())
    }

    /// Logical surface size for a viewport, before any resize.
    pub fn initial_surface_size(&self, viewport: Size) -> Size {
        Size {
            width: (viewport.width * self.surface_width_fraction)
                .min(self.surface_max_width)
                .floor(),
            height: (viewport.height * self.surface_height_fraction)
                .min(self.surface_max_height)
                .floor(),
        }
    }

    fn sanitized(mut self) -> Config {
        if self.brush_width.is_nan() || self.brush_width <= 0. {
            log::warn!("brush_width {} out of range", self.brush_width);
            self.brush_width = crate::DEFAULT_BRUSH;
        }

        self.brush_width = self.brush_width.clamp(crate::MIN_BRUSH, crate::MAX_BRUSH);
        if !(0.0..=1.0).contains(&self.overlay_alpha) {
            log::warn!("overlay_alpha {} out of range", self.overlay_alpha);
            self.overlay_alpha = self.overlay_alpha.clamp(0., 1.);
        }

        if self.palette.is_empty() {
            self.palette = default::palette();
        }

        self
    }
}
