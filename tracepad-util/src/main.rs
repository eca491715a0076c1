use anyhow::Context;
use gumdrop::Options;
use rand::{rngs::StdRng, SeedableRng};
use std::path::{Path, PathBuf};
use tracepad::{config::Config, i18n, s, Response, Session, Size, Surface};

mod loader;
mod raster;
mod script;

use loader::FsLoader;
use raster::{Picture, Raster};
use script::Script;

#[derive(gumdrop::Options, Debug)]
pub struct Args {
    #[options(help = "Show this message")]
    help: bool,

    #[options(help = "Print the version", short = "V")]
    pub version: bool,

    #[options(help = "Config file location")]
    pub config: Option<PathBuf>,

    #[options(help = "Print the default config file and exit", no_short)]
    pub print_default_config: bool,

    #[options(help = "Surface width, if the script doesn't set one")]
    pub width: Option<f32>,

    #[options(help = "Surface height, if the script doesn't set one", short = "H")]
    pub height: Option<f32>,

    #[options(help = "Where to write the PNG", default = "tracepad.png")]
    pub output: PathBuf,

    #[options(help = "Directory holding the reference pictures")]
    pub assets: Option<PathBuf>,

    #[options(help = "Seed for picking reference pictures", no_short)]
    pub seed: Option<u64>,

    #[options(free, help = "Script to replay")]
    pub script: Option<PathBuf>,
}

fn notify(text: &str) {
    log::warn!("{text}");
    eprintln!("{}: {text}", s!(ErrorTitle));
}

/// Feeds one response back into the session until nothing is left to do.
fn settle(
    session: &mut Session<Picture>,
    raster: &mut Raster,
    loader: &FsLoader,
    mut response: Response,
) {
    loop {
        response = match response {
            Response::LoadReference(request) => {
                let result = futures::executor::block_on(
                    tracepad::ImageLoader::load(loader, request.path()),
                );
                session.finish_reference(raster, request, result)
            }

            Response::Notice(text) => {
                notify(&text);
                return;
            }

            Response::Nothing | Response::Painted | Response::Redrawn => return,
        };
    }
}

fn config_path(args: &Args) -> anyhow::Result<PathBuf> {
    if let Some(path) = &args.config {
        return Ok(path.clone());
    }

    if cfg!(feature = "tracepad-release") {
        Config::config_path(dirs::config_dir()).context(s!(CouldNotOpenConfigFile))
    } else {
        Ok(PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../config.ron"
        )))
    }
}

fn replay(args: &Args, config: &Config, script_path: &Path) -> anyhow::Result<()> {
    let script = Script::from_disk(script_path)?;

    let fallback = Size::new(
        args.width.unwrap_or(config.surface_max_width),
        args.height.unwrap_or(config.surface_max_height),
    );
    let mut raster = Raster::new(script.size(fallback), tracepad::Color::WHITE)?;

    let mut session = match args.seed {
        Some(seed) => Session::with_rng(config, StdRng::seed_from_u64(seed)),
        None => Session::new(config),
    };
    session.redraw(&mut raster);

    let assets = args.assets.clone().unwrap_or_else(|| {
        script_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    });
    let loader = FsLoader::new(assets);

    for step in script.steps.iter() {
        let logical = Surface::<Picture>::size(&raster);
        for event in step.events(logical) {
            let response = session.next(&mut raster, event);
            settle(&mut session, &mut raster, &loader, response);
        }
    }

    log::info!(
        "{} strokes, overlay {:?}",
        session.history().len(),
        session.overlay().map(|overlay| overlay.name())
    );

    raster
        .save(&args.output)
        .with_context(|| format!("{} {}", s!(CouldNotWriteImage), args.output.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse_args_default_or_exit();

    if args.version {
        println!(
            "tracepad util ({} {})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        );
        return Ok(());
    }

    if args.print_default_config {
        println!("{}", Config::new().to_ron_string());
        return Ok(());
    }

    let config = Config::from_disk(&config_path(&args)?);
    if let Some(lang) = &config.language {
        i18n::set_lang(lang);
    }

    match &args.script {
        Some(script) => replay(&args, &config, script),
        None => {
            eprintln!("{}", Args::usage());
            Ok(())
        }
    }
}
