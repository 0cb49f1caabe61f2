use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use moon_raccoon_core::{
    document, Element, Environment, LandingPage, Page, RecordingSurface, RedirectPage,
    SimulatedEnvironment, SiteConfig, SiteError, StlModelSource, ViewportSize,
};
use tracing_subscriber::EnvFilter;

fn main() -> moon_raccoon_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SiteConfig::from_path(path)?,
        None => SiteConfig::default(),
    };

    match cli.command {
        Commands::Redirect { click_after } => run_redirect(&config, click_after),
        Commands::Landing {
            assets,
            scroll,
            resize,
            frames,
        } => run_landing(config, &assets, &scroll, resize, frames),
        Commands::Html { page } => print_html(config, page),
    }
}

fn run_redirect(config: &SiteConfig, click_after: Option<u32>) -> moon_raccoon_core::Result<()> {
    tracing::info!(url = %config.redirect.target_url, "mounting redirect page");

    let mut env = SimulatedEnvironment::default();
    let mut page = RedirectPage::new(config);
    page.mount(&mut env);
    println!("{}", one_line(&page.view()));

    let mut elapsed = 0;
    while !page.countdown().state().has_redirected {
        if click_after == Some(elapsed) {
            page.click_link(&mut env);
        }
        env.run(&mut page, config.redirect.tick_period_ms());
        elapsed += 1;
        println!("{}", page.countdown().state().status_text());
    }

    for navigation in env.navigations() {
        println!("{:?} -> {} at {} ms", navigation.target, navigation.url, navigation.at_ms);
    }
    println!("location: {}", env.location());
    page.unmount(&mut env);
    Ok(())
}

fn run_landing(
    config: SiteConfig,
    assets: &PathBuf,
    scroll: &[f32],
    resize: Option<Viewport>,
    frames: usize,
) -> moon_raccoon_core::Result<()> {
    tracing::info!(?assets, "mounting landing page");

    let mut env = SimulatedEnvironment::default();
    let mut page = LandingPage::new(
        config,
        RecordingSurface::new(env.viewport_size()),
        &env,
    );
    page.mount(&mut env);

    let mut source = StlModelSource::new(assets);
    let events = env.resolve_loads(&mut source);
    env.deliver(&mut page, events);

    if let Some(viewport) = resize {
        let events = env.resize(viewport.0.width, viewport.0.height);
        env.deliver(&mut page, events);
    }

    env.run_frames(&mut page, frames);
    for y in scroll {
        let events = env.scroll_to(*y);
        env.deliver(&mut page, events);
        env.run_frames(&mut page, 1);
    }

    let controller = page.scene();
    let scene = controller.scene();
    println!(
        "frames rendered: {} at {}x{}",
        controller.frames_rendered(),
        controller.composer().size().width,
        controller.composer().size().height
    );
    for (name, container) in [("logo", &scene.logo), ("moon", &scene.moon)] {
        if container.is_loaded() {
            let position = container.position();
            println!(
                "{name}: position ({:.3}, {:.3}, {:.3}) rotation y {:.3}",
                position.x,
                position.y,
                position.z,
                container.rotation().y
            );
        } else {
            println!("{name}: not loaded");
        }
    }
    for (index, layer) in scene.starfield.layers.iter().enumerate() {
        println!(
            "stars[{index}]: {} points, offset {:.4}, opacity {:.3}",
            layer.positions.len(),
            layer.offset_y,
            layer.opacity
        );
    }

    page.unmount(&mut env);
    Ok(())
}

fn print_html(config: SiteConfig, page: PageKind) -> moon_raccoon_core::Result<()> {
    let title = config.content.artist.clone();
    let html = match page {
        PageKind::Redirect => document(&title, RedirectPage::new(&config).view()),
        PageKind::Landing => {
            let env = SimulatedEnvironment::default();
            let surface = RecordingSurface::new(env.viewport_size());
            document(&title, LandingPage::new(config, surface, &env).view())
        }
    };
    println!("{html}");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

fn one_line(element: &Element) -> String {
    element
        .text_content()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy)]
struct Viewport(ViewportSize);

impl std::str::FromStr for Viewport {
    type Err = SiteError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (width, height) = raw
            .split_once('x')
            .ok_or_else(|| SiteError::msg(format!("expected WIDTHxHEIGHT, got `{raw}`")))?;
        let width = width
            .parse()
            .map_err(|err| SiteError::msg(format!("width: {err}")))?;
        let height = height
            .parse()
            .map_err(|err| SiteError::msg(format!("height: {err}")))?;
        Ok(Self(ViewportSize::new(width, height)))
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PageKind {
    Redirect,
    Landing,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Moon Raccoon web pages", long_about = None)]
struct Cli {
    /// JSON configuration file; built-in defaults otherwise.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the redirect countdown in virtual time.
    Redirect {
        /// Click the manual link after this many ticks.
        #[arg(long)]
        click_after: Option<u32>,
    },
    /// Mount the landing scene and replay scroll positions against it.
    Landing {
        /// Directory the model paths are resolved against.
        #[arg(short, long, default_value = "public")]
        assets: PathBuf,
        /// Scroll positions to visit, in order.
        #[arg(short, long, value_delimiter = ',')]
        scroll: Vec<f32>,
        /// Resize the viewport before rendering, e.g. `1920x1080`.
        #[arg(short, long)]
        resize: Option<Viewport>,
        /// Frames to render before scrolling.
        #[arg(short, long, default_value_t = 60)]
        frames: usize,
    },
    /// Print a page as an HTML document.
    Html {
        #[arg(value_enum)]
        page: PageKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_finishes_with_zero_tick() {
        let config = SiteConfig::from_json(r#"{ "redirect": { "tick_ms": 0 } }"#).unwrap();
        run_redirect(&config, Some(2)).unwrap();
    }

    #[test]
    fn parses_viewport() {
        let viewport: Viewport = "1920x1080".parse().unwrap();
        assert_eq!(viewport.0, ViewportSize::new(1920, 1080));
    }

    #[test]
    fn rejects_malformed_viewport() {
        let err = "1920by1080".parse::<Viewport>().unwrap_err();
        assert!(matches!(err, SiteError::Message(_)));
        assert!(err.to_string().contains("WIDTHxHEIGHT"));

        let err = "wide x1080".parse::<Viewport>().unwrap_err();
        assert!(err.to_string().starts_with("width:"));
    }
}
