mod command;
mod error;
mod preferences;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use zmand_render::export_png;

use command::{parse_script, parse_size};
use error::AppError;
use preferences::Preferences;
use session::Session;

/// Headless Mandelbrot explorer.
///
/// Replays a script of viewer commands against the stored (or default)
/// view, rendering after each one, then writes the final frame as a PNG.
///
/// Example:
///   zmand --script "q q d d x t" --shot 1920x1080 --out deep.png
#[derive(Parser, Debug)]
#[command(name = "zmand", version, about = "Headless Mandelbrot explorer")]
struct Cli {
    /// Frame width in pixels (defaults to the stored preference)
    #[arg(long)]
    width: Option<u32>,

    /// Frame height in pixels (defaults to the stored preference)
    #[arg(long)]
    height: Option<u32>,

    /// Color scheme index, 0 to 6
    #[arg(long)]
    scheme: Option<usize>,

    /// Number of render workers
    #[arg(long)]
    workers: Option<usize>,

    /// Start with the blur filter enabled
    #[arg(long)]
    blur: bool,

    /// Whitespace-separated commands, e.g. "q w drag:10,10,90,70 x"
    #[arg(long, default_value = "")]
    script: String,

    /// Render the final view at WxH instead of the frame size
    #[arg(long, value_parser = parse_size)]
    shot: Option<(u32, u32)>,

    /// Output PNG path
    #[arg(long, default_value = "zmand.png")]
    out: PathBuf,

    /// Ignore the stored preferences and saved view
    #[arg(long)]
    fresh: bool,

    /// Write the final state back to the preferences file
    #[arg(long)]
    save_prefs: bool,
}

impl Cli {
    fn preferences(&self) -> Preferences {
        let mut prefs = if self.fresh {
            Preferences::default()
        } else {
            Preferences::load()
        };
        if let Some(width) = self.width {
            prefs.width = width;
        }
        if let Some(height) = self.height {
            prefs.height = height;
        }
        if let Some(scheme) = self.scheme {
            prefs.scheme = scheme;
        }
        if let Some(workers) = self.workers {
            prefs.workers = workers;
        }
        prefs.blur |= self.blur;
        prefs
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut prefs = cli.preferences();
    let commands = parse_script(&cli.script)?;
    let mut session = Session::new(&prefs)?;

    let mut result = session.render()?;
    session.log_status(&result);
    for command in commands {
        match session.apply(command) {
            Ok(()) => {}
            // A move the view can't take (e.g. zooming out past the limit)
            // is skipped, like an ignored key press.
            Err(AppError::Core(e)) => {
                warn!(?command, "Skipping command: {e}");
                continue;
            }
            Err(e) => return Err(e),
        }
        result = session.render()?;
        session.log_status(&result);
    }

    match cli.shot {
        Some((width, height)) => {
            let (shot, shot_result) = session.screenshot(width, height, session.blur())?;
            let meta = session.export_metadata(&shot_result, session.blur());
            export_png(&shot, &cli.out, &meta)?;
        }
        None => {
            let meta = session.export_metadata(&result, session.blur());
            export_png(session.frame(), &cli.out, &meta)?;
        }
    }
    info!("Saved {}", cli.out.display());

    if cli.save_prefs {
        session.store(&mut prefs);
        prefs.save();
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_preferences() {
        let cli = Cli::parse_from([
            "zmand", "--fresh", "--width", "64", "--scheme", "3", "--blur", "--shot", "8x6",
        ]);
        assert_eq!(cli.shot, Some((8, 6)));
        let prefs = cli.preferences();
        assert_eq!(prefs.width, 64);
        assert_eq!(prefs.height, Preferences::default().height);
        assert_eq!(prefs.scheme, 3);
        assert!(prefs.blur);
    }

    #[test]
    fn rejects_malformed_shot_size() {
        assert!(Cli::try_parse_from(["zmand", "--shot", "8by6"]).is_err());
    }

    #[test]
    fn run_writes_png() {
        let out = std::env::temp_dir().join(format!("zmand_cli_{}.png", std::process::id()));
        let cli = Cli::parse_from([
            "zmand",
            "--fresh",
            "--width",
            "24",
            "--height",
            "16",
            "--script",
            "q x drag:2,2,12,10",
            "--out",
            out.to_str().unwrap(),
        ]);
        run(cli).unwrap();
        assert!(out.exists());
        std::fs::remove_file(&out).ok();
    }

    #[test]
    fn run_skips_zoom_out_past_the_limit() {
        let out = std::env::temp_dir().join(format!("zmand_cli_far_{}.png", std::process::id()));
        let script = vec!["z"; 300].join(" ");
        let cli = Cli::parse_from([
            "zmand",
            "--fresh",
            "--width",
            "12",
            "--height",
            "8",
            "--script",
            &script,
            "--out",
            out.to_str().unwrap(),
        ]);
        run(cli).unwrap();
        assert!(out.exists());
        std::fs::remove_file(&out).ok();
    }

    #[test]
    fn run_reports_bad_script() {
        let cli = Cli::parse_from(["zmand", "--fresh", "--script", "q nope"]);
        assert!(matches!(run(cli), Err(AppError::UnknownCommand(_))));
    }
}
