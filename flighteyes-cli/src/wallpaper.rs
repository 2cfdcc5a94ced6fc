//! Desktop background setter.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

#[derive(Debug)]
pub enum WallpaperError {
    /// The image path could not be resolved.
    Path { path: PathBuf, source: io::Error },
    /// The platform command could not be started.
    Spawn { program: String, source: io::Error },
    /// The platform command ran but reported failure.
    CommandFailed { program: String, status: String },
    /// No known way to set the background on this platform.
    Unsupported(String),
}

impl fmt::Display for WallpaperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WallpaperError::Path { path, source } => {
                write!(f, "cannot resolve {}: {}", path.display(), source)
            }
            WallpaperError::Spawn { program, source } => {
                write!(f, "failed to run {}: {}", program, source)
            }
            WallpaperError::CommandFailed { program, status } => {
                write!(f, "{} exited with {}", program, status)
            }
            WallpaperError::Unsupported(os) => {
                write!(f, "setting the desktop background is not supported on {}", os)
            }
        }
    }
}

impl std::error::Error for WallpaperError {}

/// Sets the desktop background to an image file.
pub trait WallpaperSetter {
    fn apply(&self, path: &Path) -> Result<(), WallpaperError>;
}

/// Desktop environments with a known background command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Gnome,
    Unsupported(String),
}

impl Platform {
    /// Detects the platform from the OS and `XDG_CURRENT_DESKTOP`.
    pub fn current() -> Self {
        let desktop = std::env::var("XDG_CURRENT_DESKTOP").ok();
        Self::detect(std::env::consts::OS, desktop.as_deref())
    }

    /// `desktop` is a colon-separated list such as `ubuntu:GNOME`.
    pub fn detect(os: &str, desktop: Option<&str>) -> Self {
        if os == "macos" {
            return Platform::MacOs;
        }

        let is_gnome = desktop
            .map(|value| {
                value
                    .split(':')
                    .any(|name| name.trim().to_ascii_lowercase().contains("gnome"))
            })
            .unwrap_or(false);

        match desktop {
            _ if is_gnome => Platform::Gnome,
            Some(name) if !name.trim().is_empty() => {
                Platform::Unsupported(format!("{} ({})", os, name.trim()))
            }
            _ => Platform::Unsupported(os.to_string()),
        }
    }
}

/// One external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallpaperCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl WallpaperCommand {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn run(&self) -> Result<(), WallpaperError> {
        debug!(program = %self.program, args = ?self.args, "Running wallpaper command");
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|source| WallpaperError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(WallpaperError::CommandFailed {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

/// Commands that set `image` (an absolute path) as the background.
pub fn commands_for(
    platform: &Platform,
    image: &Path,
) -> Result<Vec<WallpaperCommand>, WallpaperError> {
    let image = image.to_string_lossy();
    match platform {
        Platform::MacOs => {
            let script = format!(
                "tell application \"Finder\" to set desktop picture to POSIX file \"{}\"",
                image
            );
            Ok(vec![WallpaperCommand::new("osascript", &["-e", script.as_str()])])
        }
        Platform::Gnome => {
            let uri = format!("file://{}", image);
            Ok(["picture-uri", "picture-uri-dark"]
                .into_iter()
                .map(|key| {
                    WallpaperCommand::new(
                        "gsettings",
                        &["set", "org.gnome.desktop.background", key, uri.as_str()],
                    )
                })
                .collect())
        }
        Platform::Unsupported(os) => Err(WallpaperError::Unsupported(os.clone())),
    }
}

/// Sets the background with the current platform's command line tools.
#[derive(Debug, Clone)]
pub struct SystemWallpaper {
    platform: Platform,
}

impl Default for SystemWallpaper {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

impl SystemWallpaper {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl WallpaperSetter for SystemWallpaper {
    fn apply(&self, path: &Path) -> Result<(), WallpaperError> {
        let absolute = path.canonicalize().map_err(|source| WallpaperError::Path {
            path: path.to_path_buf(),
            source,
        })?;

        for command in commands_for(&self.platform, &absolute)? {
            command.run()?;
        }

        info!(path = %absolute.display(), "Desktop background set");
        Ok(())
    }
}
