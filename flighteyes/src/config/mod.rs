//! User configuration.
//!
//! Settings live in an INI file at `<config dir>/flighteyes/config.ini`:
//!
//! ```ini
//! [provider]
//! url_template = http://ecn.t3.tiles.virtualearth.net/tiles/a{quadkey}.jpeg?g=195&mkt=en-US&key={key}
//! api_key =
//! timeout_secs = 30
//!
//! [cache]
//! enabled = true
//! directory =
//!
//! [output]
//! path = background.jpg
//! set_wallpaper = true
//!
//! [mosaic]
//! parallel_workers = 0
//!
//! [logging]
//! directory =
//! ```

mod file;

pub use file::{
    default_config_path, fetch_mode_for, CacheSettings, ConfigError, ConfigFile, LoggingSettings,
    MosaicSettings, OutputSettings, ProviderSettings,
};
