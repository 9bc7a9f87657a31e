#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod filters;
pub mod geometry;
pub mod log;
pub mod mounts;
pub mod observer;
pub mod render;
pub mod store;
pub mod theme;
pub mod transition;
pub mod uid;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, FrameConfig, NeonConfig, load_config, parse_config};
pub use geometry::{Geometry, MeasuredSize, Orientation, resolve_geometry};
pub use observer::{ContainerId, SizeObserver, Subscription};
pub use render::{render_light, render_svg, settled_frame};
pub use store::{FileStorage, MemoryStorage, Preference, PreferenceStore, StorageBackend, StoreError};
pub use transition::{LightAnimator, LightFrame};
pub use uid::{Uid, UidGenerator};
