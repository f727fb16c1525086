//! Platform adapter layer
//!
//! One hosting platform is one implementation of [`ModPlatform`]. Each
//! adapter brings its own file-record type and maps the platform's native
//! metadata onto the accessor contract: identity key, stability flag, game
//! versions, publish date, changelog, and a [`ResolvableVersion`] that is
//! either an authoritative version string or a deferred archive download.

pub mod curse;
pub mod error;
pub mod modrinth;
pub mod traits;
pub mod types;

pub use curse::CursePlatform;
pub use error::PlatformError;
pub use modrinth::ModrinthPlatform;
pub use traits::ModPlatform;
pub use types::{FileKey, ModLoader, ProjectData, ResolvableVersion};
