pub mod geometry;
pub mod io;
pub mod traits;
pub mod volume;

pub use self::geometry::ImageGeometry;
pub use self::traits::{ProfileSample, ProfileSampler};
pub use self::volume::VolumeImage;
