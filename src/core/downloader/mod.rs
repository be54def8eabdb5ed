pub mod client;
pub mod library;
pub mod mirror;

pub use client::Downloader;
pub use library::{FetchOutcome, GrabbedSet, LibraryFetcher};
pub use mirror::{Mirror, MirrorSelector};
