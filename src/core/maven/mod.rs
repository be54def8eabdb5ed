mod artifact;

pub use artifact::Artifact;

/// Mojang's library host. Mirrors never stand in for it.
pub const MOJANG_LIBRARIES: &str = "https://libraries.minecraft.net/";
