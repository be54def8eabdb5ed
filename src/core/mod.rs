// ─── ForgeWrapper Core ───
// Headless installer for modded Minecraft runtimes.
//
// Architecture:
//   core/
//     maven/      - Artifact coordinates and repository layout
//     tokens      - `{KEY}` substitution and processor data values
//     checksum    - MD5 / SHA-1 / SHA-256 helpers
//     resources   - Files bundled in the installer archive
//     profile     - install_profile.json model
//     version/    - Mojang manifest + version JSON, cached
//     downloader/ - Library fetching, mirrors, bounded redirects
//     launch/     - Classpath, main class and processor launching
//     processors/ - Post-install processor pipeline with output caching
//     actions/    - Client, server and extract installs
//     java/       - Java executable discovery

pub mod actions;
pub mod checksum;
pub mod downloader;
pub mod error;
pub mod http;
pub mod installer;
pub mod java;
pub mod launch;
pub mod maven;
pub mod processors;
pub mod profile;
pub mod progress;
pub mod resources;
pub mod settings;
pub mod tokens;
pub mod version;
