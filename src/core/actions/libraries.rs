// ─── Library Pass ───
// Fetch every library in order, collecting failures instead of stopping at
// the first one.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::context::{maven_local_repository, InstallContext};
use crate::core::downloader::GrabbedSet;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::progress::check_cancelled;
use crate::core::version::Library;

/// Fetch `libraries` into `libraries_dir`.
///
/// Search order for local copies: configured dirs, `extra_dirs`, then
/// `~/.m2/repository`. Libraries with no URL that fail are expected to be
/// produced by processors and are not reported.
pub async fn download_libraries(
    ctx: &InstallContext<'_>,
    libraries_dir: &Path,
    libraries: &[Library],
    extra_dirs: Vec<PathBuf>,
) -> InstallerResult<GrabbedSet> {
    ctx.progress.start("Downloading libraries");

    let mut search_dirs = ctx.settings.extra_library_dirs.clone();
    search_dirs.extend(extra_dirs);
    if let Some(m2) = maven_local_repository() {
        search_dirs.push(m2);
    }
    ctx.progress.info(&format!(
        "Found {} additional library directories",
        search_dirs.len()
    ));

    let mirror = ctx.mirror().await;
    if let Some(mirror) = mirror {
        ctx.progress.stage(&mirror.sponsor_message());
    }
    let fetcher = ctx.fetcher(mirror, &search_dirs);

    let mut grabbed = GrabbedSet::new();
    let mut failed = Vec::new();
    let steps = libraries.len() as f64;

    for (i, library) in libraries.iter().enumerate() {
        check_cancelled(ctx.cancel)?;
        ctx.progress.progress((i + 1) as f64 / steps);

        match fetcher.fetch(library, libraries_dir, ctx.optionals).await {
            Ok(outcome) => {
                if outcome.is_new() {
                    grabbed.push(library.name.clone());
                }
            }
            Err(e) => {
                warn!(library = %library.name, error = %e, "Library fetch failed");
                if !library.download().url().is_empty() {
                    failed.push(library.name.to_string());
                }
            }
        }
    }

    if !failed.is_empty() {
        ctx.progress.stage("These libraries failed to download. Try again.");
        return Err(ctx.fail(InstallerError::LibrariesFailed(failed)));
    }

    info!("Libraries ready, {} newly fetched", grabbed.len());
    Ok(grabbed)
}
