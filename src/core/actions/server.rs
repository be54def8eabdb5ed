use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use super::action::InstallAction;
use super::context::{default_minecraft_dir, InstallContext};
use super::libraries::download_libraries;
use crate::core::downloader::GrabbedSet;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::processors::{PostProcessors, ProcessorPaths};
use crate::core::profile::{InstallProfile, Side};
use crate::core::progress::check_cancelled;
use crate::core::tokens::{self, absolute, TokenTable};
use crate::core::version::{Library, VersionDescriptor};

/// Sets up a dedicated server directory.
pub struct ServerInstall;

#[async_trait]
impl InstallAction for ServerInstall {
    async fn run(&self, ctx: &InstallContext<'_>, target: &Path) -> InstallerResult<GrabbedSet> {
        let profile = ctx.profile;
        if target.exists() && !target.is_dir() {
            return Err(ctx.fail(InstallerError::InvalidTarget {
                path: target.to_path_buf(),
                reason: "There is a file at this location, the server cannot be installed here!"
                    .into(),
            }));
        }

        let libraries_dir = target.join("libraries");
        std::fs::create_dir_all(&libraries_dir)
            .map_err(|e| InstallerError::io(&libraries_dir, e))?;

        check_cancelled(ctx.cancel)?;
        if let Some(contained) = &profile.path {
            ctx.progress.stage("Extracting main jar:");
            let dest = target.join(contained.filename());
            let message = format!("  Failed to extract main jar: {}", contained.filename());
            match ctx.resources.extract_artifact(contained, &dest) {
                Ok(true) => ctx.progress.stage("  Extracted successfully"),
                Ok(false) => {
                    return Err(ctx.fail_with(
                        &message,
                        InstallerError::MissingResource(contained.to_string()),
                    ))
                }
                Err(e) => return Err(ctx.fail_with(&message, e)),
            }
        }

        check_cancelled(ctx.cancel)?;
        ctx.progress.stage("Considering minecraft server jar");
        let mut table = TokenTable::new();
        table.insert(tokens::ROOT, absolute(target));
        table.insert(tokens::MINECRAFT_VERSION, profile.minecraft.as_str());
        table.insert(tokens::LIBRARY_DIR, absolute(&libraries_dir));
        let server_jar = PathBuf::from(table.substitute(profile.server_jar_path())?);

        if !server_jar.exists() {
            if let Some(parent) = server_jar.parent() {
                std::fs::create_dir_all(parent).map_err(|e| InstallerError::io(parent, e))?;
            }

            let vanilla_json = target.join(format!("{}.json", profile.minecraft));
            let vanilla = VersionDescriptor::load_cached(
                ctx.downloader,
                &ctx.settings.version_manifest_url,
                &profile.minecraft,
                &vanilla_json,
            )
            .await
            .map_err(|e| {
                ctx.fail_with(
                    "Failed to download version manifest, can not find server jar URL.",
                    e,
                )
            })?;

            let Some(server) = vanilla.download("server") else {
                return Err(ctx.fail(InstallerError::Other(format!(
                    "Failed to download minecraft server, info missing from manifest: {}",
                    vanilla_json.display()
                ))));
            };
            if let Err(e) = std::fs::remove_file(&vanilla_json) {
                debug!("Could not remove {:?}: {}", vanilla_json, e);
            }

            if let Err(e) = ctx.fetcher(None, &[]).download_file(server, &server_jar).await {
                if let Err(e) = std::fs::remove_file(&server_jar) {
                    debug!("Could not remove {:?}: {}", server_jar, e);
                }
                return Err(ctx.fail_with(
                    "Downloading minecraft server failed, invalid checksum.\nTry again, or manually place server jar to skip download.",
                    e,
                ));
            }
        }

        check_cancelled(ctx.cancel)?;
        let extra_dirs: Vec<PathBuf> = default_minecraft_dir()
            .map(|d| d.join("libraries"))
            .filter(|d| d.exists())
            .into_iter()
            .collect();

        let version = VersionDescriptor::from_resources(ctx.resources, &profile.json)?;
        let processors = PostProcessors::new(profile, Side::Server);
        let libraries: Vec<Library> = version
            .libraries
            .iter()
            .chain(processors.libraries())
            .cloned()
            .collect();
        let grabbed = download_libraries(ctx, &libraries_dir, &libraries, extra_dirs).await?;

        check_cancelled(ctx.cancel)?;
        let paths = ProcessorPaths {
            libraries_dir,
            minecraft_jar: server_jar,
            root: target.to_path_buf(),
            installer: ctx.installer_path.to_path_buf(),
        };
        processors.process(&ctx.processor_env(), &paths).await?;

        info!("Server install of {} complete", profile.version);
        Ok(grabbed)
    }

    fn is_path_valid(&self, target: &Path) -> bool {
        target.is_dir()
            && std::fs::read_dir(target)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false)
    }

    fn file_error(&self, target: &Path) -> String {
        if !target.exists() {
            "The specified directory does not exist, it will be created".to_string()
        } else if !target.is_dir() {
            "The specified path needs to be a directory".to_string()
        } else {
            "There are already files at the target directory".to_string()
        }
    }

    fn success_message(&self, profile: &InstallProfile, grabbed: &GrabbedSet) -> String {
        if grabbed.is_empty() {
            format!(
                "Successfully downloaded minecraft server and installed {}",
                profile.version
            )
        } else {
            format!(
                "Successfully downloaded minecraft server, downloaded {} libraries and installed {}",
                grabbed.len(),
                profile.version
            )
        }
    }
}
