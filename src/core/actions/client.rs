use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use super::action::InstallAction;
use super::context::InstallContext;
use super::libraries::download_libraries;
use crate::core::downloader::GrabbedSet;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::processors::{PostProcessors, ProcessorPaths};
use crate::core::profile::{InstallProfile, Side};
use crate::core::progress::check_cancelled;
use crate::core::version::{Library, VersionDescriptor};

/// Installs into a launcher game directory: version json, vanilla client
/// jar, libraries, then the client processors.
pub struct ClientInstall;

#[async_trait]
impl InstallAction for ClientInstall {
    async fn run(&self, ctx: &InstallContext<'_>, target: &Path) -> InstallerResult<GrabbedSet> {
        let profile = ctx.profile;
        if target.is_file() {
            return Err(ctx.fail(InstallerError::InvalidTarget {
                path: target.to_path_buf(),
                reason: "a file is in the way of the minecraft directory".into(),
            }));
        }

        let versions_dir = target.join("versions");
        let libraries_dir = target.join("libraries");
        std::fs::create_dir_all(&libraries_dir)
            .map_err(|e| InstallerError::io(&libraries_dir, e))?;

        check_cancelled(ctx.cancel)?;
        ctx.progress.stage("Extracting json");
        let version_json = versions_dir
            .join(&profile.version)
            .join(format!("{}.json", profile.version));
        match ctx.resources.extract_to(&profile.json, &version_json) {
            Ok(true) => {}
            Ok(false) => {
                return Err(ctx.fail_with(
                    "  Failed to extract",
                    InstallerError::MissingResource(profile.json.clone()),
                ))
            }
            Err(e) => return Err(ctx.fail_with("  Failed to extract", e)),
        }
        let version = VersionDescriptor::read(&version_json)?;

        check_cancelled(ctx.cancel)?;
        ctx.progress.stage("Considering minecraft client jar");
        let vanilla_dir = versions_dir.join(&profile.minecraft);
        if vanilla_dir.is_file() && std::fs::remove_file(&vanilla_dir).is_err() {
            return Err(ctx.fail(InstallerError::InvalidTarget {
                path: vanilla_dir.clone(),
                reason: format!(
                    "There was a problem with the launcher version data. You will need to clear {} manually.",
                    vanilla_dir.display()
                ),
            }));
        }
        std::fs::create_dir_all(&vanilla_dir).map_err(|e| InstallerError::io(&vanilla_dir, e))?;

        check_cancelled(ctx.cancel)?;
        let client_jar = vanilla_dir.join(format!("{}.jar", profile.minecraft));
        if !client_jar.exists() {
            let vanilla_json = vanilla_dir.join(format!("{}.json", profile.minecraft));
            let vanilla = VersionDescriptor::load_cached(
                ctx.downloader,
                &ctx.settings.version_manifest_url,
                &profile.minecraft,
                &vanilla_json,
            )
            .await
            .map_err(|e| {
                ctx.fail_with(
                    "Failed to download version manifest, can not find client jar URL.",
                    e,
                )
            })?;

            let Some(client) = vanilla.download("client") else {
                return Err(ctx.fail(InstallerError::Other(format!(
                    "Failed to download minecraft client, info missing from manifest: {}",
                    vanilla_json.display()
                ))));
            };

            if let Err(e) = ctx.fetcher(None, &[]).download_file(client, &client_jar).await {
                if let Err(e) = std::fs::remove_file(&client_jar) {
                    debug!("Could not remove {:?}: {}", client_jar, e);
                }
                return Err(ctx.fail_with(
                    "Downloading minecraft client failed, invalid checksum.\nTry again, or use the vanilla launcher to install the vanilla version.",
                    e,
                ));
            }
        }

        let processors = PostProcessors::new(profile, Side::Client);
        let libraries: Vec<Library> = version
            .libraries
            .iter()
            .chain(processors.libraries())
            .cloned()
            .collect();
        let grabbed = download_libraries(ctx, &libraries_dir, &libraries, Vec::new()).await?;

        check_cancelled(ctx.cancel)?;
        let paths = ProcessorPaths {
            libraries_dir,
            minecraft_jar: client_jar,
            root: target.to_path_buf(),
            installer: ctx.installer_path.to_path_buf(),
        };
        processors.process(&ctx.processor_env(), &paths).await?;

        info!("Client install of {} complete", profile.version);
        Ok(grabbed)
    }

    fn is_path_valid(&self, target: &Path) -> bool {
        target.is_dir()
    }

    fn file_error(&self, target: &Path) -> String {
        if target.exists() {
            "The target is not a directory".to_string()
        } else {
            "There is no minecraft directory set up, it will be created".to_string()
        }
    }

    fn success_message(&self, profile: &InstallProfile, grabbed: &GrabbedSet) -> String {
        if grabbed.is_empty() {
            format!(
                "Successfully installed client profile {} for version {}",
                profile.profile, profile.version
            )
        } else {
            format!(
                "Successfully installed client profile {} for version {}, and downloaded {} libraries",
                profile.profile,
                profile.version,
                grabbed.len()
            )
        }
    }
}
