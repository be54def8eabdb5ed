use std::path::Path;

use async_trait::async_trait;

use super::action::InstallAction;
use super::context::InstallContext;
use crate::core::downloader::GrabbedSet;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::profile::InstallProfile;

/// Only unpacks the contained main artifact.
pub struct ExtractInstall;

#[async_trait]
impl InstallAction for ExtractInstall {
    async fn run(&self, ctx: &InstallContext<'_>, target: &Path) -> InstallerResult<GrabbedSet> {
        if let Some(contained) = &ctx.profile.path {
            let dest = target.join(contained.filename());
            let message = format!(
                "An error occurred extracting the files:\n{}",
                contained.filename()
            );
            match ctx.resources.extract_artifact(contained, &dest) {
                Ok(true) => {}
                Ok(false) => {
                    return Err(ctx.fail_with(
                        &message,
                        InstallerError::ExtractionFailed(vec![contained.filename()]),
                    ))
                }
                Err(e) => return Err(ctx.fail_with(&message, e)),
            }
        }
        Ok(GrabbedSet::new())
    }

    fn is_path_valid(&self, target: &Path) -> bool {
        target.is_dir()
    }

    fn file_error(&self, target: &Path) -> String {
        if !target.exists() {
            "Target directory does not exist".to_string()
        } else if !target.is_dir() {
            "Target is not a directory".to_string()
        } else {
            String::new()
        }
    }

    fn success_message(&self, _profile: &InstallProfile, _grabbed: &GrabbedSet) -> String {
        "Extracted successfully".to_string()
    }
}
