// ─── Post Processors ───
// Runs the profile's processor steps for one side, skipping steps whose
// declared outputs are already present and valid.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::checksum::{same_digest, sha1_file};
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::launch::{read_main_class_from_jar, ProcessorInvocation, ProcessorLauncher};
use crate::core::maven::Artifact;
use crate::core::profile::{InstallProfile, Processor, Side};
use crate::core::progress::{
    check_cancelled, CancellationToken, MessagePriority, ProgressCallback,
};
use crate::core::resources::ResourceSource;
use crate::core::tokens::{
    self, absolute, artifact_reference, quoted_literal, resolve_value, TokenTable,
};
use crate::core::version::Library;

const SEPARATOR: &str =
    "===============================================================================";

/// Collaborators a processor run reports to and executes through.
pub struct ProcessorEnv<'a> {
    pub progress: &'a dyn ProgressCallback,
    pub cancel: &'a CancellationToken,
    pub launcher: &'a dyn ProcessorLauncher,
    pub resources: &'a dyn ResourceSource,
    /// Keep outputs whose checksum did not match after a run.
    pub keep_invalid_outputs: bool,
}

impl ProcessorEnv<'_> {
    fn log(&self, text: &str) {
        self.progress.message(text, MessagePriority::Normal);
    }

    fn low(&self, text: &str) {
        self.progress.message(text, MessagePriority::Low);
    }

    /// Report `err` on the progress sink and hand it back.
    fn fail(&self, err: InstallerError) -> InstallerError {
        self.progress.lines(&err.to_string());
        err
    }
}

/// Fixed paths a run is anchored to.
#[derive(Debug, Clone)]
pub struct ProcessorPaths {
    pub libraries_dir: PathBuf,
    pub minecraft_jar: PathBuf,
    pub root: PathBuf,
    pub installer: PathBuf,
}

pub struct PostProcessors<'a> {
    profile: &'a InstallProfile,
    side: Side,
    processors: Vec<&'a Processor>,
}

impl<'a> PostProcessors<'a> {
    pub fn new(profile: &'a InstallProfile, side: Side) -> Self {
        Self {
            profile,
            side,
            processors: profile.processors_for(side),
        }
    }

    pub fn has_tasks(&self) -> bool {
        !self.processors.is_empty()
    }

    pub fn steps(&self) -> &[&'a Processor] {
        &self.processors
    }

    /// Libraries the processors need. Empty when this side has no steps.
    pub fn libraries(&self) -> &'a [Library] {
        if self.has_tasks() {
            &self.profile.libraries
        } else {
            &[]
        }
    }

    /// Resolve data, seed the well-known tokens and run every step.
    pub async fn process(&self, env: &ProcessorEnv<'_>, paths: &ProcessorPaths) -> InstallerResult<()> {
        let temp = std::env::temp_dir().join(format!("forge_installer{}", Uuid::new_v4()));
        let result = match self.build_tokens(env, paths, &temp) {
            Ok(tokens) => run_steps(env, &self.processors, &tokens, &paths.libraries_dir).await,
            Err(e) => Err(e),
        };

        if temp.exists() {
            if let Err(e) = std::fs::remove_dir_all(&temp) {
                debug!("Could not remove {:?}: {}", temp, e);
            }
        }
        result
    }

    /// Build the token table: profile data for this side, then the
    /// well-known keys, which take precedence.
    ///
    /// Data values are `[artifact]` references, `'literal'` strings, or
    /// names of files bundled with the installer, extracted under `temp`.
    pub fn build_tokens(
        &self,
        env: &ProcessorEnv<'_>,
        paths: &ProcessorPaths,
        temp: &Path,
    ) -> InstallerResult<TokenTable> {
        let mut table = TokenTable::new();
        let data = self.profile.data_for(self.side);

        if !data.is_empty() {
            env.progress
                .start(&format!("Created Temporary Directory: {}", temp.display()));
            let mut failed = Vec::new();
            let steps = data.len() as f64;

            for (i, (key, value)) in data.iter().enumerate() {
                env.progress.progress((i + 1) as f64 / steps);

                if let Some(coord) = artifact_reference(value) {
                    let artifact = Artifact::parse(coord)?;
                    table.insert(key.clone(), absolute(&artifact.local_path(&paths.libraries_dir)));
                    continue;
                }
                if let Some(literal) = quoted_literal(value) {
                    table.insert(key.clone(), literal);
                    continue;
                }
                if value.is_empty() {
                    table.insert(key.clone(), "");
                    continue;
                }

                let target = temp.join(value.trim_start_matches('/'));
                env.log(&format!("  Extracting: {}", value));
                match env.resources.extract_to(value, &target) {
                    Ok(true) => {}
                    Ok(false) => failed.push(value.clone()),
                    Err(e) => {
                        warn!("Extracting {} failed: {}", value, e);
                        failed.push(value.clone());
                    }
                }
                table.insert(key.clone(), absolute(&target));
            }

            if !failed.is_empty() {
                return Err(env.fail(InstallerError::ExtractionFailed(failed)));
            }
        }

        table.insert(tokens::SIDE, self.side.as_str());
        table.insert(tokens::MINECRAFT_JAR, absolute(&paths.minecraft_jar));
        table.insert(tokens::MINECRAFT_VERSION, self.profile.minecraft.as_str());
        table.insert(tokens::ROOT, absolute(&paths.root));
        table.insert(tokens::INSTALLER, absolute(&paths.installer));
        table.insert(tokens::LIBRARY_DIR, absolute(&paths.libraries_dir));
        Ok(table)
    }
}

/// Run `steps` in order against `tokens`, stopping at the first failure.
pub async fn run_steps(
    env: &ProcessorEnv<'_>,
    steps: &[&Processor],
    tokens: &TokenTable,
    libraries_dir: &Path,
) -> InstallerResult<()> {
    match steps.len() {
        0 => return Ok(()),
        1 => env.progress.stage("Building Processor"),
        _ => env.progress.start("Building Processors"),
    }

    let total = steps.len() as f64;
    for (i, processor) in steps.iter().enumerate() {
        check_cancelled(env.cancel)?;
        env.progress.progress((i + 1) as f64 / total);
        env.log(SEPARATOR);

        let outputs = resolve_outputs(processor, tokens, libraries_dir).map_err(|e| env.fail(e))?;
        if !outputs.is_empty() && cache_hit(env, &outputs) {
            env.log("  Cache Hit!");
            continue;
        }

        let invocation = prepare(env, processor, tokens, libraries_dir)?;
        env.launcher.launch(&invocation).await.map_err(|e| {
            env.progress.lines(&format!("{}\nSee log for more details.", e));
            e
        })?;

        verify_outputs(env, &outputs)?;
    }

    info!("Ran {} processor step(s)", steps.len());
    Ok(())
}

/// Resolve declared outputs to `(absolute path, expected sha1)` pairs.
fn resolve_outputs(
    processor: &Processor,
    tokens: &TokenTable,
    libraries_dir: &Path,
) -> InstallerResult<BTreeMap<String, String>> {
    let mut outputs = BTreeMap::new();
    for (key, value) in &processor.outputs {
        let Some(value) = value else {
            return Err(InstallerError::InvalidOutputConfig {
                key: key.clone(),
                value: "null".to_string(),
            });
        };
        let path = resolve_value(tokens, key, libraries_dir)?;
        outputs.insert(path, tokens.substitute(value)?);
    }
    Ok(outputs)
}

/// Check every output; mismatching files are deleted so the step starts
/// from scratch. Any miss means the step runs again.
fn cache_hit(env: &ProcessorEnv<'_>, outputs: &BTreeMap<String, String>) -> bool {
    env.log("  Cache: ");
    let mut miss = false;

    for (path, expected) in outputs {
        let file = Path::new(path);
        if !file.exists() {
            env.log(&format!("    {} Missing", path));
            miss = true;
            continue;
        }

        let actual = sha1_file(file).unwrap_or_default();
        if same_digest(expected, &actual) {
            env.log(&format!("    {} Validated: {}", path, expected));
            continue;
        }

        env.log(&format!("    {}", path));
        env.log(&format!("      Expected: {}", expected));
        env.log(&format!("      Actual:   {}", actual));
        miss = true;
        if let Err(e) = std::fs::remove_file(file) {
            debug!("Could not delete stale output {:?}: {}", file, e);
        }
    }

    !miss
}

/// Locate the jar and its dependencies and expand the arguments.
fn prepare(
    env: &ProcessorEnv<'_>,
    processor: &Processor,
    tokens: &TokenTable,
    libraries_dir: &Path,
) -> InstallerResult<ProcessorInvocation> {
    let jar = processor.jar.local_path(libraries_dir);
    if !jar.is_file() {
        return Err(env.fail(InstallerError::MissingProcessorJar(jar)));
    }

    let main_class = read_main_class_from_jar(&jar).map_err(|e| env.fail(e))?;
    env.low(&format!("  MainClass: {}", main_class));

    env.low("  Classpath:");
    env.low(&format!("    {}", absolute(&jar)));
    let mut classpath = vec![jar.clone()];
    let mut missing = Vec::new();
    for dep in &processor.classpath {
        let lib = dep.local_path(libraries_dir);
        if !lib.is_file() {
            missing.push(dep.descriptor().to_string());
        }
        env.low(&format!("    {}", absolute(&lib)));
        classpath.push(lib);
    }
    if !missing.is_empty() {
        return Err(env.fail(InstallerError::MissingProcessorDependencies(missing)));
    }

    let args = processor
        .args
        .iter()
        .map(|arg| resolve_value(tokens, arg, libraries_dir))
        .collect::<InstallerResult<Vec<_>>>()
        .map_err(|e| env.fail(e))?;

    env.low(&format!(
        "  Args: {}",
        args.iter()
            .map(|a| {
                if a.contains(' ') || a.contains(',') {
                    format!("\"{}\"", a)
                } else {
                    a.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    ));

    Ok(ProcessorInvocation {
        jar,
        main_class,
        classpath,
        args,
        working_dir: libraries_dir.to_path_buf(),
    })
}

fn verify_outputs(env: &ProcessorEnv<'_>, outputs: &BTreeMap<String, String>) -> InstallerResult<()> {
    let mut err = String::new();

    for (path, expected) in outputs {
        let file = Path::new(path);
        if !file.exists() {
            err.push_str(&format!("\n    {} missing", path));
            continue;
        }

        let actual = sha1_file(file)?;
        if same_digest(expected, &actual) {
            env.log(&format!("  Output: {} Checksum Validated: {}", path, actual));
            continue;
        }

        err.push_str(&format!(
            "\n    {}\n      Expected: {}\n      Actual:   {}",
            path, expected, actual
        ));
        if !env.keep_invalid_outputs && std::fs::remove_file(file).is_err() {
            err.push_str("\n      Could not delete file");
        }
    }

    if err.is_empty() {
        Ok(())
    } else {
        Err(env.fail(InstallerError::InvalidProcessorOutputs(err)))
    }
}
