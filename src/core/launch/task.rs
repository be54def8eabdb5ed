// ─── Processor Task ───
// Runs one processor step as `java -cp <classpath> <MainClass> <args…>`.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::classpath::join_classpath;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::java::resolve_java_binary;
use crate::core::settings::InstallerSettings;

/// A fully resolved processor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorInvocation {
    pub jar: PathBuf,
    pub main_class: String,
    /// Processor jar first, then its declared classpath.
    pub classpath: Vec<PathBuf>,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

/// Executes processor invocations. An `Err` must carry
/// [`InstallerError::ProcessorFailed`] with the failure category.
#[async_trait]
pub trait ProcessorLauncher: Send + Sync {
    async fn launch(&self, invocation: &ProcessorInvocation) -> InstallerResult<()>;
}

/// Runs processors in a child JVM.
#[derive(Debug, Clone)]
pub struct JavaProcessLauncher {
    java_bin: PathBuf,
}

impl JavaProcessLauncher {
    pub fn new(java_bin: PathBuf) -> Self {
        Self { java_bin }
    }

    pub fn from_settings(settings: &InstallerSettings) -> Self {
        Self::new(resolve_java_binary(settings))
    }
}

#[async_trait]
impl ProcessorLauncher for JavaProcessLauncher {
    async fn launch(&self, invocation: &ProcessorInvocation) -> InstallerResult<()> {
        let classpath = join_classpath(&invocation.classpath);

        let mut cmd = tokio::process::Command::new(&self.java_bin);
        cmd.arg("-cp")
            .arg(&classpath)
            .arg(&invocation.main_class)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        info!("Running processor {}", invocation.main_class);
        debug!("Command: {:?}", cmd);

        let output = cmd.output().await.map_err(|e| InstallerError::ProcessorFailed {
            category: "java.io.IOException".to_string(),
            message: format!("{} ({})", e, self.java_bin.display()),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            debug!(target: "forge_wrapper_lib::processor", "{}", line);
        }

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            warn!(target: "forge_wrapper_lib::processor", "{}", line);
        }

        let (category, message) = parse_java_exception(&stderr).unwrap_or_else(|| {
            (
                "ProcessExit".to_string(),
                match output.status.code() {
                    Some(code) => format!("exit status {}", code),
                    None => "terminated by signal".to_string(),
                },
            )
        });
        Err(InstallerError::ProcessorFailed { category, message })
    }
}

/// Pull `(class, message)` out of an uncaught-exception report such as
/// `Exception in thread "main" java.io.IOException: boom`.
pub fn parse_java_exception(stderr: &str) -> Option<(String, String)> {
    let line = stderr
        .lines()
        .find(|l| l.starts_with("Exception in thread"))?;
    let (_, rest) = line.split_once("\" ")?;
    match rest.split_once(':') {
        Some((class, message)) => Some((class.trim().to_string(), message.trim().to_string())),
        None => Some((rest.trim().to_string(), String::new())),
    }
}
