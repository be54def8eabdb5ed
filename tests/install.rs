mod common;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::write_zip;
use forge_wrapper_lib::core::launch::{ProcessorInvocation, ProcessorLauncher};
use forge_wrapper_lib::core::progress::MemoryProgress;
use forge_wrapper_lib::{
    ActionKind, Artifact, CancellationToken, InstallerError, InstallerResult, InstallerSettings,
    Installer,
};
use tempfile::TempDir;

const PROFILE: &str = r#"{
    "spec": 1,
    "profile": "forge",
    "version": "1.20.1-forge-47.2.0",
    "minecraft": "1.20.1",
    "json": "/version.json",
    "path": "org.example:forge:47.2.0:universal",
    "libraries": [
        { "name": "org.example:tool:1.0", "downloads": { "artifact": { "path": "org/example/tool/1.0/tool-1.0.jar", "url": "" } } }
    ],
    "processors": [
        { "jar": "org.example:tool:1.0", "args": ["--root", "{ROOT}", "--mc", "{MINECRAFT_JAR}"] }
    ],
    "data": {}
}"#;

const VERSION: &str = r#"{
    "id": "1.20.1-forge-47.2.0",
    "libraries": [
        { "name": "org.example:lib:1.0", "downloads": { "artifact": { "path": "org/example/lib/1.0/lib-1.0.jar", "url": "https://maven.example.org/org/example/lib/1.0/lib-1.0.jar" } } }
    ]
}"#;

#[derive(Default)]
struct CountingLauncher {
    calls: Mutex<Vec<ProcessorInvocation>>,
}

#[async_trait]
impl ProcessorLauncher for CountingLauncher {
    async fn launch(&self, invocation: &ProcessorInvocation) -> InstallerResult<()> {
        self.calls.lock().unwrap().push(invocation.clone());
        Ok(())
    }
}

fn write_installer(dir: &Path) -> PathBuf {
    write_installer_with(dir, VERSION, &[])
}

fn write_installer_with(dir: &Path, version: &str, extra: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join("forge-installer.jar");
    let mut entries: Vec<(&str, &[u8])> = vec![
        ("install_profile.json", PROFILE.as_bytes()),
        ("version.json", version.as_bytes()),
        (
            "maven/org/example/forge/47.2.0/forge-47.2.0-universal.jar",
            &b"universal"[..],
        ),
    ];
    entries.extend_from_slice(extra);
    write_zip(&path, &entries);
    path
}

/// Lay out libraries so nothing needs fetching.
fn seed_libraries(libraries: &Path) {
    let lib = Artifact::parse("org.example:lib:1.0").unwrap().local_path(libraries);
    std::fs::create_dir_all(lib.parent().unwrap()).unwrap();
    std::fs::write(&lib, b"lib").unwrap();

    let tool = Artifact::parse("org.example:tool:1.0").unwrap().local_path(libraries);
    std::fs::create_dir_all(tool.parent().unwrap()).unwrap();
    write_zip(
        &tool,
        &[(
            "META-INF/MANIFEST.MF",
            b"Manifest-Version: 1.0\nMain-Class: org.example.Tool\n",
        )],
    );
}

fn offline() -> InstallerSettings {
    InstallerSettings {
        offline: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn server_install_from_local_state() {
    let temp = TempDir::new().unwrap();
    let installer = write_installer(temp.path());
    let target = temp.path().join("server");
    seed_libraries(&target.join("libraries"));
    std::fs::write(target.join("minecraft_server.1.20.1.jar"), b"vanilla").unwrap();

    let launcher = Arc::new(CountingLauncher::default());
    let progress = Arc::new(MemoryProgress::new());
    let report = Installer::new(&installer, &target, ActionKind::Server)
        .with_settings(offline())
        .with_launcher(launcher.clone())
        .with_progress(progress.clone())
        .run()
        .await
        .unwrap();

    assert!(report.grabbed.is_empty());
    assert_eq!(
        report.message,
        "Successfully downloaded minecraft server and installed 1.20.1-forge-47.2.0"
    );
    assert_eq!(
        std::fs::read(target.join("forge-47.2.0-universal.jar")).unwrap(),
        b"universal"
    );

    let calls = launcher.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].main_class, "org.example.Tool");
    assert!(calls[0].args[3].ends_with("minecraft_server.1.20.1.jar"));
    assert!(progress.contains("  Extracted successfully"));
    assert!(progress.contains("File exists: No checksum, Assuming valid."));
}

#[tokio::test]
async fn client_install_extracts_version_json() {
    let temp = TempDir::new().unwrap();
    let installer = write_installer(temp.path());
    let target = temp.path().join(".minecraft");
    seed_libraries(&target.join("libraries"));
    let vanilla = target.join("versions/1.20.1/1.20.1.jar");
    std::fs::create_dir_all(vanilla.parent().unwrap()).unwrap();
    std::fs::write(&vanilla, b"client").unwrap();

    let launcher = Arc::new(CountingLauncher::default());
    let report = Installer::new(&installer, &target, ActionKind::Client)
        .with_settings(offline())
        .with_launcher(launcher.clone())
        .run()
        .await
        .unwrap();

    assert!(target
        .join("versions/1.20.1-forge-47.2.0/1.20.1-forge-47.2.0.json")
        .is_file());
    assert!(report.message.starts_with("Successfully installed client profile forge"));
    assert_eq!(launcher.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_library_fails_offline() {
    let temp = TempDir::new().unwrap();
    let installer = write_installer(temp.path());
    let target = temp.path().join("server");
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(target.join("minecraft_server.1.20.1.jar"), b"vanilla").unwrap();

    let launcher = Arc::new(CountingLauncher::default());
    let err = Installer::new(&installer, &target, ActionKind::Server)
        .with_settings(offline())
        .with_launcher(launcher.clone())
        .run()
        .await
        .unwrap_err();

    match err {
        InstallerError::LibrariesFailed(failed) => assert_eq!(failed, vec!["org.example:lib:1.0"]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(launcher.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn library_pass_reports_every_failure() {
    let version = r#"{
        "id": "1.20.1-forge-47.2.0",
        "libraries": [
            { "name": "org.example:first:1.0", "downloads": { "artifact": { "path": "org/example/first/1.0/first-1.0.jar", "url": "https://maven.example.org/org/example/first/1.0/first-1.0.jar" } } },
            { "name": "org.example:bundled:1.0", "downloads": { "artifact": { "path": "org/example/bundled/1.0/bundled-1.0.jar", "url": "https://maven.example.org/org/example/bundled/1.0/bundled-1.0.jar" } } },
            { "name": "org.example:second:1.0", "downloads": { "artifact": { "path": "org/example/second/1.0/second-1.0.jar", "url": "https://maven.example.org/org/example/second/1.0/second-1.0.jar" } } }
        ]
    }"#;
    let temp = TempDir::new().unwrap();
    let installer = write_installer_with(
        temp.path(),
        version,
        &[("maven/org/example/bundled/1.0/bundled-1.0.jar", &b"bundled"[..])],
    );
    let target = temp.path().join("server");
    seed_libraries(&target.join("libraries"));
    std::fs::write(target.join("minecraft_server.1.20.1.jar"), b"vanilla").unwrap();

    let launcher = Arc::new(CountingLauncher::default());
    let progress = Arc::new(MemoryProgress::new());
    let err = Installer::new(&installer, &target, ActionKind::Server)
        .with_settings(offline())
        .with_launcher(launcher.clone())
        .with_progress(progress.clone())
        .run()
        .await
        .unwrap_err();

    match err {
        InstallerError::LibrariesFailed(failed) => {
            assert_eq!(failed, vec!["org.example:first:1.0", "org.example:second:1.0"])
        }
        other => panic!("unexpected error: {other}"),
    }
    let bundled = Artifact::parse("org.example:bundled:1.0")
        .unwrap()
        .local_path(&target.join("libraries"));
    assert_eq!(std::fs::read(bundled).unwrap(), b"bundled");
    assert!(progress.contains("These libraries failed to download. Try again."));
    assert!(launcher.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn extract_reports_the_underlying_error() {
    let temp = TempDir::new().unwrap();
    let installer = write_installer(temp.path());
    let target = temp.path().join("out");
    std::fs::create_dir_all(target.join("forge-47.2.0-universal.jar")).unwrap();

    let progress = Arc::new(MemoryProgress::new());
    let err = Installer::new(&installer, &target, ActionKind::Extract)
        .with_settings(offline())
        .with_progress(progress.clone())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, InstallerError::Io { .. }), "got {err}");
    assert!(progress.contains("An error occurred extracting the files:"));
}

#[tokio::test]
async fn extract_only_unpacks_contained_jar() {
    let temp = TempDir::new().unwrap();
    let installer = write_installer(temp.path());
    let target = temp.path().join("out");
    std::fs::create_dir_all(&target).unwrap();

    let report = Installer::new(&installer, &target, ActionKind::Extract)
        .with_settings(offline())
        .run()
        .await
        .unwrap();

    assert_eq!(report.message, "Extracted successfully");
    assert_eq!(std::fs::read_dir(&target).unwrap().count(), 1);
    assert!(target.join("forge-47.2.0-universal.jar").is_file());
}

#[tokio::test]
async fn cancelled_install_reports_failure() {
    let temp = TempDir::new().unwrap();
    let installer = write_installer(temp.path());
    let target = temp.path().join("server");

    let cancel = CancellationToken::new();
    cancel.cancel();
    let install = Installer::new(&installer, &target, ActionKind::Server)
        .with_settings(offline())
        .with_cancellation(cancel);

    assert!(matches!(install.run().await, Err(InstallerError::Cancelled)));
    assert!(!install.install().await);
}
