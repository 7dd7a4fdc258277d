use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::{tempdir, NamedTempFile};

/// Writes a config whose directory does not exist, so the run fails before any upload.
fn create_config_with_missing_directory() -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(
        config.path(),
        b"directory: ./definitely-missing-dir\nbucket: test-bucket\nclient:\n  region: eu-west-1\n",
    )
    .expect("Writing temp config failed");
    config
}

#[test]
fn deploy_fails_with_nonzero_exit_when_directory_is_missing() {
    let config = create_config_with_missing_directory();
    let mut cmd = Command::cargo_bin("s3-deploy").expect("Binary exists");

    cmd.arg("deploy")
        .arg("--config")
        .arg(config.path())
        .env("AWS_ACCESS_KEY_ID", "test")
        .env("AWS_SECRET_ACCESS_KEY", "test")
        .env("AWS_EC2_METADATA_DISABLED", "true");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read directory"));
}

#[test]
fn deploy_directory_flag_overrides_config() {
    let config = create_config_with_missing_directory();
    let other = tempdir().unwrap();
    let missing = other.path().join("also-missing");
    let mut cmd = Command::cargo_bin("s3-deploy").expect("Binary exists");

    cmd.arg("deploy")
        .arg("--config")
        .arg(config.path())
        .arg("--directory")
        .arg(&missing)
        .env("AWS_ACCESS_KEY_ID", "test")
        .env("AWS_SECRET_ACCESS_KEY", "test")
        .env("AWS_EC2_METADATA_DISABLED", "true");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("also-missing"));
}

#[test]
fn deploy_requires_config_flag() {
    let mut cmd = Command::cargo_bin("s3-deploy").expect("Binary exists");
    cmd.arg("deploy").assert().failure().stderr(predicate::str::contains("--config"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use s3_deploy::cli::{run, Cli, Commands};

    // A config path that does not exist: run fails right after the first event.
    let cli = Cli {
        command: Commands::Deploy {
            config: std::path::PathBuf::from("dummy.yaml"),
            directory: None,
        },
    };

    let result = run(cli).await;
    assert!(result.is_err(), "Missing config file should fail the run");

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
