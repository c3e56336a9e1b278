//! Dependency installer behavior: idempotence and fail-fast installs.

mod common;

use common::{MockRunner, ALL_TOOLS};
use eks_bootstrap::pipeline::Step;
use eks_bootstrap::steps::ToolsStep;
use eks_bootstrap::ProvisionContext;
use std::sync::Arc;

/// Probe root with the bash-completion marker file present.
fn probe_root_with_completion() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("usr/share/bash-completion/bash_completion");
    std::fs::create_dir_all(marker.parent().unwrap()).unwrap();
    std::fs::write(&marker, "# bash_completion\n").unwrap();
    dir
}

#[tokio::test]
async fn all_tools_present_performs_no_installs() {
    let root = probe_root_with_completion();
    let runner = Arc::new(MockRunner::new().with_tools(ALL_TOOLS));
    let step = ToolsStep::new(runner.clone()).with_probe_root(root.path().to_path_buf());

    let mut ctx = ProvisionContext::new();
    step.run(&mut ctx).await.unwrap();

    assert!(
        runner.calls().is_empty(),
        "re-run with everything present must issue no commands"
    );
}

#[tokio::test]
async fn missing_tool_runs_its_install_sequence_in_order() {
    let root = probe_root_with_completion();
    let tools: Vec<&str> = ALL_TOOLS.iter().copied().filter(|t| *t != "kubectl").collect();
    let runner = Arc::new(MockRunner::new().with_tools(&tools));
    let step = ToolsStep::new(runner.clone()).with_probe_root(root.path().to_path_buf());

    let mut ctx = ProvisionContext::new();
    step.run(&mut ctx).await.unwrap();

    let lines: Vec<String> = runner.calls().into_iter().map(|c| c.line).collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("curl") && lines[0].contains("/tmp/kubectl"));
    assert!(lines[1].contains("chmod +x /tmp/kubectl"));
    assert!(lines[2].contains("mv /tmp/kubectl /usr/local/bin/kubectl"));
}

#[tokio::test]
async fn install_failure_is_fatal_and_stops_later_tools() {
    let root = probe_root_with_completion();
    // kubectl and docker both missing; kubectl download fails
    let tools: Vec<&str> = ALL_TOOLS
        .iter()
        .copied()
        .filter(|t| *t != "kubectl" && *t != "docker")
        .collect();
    let runner = Arc::new(
        MockRunner::new()
            .with_tools(&tools)
            .with_rule("dl.k8s.io", 1, "", "curl: (22) The requested URL returned error: 404"),
    );
    let step = ToolsStep::new(runner.clone()).with_probe_root(root.path().to_path_buf());

    let mut ctx = ProvisionContext::new();
    let result = step.run(&mut ctx).await;

    assert!(result.is_err());
    assert_eq!(
        runner.calls_matching("yum install -y docker"),
        0,
        "a failed install must not proceed to later tools"
    );
}

#[tokio::test]
async fn missing_completion_marker_installs_package() {
    let root = tempfile::tempdir().unwrap(); // no marker file
    let runner = Arc::new(MockRunner::new().with_tools(ALL_TOOLS));
    let step = ToolsStep::new(runner.clone()).with_probe_root(root.path().to_path_buf());

    let mut ctx = ProvisionContext::new();
    step.run(&mut ctx).await.unwrap();

    assert_eq!(runner.calls_matching("yum install -y bash-completion"), 1);
}
