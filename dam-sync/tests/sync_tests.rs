//! Settings layering and plan composition from the command line down

use clap::Parser;
use dam_common::config::TomlConfig;
use dam_sync::cli::Cli;
use dam_sync::settings::{load_project_overrides, PROJECT_FILE};
use dam_sync::{Direction, SyncError, SyncPlan};
use tempfile::TempDir;

const CONFIG: &str = r#"
creator = "Jane Doe"

[sync]
live_server = "10.10.10.17"
local_server = "192.168.56.5"
server_path = "/var/www/html"
"#;

fn plan_for(dev: &TempDir, args: &[&str]) -> Result<SyncPlan, SyncError> {
    let config: TomlConfig = toml::from_str(CONFIG).unwrap();
    let mut argv = vec!["dam-sync"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();

    let mut settings = config.sync;
    if let Some(project) = load_project_overrides(dev.path())? {
        settings = project.apply(settings);
    }
    settings = cli.overrides().apply(settings);

    let plan = SyncPlan::new(
        cli.direction,
        dev.path(),
        cli.subpath.as_deref(),
        cli.options(),
        settings,
    )?;
    plan.check_paths()?;
    Ok(plan)
}

#[test]
fn test_project_file_overrides_config() {
    let dev = TempDir::new().unwrap();
    std::fs::write(
        dev.path().join(PROJECT_FILE),
        "live_server = \"crm.example.org\"\nextra_filters = [\"- /themes/old/***\"]\n",
    )
    .unwrap();

    let plan = plan_for(&dev, &["live-to-dev"]).unwrap();
    assert_eq!(plan.direction, Direction::LiveToDev);
    assert!(plan
        .command_line()
        .contains("--bwlimit=8m crm.example.org:/var/www/html/ "));
    assert!(plan.filters().contains("- *.csv\n- /themes/old/***\n- *.zip\n"));
}

#[test]
fn test_command_line_overrides_project_file() {
    let dev = TempDir::new().unwrap();
    std::fs::write(dev.path().join(PROJECT_FILE), "bandwidth_limit = \"1m\"\n").unwrap();

    let plan = plan_for(&dev, &["--bwlimit", "", "-s", "dev-to-live"]).unwrap();
    let line = plan.command_line();
    assert!(!line.contains("--bwlimit"));
    assert!(line.contains("--info=progress2,stats2"));
    assert!(line.ends_with(" 10.10.10.17:/var/www/html/"));
}

#[test]
fn test_missing_subpath_is_rejected() {
    let dev = TempDir::new().unwrap();
    std::fs::create_dir_all(dev.path().join("custom").join("modules")).unwrap();

    let plan = plan_for(&dev, &["dev-to-local", "/custom/modules"]).unwrap();
    assert!(plan
        .filters()
        .ends_with("+ /custom/\n+ /custom/modules/***\n- /**\n"));

    assert!(matches!(
        plan_for(&dev, &["dev-to-local", "themes"]),
        Err(SyncError::NotADirectory(_))
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_rules_reach_stdin() {
    use dam_common::shell::{RunMode, Runner, ShellCommand};

    let dev = TempDir::new().unwrap();
    let plan = plan_for(&dev, &["dev-to-local"]).unwrap();
    let rules = dev.path().join("rules.txt");

    // stand-in for rsync reading the merge file from stdin
    let command = ShellCommand::new(format!("cat > '{}'", rules.display()))
        .with_stdin(plan.shell_command().stdin.unwrap());
    let mut runner = Runner::new(RunMode::Execute);
    assert!(runner.run(&command).await.unwrap());

    assert_eq!(std::fs::read_to_string(&rules).unwrap(), plan.filters());
}
