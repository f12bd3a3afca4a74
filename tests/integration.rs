use std::{fs, path::PathBuf, process::Command};

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_contents = String::new()
        + "controllers = [\"ARIMA\", \"DTW\", \"PID\"]\n"
        + "topologies = [\"Coupled\", \"Decentral\", \"Central\"]\n"
        + "disruptions = [\"BlockageConstant\", \"BlockageCosine\", \"PumpOutage\", \"NoDisruption\"]\n"
        + "considered_groups = [\n"
        + "  \"ARIMA_Decentral_BlockageConstant\",\n"
        + "  \"PID_Central_BlockageConstant\",\n"
        + "  \"PID_Decentral_BlockageCosine\",\n"
        + "  \"PID_Decentral_PumpOutage\",\n"
        + "]\n"
        + "runs_per_group = 10\n"
        + "pressure_floor = 0.0\n"
        + "publish_prefix = \"testrig\"\n";

    fs::write(test_dir.join("config.toml"), config_contents).expect("failed to write config file");

    fn run_bin(args: &[&str]) {
        let bin = PathBuf::from(env!("CARGO_BIN_EXE_aquarig"));

        let output = Command::new(bin)
            .args(args)
            .output()
            .expect("failed to execute command");

        let stdout_str =
            std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
        let stderr_str =
            std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

        assert!(
            output.status.success(),
            "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
        );
    }

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--data-dir", test_dir_str, "seed"]);
    assert!(test_dir.join("measurements.msgpack").exists());

    run_bin(&["--data-dir", test_dir_str, "analyze"]);
    assert!(test_dir.join("results.msgpack").exists());

    run_bin(&["--data-dir", test_dir_str, "plot"]);

    let publish_root = test_dir.join("publish");
    let published: Vec<_> = fs::read_dir(&publish_root)
        .expect("failed to read publish directory")
        .filter_map(Result::ok)
        .collect();
    assert_eq!(published.len(), 1, "expected exactly one published directory");

    let publish_dir = published[0].path();
    for name in ["comparison.svg", "results.msgpack", "config.toml"] {
        assert!(
            publish_dir.join(name).exists(),
            "missing published artifact {name}"
        );
    }

    run_bin(&["--data-dir", test_dir_str, "clean"]);
    assert!(!test_dir.join("results.msgpack").exists());
    let remaining = fs::read_dir(&publish_root).map(|it| it.count()).unwrap_or(0);
    assert_eq!(remaining, 0, "published directories must be removed");

    fs::remove_dir_all(&test_dir).ok();
}
