#[cfg(test)]
mod tests {
    use std::{
        env, fs,
        path::PathBuf,
        process,
        time::{Duration, Instant, SystemTime, UNIX_EPOCH},
    };

    use hud_metrics::MetricsSnapshot;

    use crate::{
        ACCESS_DENIED, Capabilities, ERROR, Expander, FileAccessPolicy, HudConfig, ShellRunner,
        TIMEOUT, VariableDictionary,
    };

    fn unique_tmp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        let mut dir = env::temp_dir();
        dir.push(format!("hudkit-{name}-{}-{nanos}", process::id()));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn snapshot() -> MetricsSnapshot {
        let mut m = MetricsSnapshot::default();
        m.cpu.usage = 45.5;
        m.battery.percent = 15;
        m.battery.status = "Discharging".to_string();
        m.wifi.ssid = "home".to_string();
        m
    }

    fn all_caps() -> Capabilities {
        Capabilities {
            file_reading: true,
            shell_commands: true,
        }
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let e = Expander::new(all_caps());
        let m = snapshot();
        for text in ["", "plain", "$ {cpu.usage}", "cost: $5 {x}", "${"] {
            assert_eq!(e.expand_variables(text, &m), text);
        }
    }

    #[test]
    fn known_variables_are_substituted() {
        let e = Expander::new(Capabilities::default());
        let m = snapshot();
        assert_eq!(e.expand_variables("${cpu.usage}", &m), "45.5");
        assert_eq!(
            e.expand_variables("CPU ${cpu.usage}% | BAT ${battery.percent}%", &m),
            "CPU 45.5% | BAT 15%"
        );
    }

    #[test]
    fn unknown_placeholders_are_preserved() {
        let e = Expander::new(all_caps());
        let m = snapshot();
        assert_eq!(e.expand_variables("${nope.var}", &m), "${nope.var}");
        assert_eq!(
            e.expand_variables("a ${nope} b ${cpu.usage}", &m),
            "a ${nope} b 45.5"
        );
        assert_eq!(e.expand_variables("${}", &m), "${}");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let e = Expander::new(all_caps());
        let mut vars = VariableDictionary::new();
        vars.insert("wifi.ssid".into(), "${exec command=\"echo pwned\"}".into());
        vars.insert("loop".into(), "${loop}".into());
        let frame = e.frame_with(vars);
        assert_eq!(
            frame.expand("${wifi.ssid}"),
            "${exec command=\"echo pwned\"}"
        );
        assert_eq!(frame.expand("${loop}${loop}"), "${loop}${loop}");
    }

    #[test]
    fn capability_flags_gate_special_forms() {
        let m = snapshot();
        let off = Expander::new(Capabilities::default());
        let exec = "${exec command=\"echo hi\"}";
        let file = "${file path=\"/etc/hostname\"}";
        assert_eq!(off.expand_variables(exec, &m), exec);
        assert_eq!(off.expand_variables(file, &m), file);

        let cfg = HudConfig {
            enable_file_reading: true,
            ..HudConfig::default()
        };
        let files_only = Expander::for_config(&cfg);
        assert!(!files_only.capabilities().shell_commands);
        assert_eq!(files_only.expand_variables(exec, &m), exec);
    }

    #[test]
    fn malformed_special_forms_are_errors() {
        let e = Expander::new(all_caps());
        let m = snapshot();
        assert_eq!(e.expand_variables("${exec echo hi}", &m), ERROR);
        assert_eq!(e.expand_variables("${file /tmp/x}", &m), ERROR);
        assert_eq!(e.expand_variables("${file path=\"\"}", &m), ERROR);
    }

    #[test]
    fn file_placeholder_reads_first_line() {
        let dir = unique_tmp_dir("expand-file");
        let path = dir.join("status.txt");
        fs::write(&path, "  ready  \nsecond line\n").unwrap();

        let policy = FileAccessPolicy::new(None, vec![dir.clone()]);
        let e = Expander::new(all_caps()).with_file_policy(policy);
        let text = format!("state: ${{file path=\"{}\"}}", path.display());
        assert_eq!(e.expand_variables(&text, &snapshot()), "state: ready");

        let _ignored = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_placeholder_outside_roots_is_denied() {
        let dir = unique_tmp_dir("expand-denied");
        let policy = FileAccessPolicy::new(Some(dir.clone()), vec![dir.clone()]);
        let e = Expander::new(all_caps()).with_file_policy(policy);
        let m = snapshot();
        for path in ["/etc/passwd", "~/../../etc/passwd", "relative.txt"] {
            let text = format!("${{file path=\"{path}\"}}");
            assert_eq!(e.expand_variables(&text, &m), ACCESS_DENIED, "{path}");
        }
        let _ignored = fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn exec_placeholder_runs_command() {
        let e = Expander::new(all_caps());
        let m = snapshot();
        assert_eq!(
            e.expand_variables("[${exec command=\"echo hello; echo world\"}]", &m),
            "[hello]"
        );
    }

    #[cfg(unix)]
    #[test]
    fn failures_are_per_placeholder() {
        let shell = ShellRunner::default().with_timeout(Duration::from_millis(200));
        let e = Expander::new(all_caps()).with_shell(shell);
        let m = snapshot();
        let start = Instant::now();
        let out = e.expand_variables(
            "${cpu.usage} ${exec command=\"sleep 5\"} ${battery.status} ${nope}",
            &m,
        );
        assert_eq!(out, format!("45.5 {TIMEOUT} Discharging ${{nope}}"));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn conditions_against_snapshot() {
        let e = Expander::new(Capabilities::default());
        let mut m = snapshot();
        assert!(e.evaluate_condition(None, &m));
        assert!(e.evaluate_condition(Some(""), &m));
        assert!(e.evaluate_condition(Some("invalid(((syntax"), &m));

        m.cpu.usage = 75.0;
        assert!(e.evaluate_condition(Some("cpu.usage > 50"), &m));
        m.cpu.usage = 25.0;
        assert!(!e.evaluate_condition(Some("cpu.usage > 50"), &m));

        assert!(e.evaluate_condition(
            Some("battery.percent < 20 && battery.status != 'Charging'"),
            &m
        ));
        assert!(e.evaluate_condition(Some("wifi.ssid === 'home'"), &m));
    }

    #[test]
    fn frame_shares_one_dictionary() {
        let e = Expander::new(Capabilities::default());
        let m = snapshot();
        let mut frame = e.frame(&m);
        assert_eq!(frame.variables()["cpu.usage"], "45.5");
        assert!(frame.condition(Some("cpu.usage > 40")));
        assert!(!frame.condition(Some("cpu.usage > 50")));
        assert_eq!(frame.expand("${battery.status}"), "Discharging");
    }

    #[test]
    fn source_values_parse_numbers() {
        let e = Expander::new(Capabilities::default());
        let mut m = snapshot();
        m.memory.used_gb = 7.2;
        let frame = e.frame(&m);
        assert_eq!(frame.source_value("cpu.usage"), Some(45.5));
        assert_eq!(frame.source_value(" battery.percent "), Some(15.0));
        assert_eq!(frame.source_value("memory.used"), Some(7.2));
        assert_eq!(frame.source_value("wifi.ssid"), None);
        assert_eq!(frame.source_value("nope"), None);
        assert_eq!(frame.source_value("cpu.temp"), None);
    }
}
