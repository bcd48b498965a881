#[cfg(test)]
mod tests {
    use std::{
        env, fs,
        path::{Path, PathBuf},
        process,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        thread,
        time::{Duration, SystemTime, UNIX_EPOCH},
    };

    use crossbeam_channel::{Receiver, Sender, bounded};
    use tokio::sync::mpsc;

    use crate::{
        ConfigLoader, Error, HostProbe, HudConfig, ReloadOutcome, load_validated,
        resolve_config_path, spawn_reload_task,
    };

    /// Every font and file exists.
    struct OpenHost;

    impl HostProbe for OpenHost {
        fn font_available(&self, _family: &str) -> bool {
            true
        }

        fn file_exists(&self, _path: &Path) -> bool {
            true
        }
    }

    /// Blocks inside the first `file_exists` call until released.
    struct GatedHost {
        /// Set once the first lookup has started.
        armed: AtomicBool,
        /// Signalled when the first lookup is waiting.
        entered: Sender<()>,
        /// Lets the first lookup finish.
        release: Receiver<()>,
    }

    impl HostProbe for GatedHost {
        fn font_available(&self, _family: &str) -> bool {
            true
        }

        fn file_exists(&self, _path: &Path) -> bool {
            if !self.armed.swap(true, Ordering::SeqCst) {
                self.entered.send(()).unwrap();
                self.release.recv().unwrap();
            }
            true
        }
    }

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

    fn loader_with(name: &str, script: &str) -> (ConfigLoader, PathBuf) {
        let dir = unique_tmp_dir(name);
        let path = dir.join("config.rhai");
        fs::write(&path, script).expect("write config");
        (ConfigLoader::with_probe(&path, OpenHost), path)
    }

    const VALID: &str = r#"
        config(#{ fontSize: 14 });
        widget(#{ type: "text", text: "CPU ${cpu.usage}%" });
    "#;

    #[test]
    fn typo_on_second_reload_keeps_first_config() {
        let (loader, path) = loader_with("typo", VALID);
        assert!(matches!(loader.reload(), ReloadOutcome::Applied { .. }));
        let first = loader.current().expect("config");
        assert_eq!(first.font_size, 14.0);

        fs::write(&path, "config(#{ fontSize: 20 });\nwidget(#{ type: \"text\" \n").unwrap();
        match loader.reload() {
            ReloadOutcome::ScriptFailed {
                error: Error::Parse { .. },
                used_default: false,
            } => {}
            other => panic!("unexpected outcome: {other:?}"),
        }
        let active = loader.current().expect("config");
        assert!(Arc::ptr_eq(&first, &active));
        assert_eq!(loader.generation(), 2);
    }

    #[test]
    fn fatal_validation_keeps_previous_config() {
        let (loader, path) = loader_with("invalid-second", VALID);
        assert!(loader.reload().applied());

        fs::write(&path, r#"config(#{ updateInterval: 0, fontSize: 30 });"#).unwrap();
        let ReloadOutcome::KeptPrevious { diagnostics } = loader.reload() else {
            panic!("expected the previous config to stay active");
        };
        assert_eq!(diagnostics[0].path, "updateInterval");
        let active = loader.current().unwrap();
        assert_eq!(active.font_size, 14.0);
        assert!(loader.diagnostics().is_empty());
    }

    #[test]
    fn first_invalid_config_is_adopted() {
        let (loader, path) = loader_with(
            "invalid-first",
            r#"widget(#{ type: "bar", source: "", width: 0 });"#,
        );
        let outcome = loader.reload();
        assert!(matches!(outcome, ReloadOutcome::AdoptedWithErrors { .. }));
        assert!(outcome.applied());
        assert_eq!(loader.current().unwrap().widgets.len(), 1);
        assert_eq!(loader.diagnostics().len(), 2);

        fs::write(&path, VALID).unwrap();
        assert!(matches!(loader.reload(), ReloadOutcome::Applied { .. }));
        assert!(loader.diagnostics().is_empty());
    }

    #[test]
    fn first_script_failure_uses_defaults() {
        let (loader, _path) = loader_with("broken-first", "this is not a script (");
        assert!(loader.current().is_none());
        match loader.reload() {
            ReloadOutcome::ScriptFailed {
                used_default: true, ..
            } => {}
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(*loader.current().unwrap(), HudConfig::default());
    }

    #[test]
    fn warnings_are_reported_and_applied() {
        let (loader, _path) = loader_with("warnings", r#"config(#{ updateInterval: 0.05 });"#);
        let ReloadOutcome::Applied { warnings } = loader.reload() else {
            panic!("expected applied");
        };
        assert_eq!(warnings.len(), 1);
        assert_eq!(loader.current().unwrap().update_interval, 0.05);
    }

    #[test]
    fn slower_older_reload_does_not_replace_newer() {
        let dir = unique_tmp_dir("overlap");
        let path = dir.join("config.rhai");
        fs::write(
            &path,
            r#"
            config(#{ fontSize: 11 });
            widget(#{ type: "image", path: "/icons/logo.png" });
            "#,
        )
        .unwrap();
        let (entered_tx, entered_rx) = bounded(1);
        let (release_tx, release_rx) = bounded(1);
        let host = GatedHost {
            armed: AtomicBool::new(false),
            entered: entered_tx,
            release: release_rx,
        };
        let loader = Arc::new(ConfigLoader::with_probe(&path, host));

        let slow = {
            let loader = loader.clone();
            thread::spawn(move || loader.reload())
        };
        entered_rx.recv().unwrap();

        fs::write(&path, r#"config(#{ fontSize: 22 });"#).unwrap();
        assert!(matches!(loader.reload(), ReloadOutcome::Applied { .. }));
        assert_eq!(loader.current().unwrap().font_size, 22.0);

        release_tx.send(()).unwrap();
        let first = slow.join().unwrap();
        assert!(matches!(first, ReloadOutcome::Superseded));
        assert!(!first.applied());
        let active = loader.current().unwrap();
        assert_eq!(active.font_size, 22.0);
        assert!(active.widgets.is_empty());
        assert_eq!(loader.generation(), 2);
    }

    #[test]
    fn missing_file_and_bad_extension_are_read_errors() {
        let dir = unique_tmp_dir("read-errors");
        let missing = load_validated(&dir.join("none.rhai"), &OpenHost).unwrap_err();
        assert!(matches!(missing, Error::Read { .. }));

        let toml = dir.join("config.toml");
        fs::write(&toml, VALID).unwrap();
        let err = load_validated(&toml, &OpenHost).unwrap_err();
        assert!(err.to_string().contains("Unsupported config format"));
        assert_eq!(err.path(), Some(toml.as_path()));

        let js = dir.join("config.js");
        fs::write(&js, "config({ fontSize: 9 });").unwrap();
        assert_eq!(load_validated(&js, &OpenHost).unwrap().config.font_size, 9.0);
    }

    #[test]
    fn explicit_config_path_wins() {
        let explicit = Path::new("/somewhere/custom.rhai");
        assert_eq!(
            resolve_config_path(Some(explicit)).unwrap(),
            explicit.to_path_buf()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_events_reloads_once() {
        let (loader, _path) = loader_with("burst", VALID);
        let loader = Arc::new(loader);
        let (tx, rx) = mpsc::channel(8);
        let (handle, mut outcomes) =
            spawn_reload_task(loader.clone(), rx, Duration::from_millis(100));

        for _ in 0..5 {
            tx.send(()).await.unwrap();
        }
        let outcome = outcomes.recv().await.expect("outcome");
        assert!(matches!(outcome, ReloadOutcome::Applied { .. }));
        assert_eq!(loader.generation(), 1);

        drop(tx);
        handle.await.unwrap();
        assert!(outcomes.recv().await.is_none());
        assert_eq!(loader.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_reload_separately() {
        let (loader, path) = loader_with("bursts", VALID);
        let loader = Arc::new(loader);
        let (tx, rx) = mpsc::channel(8);
        let (handle, mut outcomes) =
            spawn_reload_task(loader.clone(), rx, Duration::from_millis(100));

        tx.send(()).await.unwrap();
        assert!(outcomes.recv().await.unwrap().applied());

        fs::write(&path, "widget(#{ type: \"text\" ").unwrap();
        tx.send(()).await.unwrap();
        tx.send(()).await.unwrap();
        assert!(matches!(
            outcomes.recv().await.unwrap(),
            ReloadOutcome::ScriptFailed {
                used_default: false,
                ..
            }
        ));
        assert_eq!(loader.current().unwrap().font_size, 14.0);
        assert_eq!(loader.generation(), 2);

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn closing_mid_burst_still_reloads() {
        let (loader, _path) = loader_with("close", VALID);
        let loader = Arc::new(loader);
        let (tx, rx) = mpsc::channel(8);
        let (handle, mut outcomes) = spawn_reload_task(loader.clone(), rx, Duration::from_secs(10));

        tx.send(()).await.unwrap();
        drop(tx);
        assert!(outcomes.recv().await.unwrap().applied());
        handle.await.unwrap();
        assert_eq!(loader.generation(), 1);
    }
}
