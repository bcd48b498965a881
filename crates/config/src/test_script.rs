#[cfg(test)]
mod tests {
    use crate::{
        Anchor, Error, HudConfig, Point, Size, WidgetKind, WidgetSpec, defaults, load_from_str,
    };

    fn load(script: &str) -> Result<HudConfig, Error> {
        load_from_str(script, None)
    }

    fn only_widget(cfg: &HudConfig) -> &WidgetSpec {
        assert_eq!(cfg.widgets.len(), 1, "expected exactly one widget");
        &cfg.widgets[0]
    }

    #[test]
    fn empty_script_yields_defaults() {
        let cfg = load("").unwrap();
        assert_eq!(cfg, HudConfig::default());
        assert_eq!(cfg.position, Point::new(50.0, 100.0));
        assert_eq!(cfg.font, "SF Mono");
        assert_eq!(cfg.update_interval, 1.0);
        assert!(!cfg.enable_shell_commands);
    }

    #[test]
    fn config_sets_globals() {
        let cfg = load(
            r##"
            config(#{
                position: #{ x: 10, y: 20.5 },
                font: "Menlo",
                fontSize: 14,
                color: "#00FF00",
                updateInterval: 2.5,
                enablePublicIP: true,
                enableFileReading: true,
                enableShellCommands: true,
                display: 1,
                anchor: "bottomRight",
                dateFormat: "%d/%m",
                timeFormat: "%H:%M",
                datetimeFormat: "%c",
                networkInterface: "en0",
            });
            "##,
        )
        .unwrap();
        assert_eq!(cfg.position, Point::new(10.0, 20.5));
        assert_eq!(cfg.font, "Menlo");
        assert_eq!(cfg.font_size, 14.0);
        assert_eq!(cfg.color, "#00FF00");
        assert_eq!(cfg.update_interval, 2.5);
        assert!(cfg.enable_public_ip && cfg.enable_file_reading && cfg.enable_shell_commands);
        assert_eq!(cfg.display_index, 1);
        assert_eq!(cfg.anchor, Anchor::BottomRight);
        assert_eq!(cfg.date_format.as_deref(), Some("%d/%m"));
        assert_eq!(cfg.time_format.as_deref(), Some("%H:%M"));
        assert_eq!(cfg.datetime_format.as_deref(), Some("%c"));
        assert_eq!(cfg.network_interface.as_deref(), Some("en0"));
    }

    #[test]
    fn js_object_literals_are_accepted() {
        let cfg = load(
            r#"
            // Written the way the overlay's sample configs are.
            var accent = '#FF8800';
            config({ fontSize: 13, anchor: 'topRight' });
            widget({ type: 'text', text: 'CPU ${cpu.usage}%', position: { x: 1, y: 2 }, color: accent });
            widget({ type: "hr", condition: "battery.status !== 'Charging'" });
            "#,
        )
        .unwrap();
        assert_eq!(cfg.font_size, 13.0);
        assert_eq!(cfg.anchor, Anchor::TopRight);
        let WidgetSpec::Text(text) = &cfg.widgets[0] else {
            panic!("expected text widget");
        };
        assert_eq!(text.text, "CPU ${cpu.usage}%");
        assert_eq!(text.position, Point::new(1.0, 2.0));
        assert_eq!(text.color.as_deref(), Some("#FF8800"));
        // Strings inside the script are untouched by the compatibility pass.
        assert_eq!(
            cfg.widgets[1].condition(),
            Some("battery.status !== 'Charging'")
        );
    }

    #[test]
    fn namespaced_calls_match_free_functions() {
        let cfg = load(
            r#"
            hud.config(#{ fontSize: 18 });
            hud.widget(#{ type: "bar", source: "cpu.usage" });
            widget(#{ type: "bar", source: "memory.percent" });
            "#,
        )
        .unwrap();
        assert_eq!(cfg.font_size, 18.0);
        let sources: Vec<_> = cfg.widgets.iter().filter_map(WidgetSpec::source).collect();
        assert_eq!(sources, ["cpu.usage", "memory.percent"]);
    }

    #[test]
    fn widget_defaults() {
        let cfg = load(
            r#"
            widget(#{ type: "graph", source: "cpu.usage" });
            widget(#{ type: "bar", source: "cpu.usage" });
            widget(#{ type: "hr" });
            widget(#{ type: "gauge", source: "cpu.usage" });
            widget(#{ type: "image", path: "sf:cpu" });
            widget(#{ type: "text" });
            "#,
        )
        .unwrap();
        let kinds: Vec<_> = cfg.widgets.iter().map(WidgetSpec::kind).collect();
        assert_eq!(
            kinds,
            [
                WidgetKind::Graph,
                WidgetKind::Bar,
                WidgetKind::Hr,
                WidgetKind::Gauge,
                WidgetKind::Image,
                WidgetKind::Text,
            ]
        );
        let WidgetSpec::Graph(g) = &cfg.widgets[0] else { panic!() };
        assert_eq!(g.size, Size::new(200.0, 50.0));
        assert_eq!(g.position, Point::default());
        let WidgetSpec::Bar(b) = &cfg.widgets[1] else { panic!() };
        assert_eq!((b.width, b.height), (100.0, 10.0));
        let WidgetSpec::Hr(h) = &cfg.widgets[2] else { panic!() };
        assert_eq!((h.width, h.height), (defaults::HR_WIDTH, 1.0));
        let WidgetSpec::Gauge(gauge) = &cfg.widgets[3] else { panic!() };
        assert_eq!(
            (gauge.radius, gauge.thickness, gauge.start_angle, gauge.end_angle),
            (40.0, 8.0, 135.0, 405.0)
        );
        let WidgetSpec::Image(img) = &cfg.widgets[4] else { panic!() };
        assert_eq!(img.size, None);
        let WidgetSpec::Text(t) = &cfg.widgets[5] else { panic!() };
        assert_eq!(t.text, "");
        assert!(t.shadow.is_none() && t.weight.is_none() && t.condition.is_none());
    }

    #[test]
    fn text_style_fields() {
        let cfg = load(
            r##"
            widget(#{
                type: "text",
                text: "hi",
                bold: true,
                italic: true,
                opacity: 0.5,
                align: "center",
                shadow: #{ color: "#111111", blur: 4 },
            });
            "##,
        )
        .unwrap();
        let WidgetSpec::Text(t) = only_widget(&cfg) else {
            panic!("expected text widget");
        };
        assert_eq!(t.weight.as_deref(), Some("bold"));
        assert!(t.italic);
        assert_eq!(t.opacity, Some(0.5));
        assert_eq!(t.align.as_deref(), Some("center"));
        let shadow = t.shadow.as_ref().unwrap();
        assert_eq!(shadow.color, "#111111");
        assert_eq!((shadow.offset_x, shadow.offset_y, shadow.blur), (1.0, 1.0, 4.0));
    }

    #[test]
    fn wrong_types_fall_back_to_defaults() {
        let cfg = load(
            r#"
            config(#{ fontSize: "big", updateInterval: true, anchor: 3 });
            widget(#{ type: "gauge", source: 42, radius: "wide", position: "here" });
            "#,
        )
        .unwrap();
        assert_eq!(cfg.font_size, 12.0);
        assert_eq!(cfg.update_interval, 1.0);
        assert_eq!(cfg.anchor, Anchor::TopLeft);
        let WidgetSpec::Gauge(g) = only_widget(&cfg) else {
            panic!("expected gauge");
        };
        assert_eq!(g.source, "42");
        assert_eq!(g.radius, 40.0);
        assert_eq!(g.position, Point::default());
    }

    #[test]
    fn non_map_arguments_are_empty_options() {
        let cfg = load(
            r#"
            config(5);
            config();
            widget("text");
            widget(());
            "#,
        );
        // `config()` with no argument is not a registered signature.
        assert!(cfg.is_err());

        let cfg = load("config(5); widget(\"text\"); widget(());").unwrap();
        assert_eq!(cfg, HudConfig::default());
    }

    #[test]
    fn unknown_or_missing_type_is_skipped() {
        let cfg = load(
            r#"
            widget(#{ type: "sparkline", source: "cpu.usage" });
            widget(#{ source: "cpu.usage" });
            widget(#{ type: "Text", text: "case matters" });
            widget(#{ type: "text", text: "kept" });
            "#,
        )
        .unwrap();
        let WidgetSpec::Text(t) = only_widget(&cfg) else {
            panic!("expected text widget");
        };
        assert_eq!(t.text, "kept");
    }

    #[test]
    fn repeated_config_calls_merge() {
        let cfg = load(
            r#"
            config(#{ font: "Menlo", position: #{ x: 5 } });
            config(#{ fontSize: 20 });
            "#,
        )
        .unwrap();
        assert_eq!(cfg.font, "Menlo");
        assert_eq!(cfg.font_size, 20.0);
        assert_eq!(cfg.position, Point::new(5.0, 100.0));
    }

    #[test]
    fn bad_anchor_and_negative_display_are_clamped() {
        let cfg = load(r#"config(#{ anchor: "middle", display: -2 });"#).unwrap();
        assert_eq!(cfg.anchor, Anchor::TopLeft);
        assert_eq!(cfg.display_index, 0);
    }

    #[test]
    fn widgets_keep_declaration_order() {
        let cfg = load(
            r#"
            for i in 0..5 {
                widget(#{ type: "text", text: `row ${i}`, position: #{ x: 0, y: i * 10 } });
            }
            "#,
        )
        .unwrap();
        let ys: Vec<_> = cfg.widgets.iter().map(|w| w.position().y).collect();
        assert_eq!(ys, [0.0, 10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn syntax_error_reports_location() {
        let err = load("config(#{ fontSize: 12 });\nwidget(#{ type: \"text\" ;\n").unwrap_err();
        match &err {
            Error::Parse { line, excerpt, .. } => {
                assert_eq!(*line, 2);
                assert!(excerpt.contains('^'));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(err.pretty().contains("line 2"));
    }

    #[test]
    fn runtime_error_fails_the_load() {
        let err = load(
            r#"
            widget(#{ type: "text", text: "before" });
            let x = undefined_function();
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn runaway_script_is_stopped() {
        let err = load("loop { }").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn imports_are_rejected() {
        assert!(load(r#"import "other" as o;"#).is_err());
    }

    #[test]
    fn loads_do_not_share_state() {
        let first = load(
            r#"
            let marker = 1;
            config(#{ fontSize: 30 });
            widget(#{ type: "hr" });
            "#,
        )
        .unwrap();
        assert_eq!(first.widgets.len(), 1);

        let second = load("widget(#{ type: \"hr\" });").unwrap();
        assert_eq!(second.widgets.len(), 1);
        assert_eq!(second.font_size, 12.0);

        // Variables from an earlier load are gone.
        assert!(load("config(#{ fontSize: marker });").is_err());
    }

    #[test]
    fn print_does_not_fail_the_load() {
        let cfg = load(r#"print("hello"); debug("there"); widget(#{ type: "hr" });"#).unwrap();
        assert_eq!(cfg.widgets.len(), 1);
    }
}
