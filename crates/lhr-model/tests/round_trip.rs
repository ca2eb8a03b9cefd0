//! Lossless round trips through both wire forms.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lhr_model::{
    from_binary, from_json, to_binary, to_json, validate_structure, AuditRef, AuditResult,
    CategoryGroup, ConfigSettings, DecodeError, EmulatedFormFactor, Environment, FormFactor,
    GatherMode, I18n, IcuMessagePath, Lhr, LhrBuilder, LhrCategory, LhrEntity, LhrErrorCode,
    LhrValue, MetricSavings, Nullable, NullableF64, PerformanceEntry, RendererFormattedStrings,
    RuntimeError, ScoreDisplayMode, ScoreReading, ScoringOptions, StackPack, Timing,
};
use serde_json::json;

fn fetched() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T12:00:00.123456789Z")
        .expect("parse RFC3339")
        .with_timezone(&Utc)
}

fn assert_round_trips(lhr: &Lhr) {
    let json = to_json(lhr).expect("encode json");
    assert_eq!(&from_json(&json).expect("decode json"), lhr);

    let bytes = to_binary(lhr).expect("encode binary");
    assert_eq!(&from_binary(&bytes).expect("decode binary"), lhr);
}

fn rich_record() -> Lhr {
    let mut details = serde_json::Map::new();
    details.insert("type".into(), json!("table"));
    details.insert("items".into(), json!([{ "url": "https://example.com/app.js", "wastedMs": 120 }]));

    let mut builder = LhrBuilder::new("https://example.com/", "12.1.0", fetched())
        .with_final_url("https://www.example.com/")
        .with_main_document_url("https://www.example.com/")
        .with_final_displayed_url("https://www.example.com/#top")
        .with_user_agent("Mozilla/5.0 (legacy)")
        .with_environment(Environment {
            network_user_agent: Nullable::Value("Mozilla/5.0 (network)".into()),
            host_user_agent: Nullable::Value("Mozilla/5.0 (host)".into()),
            benchmark_index: NullableF64::Value(1523.5),
            credits: Nullable::Value(BTreeMap::from([(
                "axe-core".to_string(),
                "4.8.1".to_string(),
            )])),
        })
        .with_config_settings(ConfigSettings {
            emulated_form_factor: EmulatedFormFactor::Mobile,
            form_factor: FormFactor::Mobile,
            locale: Nullable::Value("en-US".into()),
            only_categories: Some(LhrValue::string_list(["performance", "seo"])),
            channel: Nullable::Value("cli".into()),
        })
        .with_i18n(I18n {
            renderer_formatted_strings: Nullable::Value(RendererFormattedStrings {
                error_label: Nullable::Value("Error!".into()),
                runtime_settings_ua: Nullable::Value("User agent (host)".into()),
                warning_header: Nullable::Null,
                ..RendererFormattedStrings::default()
            }),
            icu_message_paths: Nullable::Value(BTreeMap::from([(
                "core/audits/viewport.js | title".to_string(),
                vec![IcuMessagePath {
                    path: "audits.viewport.title".into(),
                    values: Nullable::Value(BTreeMap::from([(
                        "count".to_string(),
                        LhrValue::UInt(2),
                    )])),
                }],
            )])),
        })
        .with_timing(
            Timing::new(8123.456)
                .with_entry(PerformanceEntry::measure("lh:runner:run", 0.25, 8123.456)),
        )
        .with_gather_mode(GatherMode::Navigation)
        .with_full_page_screenshot(LhrValue::Null);

    let mut lcp = AuditResult::scored("largest-contentful-paint", ScoreDisplayMode::Numeric, 0.5)
        .with_title("Largest Contentful Paint")
        .with_display_value("2.4 s")
        .with_numeric_value(2412.123456789, "millisecond");
    lcp.scoring_options = Nullable::Value(ScoringOptions {
        p10: NullableF64::Value(2500.0),
        median: NullableF64::Value(4000.0),
    });
    lcp.guidance_level = Nullable::Value(3);
    lcp.explanation = Nullable::Null;

    builder
        .add_audit(lcp)
        .add_audit(
            AuditResult::scored("unused-javascript", ScoreDisplayMode::MetricSavings, 0.1 + 0.2)
                .with_details(details)
                .with_metric_savings(MetricSavings {
                    lcp: NullableF64::Value(150.0),
                    fcp: NullableF64::Null,
                    ..MetricSavings::default()
                })
                .with_warnings(["Unable to fetch source map for app.js"]),
        )
        .add_audit(AuditResult::unscored("viewport", ScoreDisplayMode::NotApplicable))
        .add_audit(AuditResult::errored("font-size", "Gatherer failed").with_title("Font size"))
        .add_group(CategoryGroup::new("metrics", "Metrics"))
        .add_category(
            LhrCategory::new("performance", "Performance")
                .with_ref(
                    AuditRef::new("largest-contentful-paint", 25.0)
                        .in_group("metrics")
                        .with_acronym("LCP"),
                )
                .with_ref(AuditRef::new("unused-javascript", 0.0))
                .with_supported_modes(vec![GatherMode::Navigation, GatherMode::Timespan]),
        )
        .add_category(
            LhrCategory::new("seo", "SEO")
                .with_ref(AuditRef::new("viewport", 1.0))
                .with_ref(AuditRef::new("font-size", 1.0)),
        )
        .add_entity(
            LhrEntity::new("Example")
                .first_party()
                .with_origin("https://www.example.com"),
        )
        .add_stack_pack(StackPack {
            id: "react".into(),
            title: Nullable::Value("React".into()),
            icon_data_url: Nullable::Value("data:image/svg+xml;base64,PHN2Zz4=".into()),
            descriptions: Nullable::Value(BTreeMap::from([(
                "unused-javascript".to_string(),
                "Consider code splitting.".to_string(),
            )])),
        })
        .add_run_warning("The page loaded too slowly to finish within the time limit.");
    builder.finish()
}

// ── Whole records ───────────────────────────────────────────────────────

#[test]
fn rich_record_round_trips_through_both_forms() {
    let lhr = rich_record();
    assert_eq!(
        lhr.category_score("performance"),
        ScoreReading::Authoritative(0.5)
    );
    assert_eq!(lhr.categories["seo"].score, NullableF64::Null);
    assert_round_trips(&lhr);
}

#[test]
fn digest_is_equal_across_forms() {
    let lhr = rich_record();
    let via_json = from_json(&to_json(&lhr).expect("json")).expect("decode json");
    let via_binary = from_binary(&to_binary(&lhr).expect("binary")).expect("decode binary");
    assert_eq!(
        via_json.digest().expect("digest"),
        via_binary.digest().expect("digest")
    );
}

#[test]
fn dns_failure_with_empty_maps() {
    let mut builder = LhrBuilder::new("https://no-such-host.invalid/", "12.1.0", fetched());
    builder.fail(RuntimeError::new(
        LhrErrorCode::DnsFailure,
        "DNS servers could not resolve the provided domain.",
    ));
    let lhr = builder.finish();

    assert!(lhr.audits.is_empty());
    assert!(lhr.categories.is_empty());
    assert!(lhr.timing.entries.items().is_empty());
    assert!(!lhr.is_authoritative());
    assert_eq!(lhr.category_score("performance").value(), None);
    assert!(validate_structure(&lhr).is_sound());

    assert_round_trips(&lhr);
    let decoded = from_json(&to_json(&lhr).expect("json")).expect("decode");
    assert_eq!(
        decoded.runtime_error.value().map(|e| e.code),
        Some(LhrErrorCode::DnsFailure)
    );
}

// ── Nullable fields ─────────────────────────────────────────────────────

#[test]
fn metric_savings_with_only_cls() {
    let mut lhr = Lhr::new("https://example.com/", "12.1.0", fetched());
    lhr.audits.insert(
        "layout-shifts".into(),
        AuditResult::scored("layout-shifts", ScoreDisplayMode::MetricSavings, 0.9)
            .with_metric_savings(MetricSavings {
                cls: NullableF64::Value(0.05),
                ..MetricSavings::default()
            }),
    );

    let json = to_json(&lhr).expect("encode");
    let doc: serde_json::Value = serde_json::from_str(&json).expect("parse");
    assert_eq!(
        doc["audits"]["layout-shifts"]["metric_savings"],
        json!({ "cls": 0.05 })
    );

    assert_round_trips(&lhr);
    let savings = from_json(&json)
        .expect("decode")
        .audits["layout-shifts"]
        .metric_savings
        .clone()
        .into_value()
        .expect("savings");
    assert_eq!(savings.present_count(), 1);
    assert_eq!(savings.lcp, NullableF64::Absent);
}

#[test]
fn absent_null_and_value_stay_distinct() {
    let mut lhr = Lhr::new("https://example.com/", "12.1.0", fetched());
    let mut absent = AuditResult::unscored("absent", ScoreDisplayMode::Informative);
    absent.score = NullableF64::Absent;
    lhr.audits.insert("absent".into(), absent);
    lhr.audits.insert(
        "null".into(),
        AuditResult::unscored("null", ScoreDisplayMode::Manual),
    );
    lhr.audits.insert(
        "value".into(),
        AuditResult::scored("value", ScoreDisplayMode::Binary, 0.0),
    );
    lhr.environment.benchmark_index = NullableF64::Null;
    lhr.config_settings.only_categories = Some(LhrValue::Null);

    assert_round_trips(&lhr);

    let decoded = from_binary(&to_binary(&lhr).expect("binary")).expect("decode");
    assert_eq!(decoded.audits["absent"].score, NullableF64::Absent);
    assert_eq!(decoded.audits["null"].score, NullableF64::Null);
    assert_eq!(decoded.audits["value"].score, NullableF64::Value(0.0));
    assert_eq!(decoded.environment.benchmark_index, NullableF64::Null);
    assert_eq!(decoded.config_settings.only_categories, Some(LhrValue::Null));
    assert_eq!(decoded.full_page_screenshot, None);
}

#[test]
fn warnings_absent_versus_empty_list() {
    let mut lhr = Lhr::new("https://example.com/", "12.1.0", fetched());
    lhr.audits.insert(
        "none".into(),
        AuditResult::scored("none", ScoreDisplayMode::Binary, 1.0),
    );
    lhr.audits.insert(
        "empty".into(),
        AuditResult::scored("empty", ScoreDisplayMode::Binary, 1.0)
            .with_warnings(Vec::<String>::new()),
    );

    let decoded = from_json(&to_json(&lhr).expect("json")).expect("decode");
    assert_eq!(decoded.audits["none"].warnings, None);
    assert_eq!(decoded.audits["empty"].warnings, Some(LhrValue::List(vec![])));
}

// ── Wire documents re-encode as they arrived ────────────────────────────

fn sparse_document() -> serde_json::Value {
    json!({
        "fetch_time": "2026-03-01T12:00:00Z",
        "requested_url": "https://example.com/",
        "final_url": "https://example.com/",
        "tool_version": "12.1.0",
        "user_agent": "",
        "runtime_error": null,
        "environment": { "host_user_agent": null, "benchmark_index": 1523.5 },
        "audits": {
            "viewport": {
                "id": "viewport",
                "score": 1.0,
                "score_display_mode": "BINARY",
                "display_value": null,
                "explanation": null,
                "error_message": null,
                "details": null,
                "numeric_unit": null,
                "error_stack": null
            },
            "bare": { "id": "bare" }
        },
        "categories": {
            "seo": {
                "id": "seo",
                "score": null,
                "audit_refs": [{ "id": "viewport", "weight": 1.0, "group": null }]
            },
            "untitled": { "id": "untitled" }
        },
        "category_groups": { "metrics": { "title": "Metrics" } },
        "config_settings": { "locale": null },
        "i18n": { "renderer_formatted_strings": { "error_label": null } },
        "timing": { "total": 12.5 },
        "entities": [{ "name": "Example", "homepage": null, "origins": [] }]
    })
}

#[test]
fn sparse_document_reencodes_unchanged() {
    let doc = sparse_document();
    let lhr = from_json(&doc.to_string()).expect("decode");

    assert_eq!(lhr.user_agent, Nullable::Value(String::new()));
    assert!(lhr.runtime_error.is_null());
    assert!(lhr.run_warnings.is_absent());
    assert!(lhr.audits["viewport"].display_value.is_null());
    assert!(lhr.audits["bare"].title.is_absent());
    assert_eq!(lhr.gather_mode, GatherMode::Unspecified);

    let json: serde_json::Value =
        serde_json::from_str(&to_json(&lhr).expect("encode json")).expect("parse");
    assert_eq!(json, doc);

    let via_binary = from_binary(&to_binary(&lhr).expect("encode binary")).expect("decode");
    let json: serde_json::Value =
        serde_json::from_str(&to_json(&via_binary).expect("encode json")).expect("parse");
    assert_eq!(json, doc);
}

#[test]
fn integers_in_opaque_values_keep_their_spelling() {
    let mut doc = sparse_document();
    doc["config_settings"]["only_categories"] = json!(null);
    doc["audits"]["viewport"]["warnings"] = json!([1, -2, 9007199254740993u64, 0.5]);

    let lhr = from_json(&doc.to_string()).expect("decode");
    assert_eq!(
        lhr.audits["viewport"].warnings,
        Some(LhrValue::List(vec![
            LhrValue::UInt(1),
            LhrValue::Int(-2),
            LhrValue::UInt(9_007_199_254_740_993),
            LhrValue::Number(0.5),
        ]))
    );

    let text = to_json(&lhr).expect("encode");
    assert!(text.contains("[1,-2,9007199254740993,0.5]"));
    assert_eq!(serde_json::from_str::<serde_json::Value>(&text).expect("parse"), doc);
}

// ── Enum compatibility on the wire ──────────────────────────────────────

#[test]
fn legacy_spellings_decode_and_reencode_canonically() {
    let mut doc = serde_json::to_value(Lhr::new("https://example.com/", "9.6.0", fetched()))
        .expect("to_value");
    doc["audits"] = json!({
        "a": { "id": "a", "score": null, "score_display_mode": "not-applicable" },
        "b": { "id": "b", "score": null, "score_display_mode": "NOT_AVAILABLE" },
        "c": { "id": "c", "score": 1, "score_display_mode": "binary" }
    });
    doc["config_settings"] = json!({ "emulated_form_factor": "MOBILE", "form_factor": "desktop" });
    doc["gather_mode"] = json!("navigation");

    let lhr = from_json(&doc.to_string()).expect("decode");
    assert_eq!(lhr.audits["a"].score_display_mode, ScoreDisplayMode::NotApplicable);
    assert_eq!(lhr.audits["b"].score_display_mode, ScoreDisplayMode::NotApplicable);
    assert_eq!(lhr.audits["c"].score_display_mode, ScoreDisplayMode::Binary);
    assert_eq!(lhr.config_settings.emulated_form_factor, EmulatedFormFactor::Mobile);
    assert_eq!(lhr.config_settings.form_factor, FormFactor::Desktop);
    assert_eq!(lhr.gather_mode, GatherMode::Navigation);

    let out: serde_json::Value =
        serde_json::from_str(&to_json(&lhr).expect("encode")).expect("parse");
    assert_eq!(out["audits"]["a"]["score_display_mode"], "NOT_APPLICABLE");
    assert_eq!(out["audits"]["b"]["score_display_mode"], "NOT_APPLICABLE");
    assert_eq!(out["config_settings"]["emulated_form_factor"], "mobile");
    assert_eq!(out["config_settings"]["form_factor"], "DESKTOP");
    assert_eq!(out["gather_mode"], "NAVIGATION");
}

#[test]
fn unknown_symbols_decode_to_unspecified() {
    let mut doc = serde_json::to_value(Lhr::new("https://example.com/", "99.0.0", fetched()))
        .expect("to_value");
    doc["audits"] = json!({ "x": { "id": "x", "score_display_mode": "SPARKLY" } });
    doc["gather_mode"] = json!("TELEPATHY");
    doc["config_settings"] = json!({ "form_factor": "WATCH" });
    doc["runtime_error"] = json!({ "code": "SOLAR_FLARE", "message": "" });

    let lhr = from_json(&doc.to_string()).expect("unknown symbols never fail decode");
    assert_eq!(lhr.audits["x"].score_display_mode, ScoreDisplayMode::Unspecified);
    assert_eq!(lhr.gather_mode, GatherMode::Unspecified);
    assert_eq!(lhr.config_settings.form_factor, FormFactor::UnknownFormFactor);
    assert_eq!(
        lhr.runtime_error.value().map(|e| e.code),
        Some(LhrErrorCode::UnknownError)
    );
    assert!(!lhr.is_authoritative());
}

// ── Decode failures ─────────────────────────────────────────────────────

#[test]
fn missing_required_field_fails_in_both_forms() {
    let mut doc = serde_json::to_value(Lhr::new("https://example.com/", "12.1.0", fetched()))
        .expect("to_value");
    if let Some(root) = doc.as_object_mut() {
        root.remove("category_groups");
    }

    let err = from_json(&doc.to_string()).unwrap_err();
    assert_eq!(err.field_path(), Some("category_groups"));

    let bytes = lhr_model::codec::binary::encode_document(&doc, lhr_model::SCHEMA_VERSION);
    let err = from_binary(&bytes).unwrap_err();
    assert!(matches!(err, DecodeError::MissingField { ref path } if path == "category_groups"));
}

#[test]
fn missing_audit_id_reports_path() {
    let mut doc = serde_json::to_value(Lhr::new("https://example.com/", "12.1.0", fetched()))
        .expect("to_value");
    doc["audits"] = json!({ "viewport": { "score": 1, "score_display_mode": "BINARY" } });

    let err = from_json(&doc.to_string()).unwrap_err();
    assert_eq!(err.field_path(), Some("audits.viewport.id"));
}

#[test]
fn json_payload_is_not_binary() {
    let json = to_json(&Lhr::new("https://example.com/", "12.1.0", fetched())).expect("json");
    let err = from_binary(json.as_bytes()).unwrap_err();
    assert!(matches!(err, DecodeError::BadMagic));
}

#[test]
fn auto_detect_picks_the_right_form() {
    let lhr = rich_record();
    let json = lhr_model::encode(&lhr, lhr_model::WireFormat::Json).expect("json");
    let binary = lhr_model::encode(&lhr, lhr_model::WireFormat::Binary).expect("binary");
    assert_eq!(lhr_model::decode(&json).expect("decode json"), lhr);
    assert_eq!(lhr_model::decode(&binary).expect("decode binary"), lhr);
}
