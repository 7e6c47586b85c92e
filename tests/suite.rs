// Integration suite for the capability verifiers: library checks against the
// shipped ALSA fixtures, ancestry and instance-mode discovery, and the
// surface-check binary end to end.
mod support;

use anyhow::Result;
use binding_surface::{
    AncestorDescriptor, CapabilityKind, CapabilityName, Expectation, ObjectInstance, SignalRegistry,
    SurfaceRepository, Target, TypeName, TypeSurface, Verifier, audit_object, check_object,
    load_checks_from_path, verify_enumerations, verify_object, verify_struct,
};
use serde_json::{Value, json};
use std::io::Write;
use support::{
    alsa_repository, fixture, repo_root, run_surface_check, run_surface_check_with_schema,
    stdout_lines,
};
use tempfile::NamedTempFile;

fn demo_thing() -> TypeSurface {
    TypeSurface::new("Demo.Thing")
        .with_methods(["do_thing", "get_value"])
        .with_ancestor(AncestorDescriptor::class("Demo.Thing").with_properties(["value"]))
}

fn capture(run: impl FnOnce(&mut Verifier<Vec<u8>>) -> bool) -> (bool, Vec<String>) {
    let mut verifier = Verifier::new(Vec::new());
    let passed = run(&mut verifier);
    let text = String::from_utf8(verifier.into_inner()).expect("diagnostics are utf-8");
    (passed, text.lines().map(str::to_string).collect())
}

fn json_file(value: &Value) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    serde_json::to_writer(&mut file, value)?;
    file.flush()?;
    Ok(file)
}

#[test]
fn object_check_scenario_from_plain_type() {
    let surface = demo_thing();
    assert!(verify_object(
        Target::Type(&surface),
        &["value"],
        &["do_thing"],
        &[],
        &[]
    ));
    assert!(!verify_object(
        Target::Type(&surface),
        &["value"],
        &["do_thing", "missing_method"],
        &[],
        &[]
    ));

    let expected = Expectation::new()
        .properties(["value"])
        .methods(["do_thing", "missing_method"]);
    let (passed, lines) = capture(|v| v.verify_object(Target::Type(&surface), &expected));
    assert!(!passed);
    assert_eq!(lines, vec!["Method missing_method is not produced."]);
}

#[test]
fn enumeration_scenario_names_constant_and_type() {
    let enum_type = TypeSurface::new("EnumType").with_constants(["VALUE_ONE"]);
    assert!(verify_enumerations(&enum_type, &["VALUE_ONE"]));
    assert!(!verify_enumerations(&enum_type, &["VALUE_ONE", "VALUE_TWO"]));

    let (passed, lines) = capture(|v| v.verify_enumerations(&enum_type, &["VALUE_ONE", "VALUE_TWO"]));
    assert!(!passed);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("VALUE_TWO"));
    assert!(lines[0].contains("EnumType"));
}

#[test]
fn struct_check_passes_and_fails_on_methods() {
    let repo = alsa_repository();
    let addr = repo.get(&TypeName::from("ALSASeq.Addr")).expect("addr surface");
    assert!(verify_struct(addr, &["new", "equal"]));

    let (passed, lines) = capture(|v| v.verify_struct(addr, &["equal", "compare"]));
    assert!(!passed);
    assert_eq!(lines, vec!["Method compare is not produced."]);
}

#[test]
fn shipped_checks_all_pass() -> Result<()> {
    let repo = alsa_repository();
    let checks = load_checks_from_path(&fixture("alsa_checks.json"))?;
    assert!(!checks.is_empty());
    for check in &checks {
        let verdict = check.run(&repo)?;
        assert!(
            verdict.is_satisfied(),
            "check for {} failed: {:?}",
            check.target,
            verdict.missing().map(|m| m.to_string())
        );
        assert!(check.audit(&repo)?.is_complete());
    }
    Ok(())
}

#[test]
fn interface_capabilities_found_through_ancestry() {
    let repo = alsa_repository();
    let timer = repo
        .get(&TypeName::from("ALSASeq.QueueTimerAlsa"))
        .expect("queue timer surface");
    // Interface properties are not on the attribute surface but the ancestry
    // walk still finds them.
    let expected = Expectation::new()
        .properties(["queue-id", "timer-type"])
        .vmethods(["do_constructed"])
        .signals(["notify"]);
    assert!(check_object(Target::Type(timer), &expected).is_satisfied());
    assert!(!timer.methods.iter().any(|m| m.as_str() == "queue-id"));
}

#[test]
fn vfuncs_are_matched_only_by_implementation_slot() {
    let repo = alsa_repository();
    let client = repo
        .get(&TypeName::from("ALSASeq.UserClient"))
        .expect("user client surface");
    let bare = Expectation::new().vmethods(["handle_event"]);
    let (passed, lines) = capture(|v| v.verify_object(Target::Type(client), &bare));
    assert!(!passed);
    assert_eq!(lines, vec!["Vmethod handle_event is not produced."]);

    let slot = Expectation::new().vmethods(["do_handle_event", "do_dispose"]);
    assert!(check_object(Target::Type(client), &slot).is_satisfied());
}

#[test]
fn opaque_ancestors_contribute_nothing() {
    let surface = TypeSurface::new("Demo.Wrapped")
        .with_ancestor(AncestorDescriptor::class("Demo.Wrapped").with_properties(["value"]))
        .with_ancestor(
            AncestorDescriptor::opaque("builtins.object")
                .with_properties(["__class__"])
                .with_signals(["hidden"]),
        );
    let hidden_prop = Expectation::new().properties(["__class__"]);
    let hidden_signal = Expectation::new().signals(["hidden"]);
    assert!(!check_object(Target::Type(&surface), &hidden_prop).is_satisfied());
    assert!(!check_object(Target::Type(&surface), &hidden_signal).is_satisfied());
}

#[test]
fn instance_mode_uses_live_properties_and_signal_registry() -> Result<()> {
    let surface = demo_thing().with_ancestor(
        AncestorDescriptor::class("GObject.Object")
            .with_vfuncs(["notify"])
            .with_signals(["notify"]),
    );
    let repo = SurfaceRepository::from_surfaces([surface.clone()])?;
    let instance = repo
        .instantiate(&TypeName::from("Demo.Thing"))
        .expect("registered");
    let target = Target::Instance {
        instance: &instance,
        signals: repo.signals(),
    };

    let expected = Expectation::new()
        .properties(["value"])
        .methods(["get_value"])
        .signals(["notify"]);
    assert!(check_object(target, &expected).is_satisfied());

    // Declared vfuncs are visible in type mode but never in instance mode.
    let vmethod = Expectation::new().vmethods(["do_notify"]);
    assert!(check_object(Target::Type(&surface), &vmethod).is_satisfied());
    let (passed, lines) = capture(|v| v.verify_object(target, &vmethod));
    assert!(!passed);
    assert_eq!(lines, vec!["Vmethod do_notify is not produced."]);
    Ok(())
}

#[test]
fn instance_mode_reports_what_the_object_actually_exposes() {
    // A live object whose binding dropped a property and whose type never
    // registered its signals.
    let instance = ObjectInstance::new("Demo.Partial")
        .with_properties(["value"])
        .with_attributes(["do_thing"]);
    let mut registry = SignalRegistry::default();
    registry.register(&TypeName::from("Demo.Other"), [CapabilityName::from("changed")]);
    let target = Target::Instance {
        instance: &instance,
        signals: &registry,
    };

    let props = Expectation::new().properties(["value", "label"]);
    let verdict = check_object(target, &props);
    let missing = verdict.missing().expect("label is missing");
    assert_eq!(missing.kind, CapabilityKind::Property);
    assert_eq!(missing.name.as_str(), "label");

    let signals = Expectation::new().signals(["changed"]);
    assert!(!check_object(target, &signals).is_satisfied());
}

#[test]
fn first_failing_category_short_circuits() {
    let surface = demo_thing();
    let expected = Expectation::new()
        .properties(["absent_property"])
        .signals(["absent_signal"]);
    let (passed, lines) = capture(|v| v.verify_object(Target::Type(&surface), &expected));
    assert!(!passed);
    assert_eq!(lines, vec!["Property absent_property is not produced."]);
}

#[test]
fn verification_is_idempotent() {
    let repo = alsa_repository();
    let client = repo
        .get(&TypeName::from("ALSASeq.UserClient"))
        .expect("user client surface");
    let expected = Expectation::new()
        .methods(["open", "close"])
        .signals(["handle-event"]);
    let first = check_object(Target::Type(client), &expected);
    let second = check_object(Target::Type(client), &expected);
    assert_eq!(first, second);
    assert!(!first.is_satisfied());
}

#[test]
fn result_does_not_depend_on_name_order() {
    let surface = demo_thing();
    let orders: [&[&str]; 3] = [
        &["do_thing", "get_value", "missing_method"],
        &["missing_method", "get_value", "do_thing"],
        &["get_value", "missing_method", "do_thing"],
    ];
    for order in orders {
        let expected = Expectation::new().methods(order.iter().copied());
        let verdict = check_object(Target::Type(&surface), &expected);
        assert_eq!(
            verdict.missing().map(|m| m.name.as_str()),
            Some("missing_method")
        );
    }

    let present: [&[&str]; 2] = [&["do_thing", "get_value"], &["get_value", "do_thing"]];
    for order in present {
        let expected = Expectation::new().methods(order.iter().copied());
        assert!(check_object(Target::Type(&surface), &expected).is_satisfied());
    }
}

#[test]
fn audit_lists_every_missing_name() {
    let repo = alsa_repository();
    let info = repo
        .get(&TypeName::from("ALSAHwdep.DeviceInfo"))
        .expect("device info surface");
    let expected = Expectation::new()
        .properties(["device-id", "subdevice-id", "card-id", "subdevice-count"])
        .signals(["notify", "changed"]);
    let report = audit_object(Target::Type(info), &expected);
    let missing: Vec<String> = report.missing.iter().map(|m| m.to_string()).collect();
    assert_eq!(
        missing,
        vec![
            "Property subdevice-id is not produced.",
            "Property subdevice-count is not produced.",
            "Signal changed is not produced.",
        ]
    );
}

#[test]
fn binary_passes_shipped_checks() -> Result<()> {
    let output = run_surface_check(&fixture("alsa.json"), &fixture("alsa_checks.json"), &[])?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn binary_prints_one_line_per_failed_check() -> Result<()> {
    let checks = json_file(&json!([
        {"target": "ALSASeq.UserClient", "mode": "type", "methods": ["open", "close"]},
        {"target": "ALSASeq.ClientType", "mode": "enum", "enumerations": ["USER", "PLUGIN"]},
        {"target": "ALSASeq.Addr", "mode": "struct", "methods": ["equal"]}
    ]))?;
    let output = run_surface_check(&fixture("alsa.json"), checks.path(), &[])?;
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout_lines(&output),
        vec![
            "Method close is not produced.",
            "Enumeration PLUGIN is not produced for ALSASeq.ClientType.",
        ]
    );
    Ok(())
}

#[test]
fn binary_report_emits_ndjson() -> Result<()> {
    let checks = json_file(&json!([
        {"target": "ALSASeq.UserClient", "mode": "instance", "properties": ["client-id", "port-id"], "signals": ["gone"]},
        {"target": "ALSASeq.Addr", "mode": "struct", "methods": ["equal"]}
    ]))?;
    let output = run_surface_check(&fixture("alsa.json"), checks.path(), &["--report"])?;
    assert_eq!(output.status.code(), Some(1));
    let reports: Vec<Value> = stdout_lines(&output)
        .iter()
        .map(|line| serde_json::from_str(line))
        .collect::<Result<_, _>>()?;
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["target"], "ALSASeq.UserClient");
    assert_eq!(reports[0]["missing"].as_array().map(Vec::len), Some(2));
    assert_eq!(reports[0]["missing"][1]["kind"], "signal");
    assert_eq!(reports[1]["missing"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[test]
fn binary_rejects_unknown_target() -> Result<()> {
    let checks = json_file(&json!([{"target": "ALSASeq.Missing", "mode": "struct"}]))?;
    let output = run_surface_check(&fixture("alsa.json"), checks.path(), &[])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown type ALSASeq.Missing"));
    Ok(())
}

#[test]
fn binary_rejects_surfaces_that_violate_schema() -> Result<()> {
    let surfaces = json_file(&json!({
        "schema_version": "type_surface_v1",
        "types": [{"name": "Demo.Thing", "methods": "not-a-list"}]
    }))?;
    let checks = json_file(&json!([{"target": "Demo.Thing", "mode": "struct"}]))?;
    let output = run_surface_check(surfaces.path(), checks.path(), &[])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed schema validation"));
    Ok(())
}

#[test]
fn schema_override_decides_validation() -> Result<()> {
    let shipped = std::fs::read_to_string(repo_root().join("schema/type_surface.schema.json"))?;
    let mut strict: Value = serde_json::from_str(&shipped)?;
    strict["properties"]["types"]["maxItems"] = json!(1);
    let schema = json_file(&strict)?;
    let checks = fixture("alsa_checks.json");

    let output = run_surface_check_with_schema(&fixture("alsa.json"), &checks, schema.path())?;
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed schema validation"), "stderr: {stderr}");

    let output = run_surface_check(&fixture("alsa.json"), &checks, &[])?;
    assert!(output.status.success());
    Ok(())
}
