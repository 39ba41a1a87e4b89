//! End-to-end pipeline scenarios against a scripted toolchain.
//!
//! Sources live in a temporary directory; the scripted toolchain creates
//! object, archive and executable files so the on-disk filtering between
//! stages behaves as it would with a real compiler.

mod common;

use buildmatrix::build::{
    BuildMatrix, FailurePolicy, Product, Severity, SourceFile, Stage, TargetState,
};
use buildmatrix::config::default_config;
use buildmatrix::toolchain::{self, MISSING_NDK};
use common::{Kind, ScriptedToolchain, kind_of, run, toolchain, write_source};

fn products(root: &std::path::Path) -> Vec<Product> {
    vec![
        Product::new("pycdas", [SourceFile::new(write_source(root, "pycdas.cpp"))]),
        Product::new(
            "pycdc",
            [
                SourceFile::new(write_source(root, "pycdc.cpp")),
                SourceFile::new(write_source(root, "ASTree.cpp")),
            ],
        ),
    ]
}

#[test]
fn test_missing_source_is_skipped_and_target_completes() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let sources = vec![
        SourceFile::new(write_source(root, "a.cpp")),
        SourceFile::new(root.join("b.cpp")),
    ];
    let target = toolchain(root, "desktop");
    let matrix = BuildMatrix::new(vec![target.clone()], sources, products(root), 0).unwrap();
    let runner = ScriptedToolchain::new(0);

    let (report, logs) = run(&matrix, &runner);

    assert!(report.success());
    assert_eq!(report.outcomes[0].state, TargetState::Done);
    assert_eq!(report.outcomes[0].executables.len(), 2);

    let warnings = logs.with_severity(Severity::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].text.contains("b.cpp"));

    let calls = runner.calls();
    let archive: Vec<_> = calls.iter().filter(|c| kind_of(c) == Kind::Archive).collect();
    assert_eq!(archive.len(), 1);
    assert_eq!(archive[0].args.len(), 3);
    assert!(archive[0].args[2].ends_with("a.o"));
    assert_eq!(runner.count(Kind::Compile), 1);
    assert_eq!(runner.count(Kind::Link), 2);

    assert!(target.library_path().exists());
    assert!(target.executable_path("pycdas").exists());
    assert!(target.executable_path("pycdc").exists());
}

#[test]
fn test_failing_compiler_fails_target_without_archive_or_link() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let sources = vec![SourceFile::new(write_source(root, "a.cpp"))];
    let matrix =
        BuildMatrix::new(vec![toolchain(root, "desktop")], sources, products(root), 0).unwrap();
    let runner = ScriptedToolchain::new(1);

    let (report, logs) = run(&matrix, &runner);

    assert!(!report.success());
    assert_eq!(report.exit_code(), 1);
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.state, TargetState::Failed);
    assert_eq!(outcome.error.as_ref().unwrap().stage(), Stage::Compile);

    assert_eq!(runner.count(Kind::Archive), 0);
    assert_eq!(runner.count(Kind::Link), 0);

    let errors = logs.with_severity(Severity::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].text.contains("a.cpp"));
}

#[test]
fn test_stages_run_in_dependency_order() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let sources: Vec<SourceFile> = (0..16)
        .map(|i| SourceFile::new(write_source(root, &format!("s{}.cpp", i))))
        .collect();
    let matrix = BuildMatrix::new(
        vec![toolchain(root, "desktop"), toolchain(root, "aarch64")],
        sources,
        products(root),
        4,
    )
    .unwrap();
    let runner = ScriptedToolchain::new(0);

    let (report, _) = run(&matrix, &runner);
    assert!(report.success());

    let kinds: Vec<Kind> = runner.calls().iter().map(kind_of).collect();
    assert_eq!(kinds.len(), 2 * (16 + 1 + 2));
    for per_target in kinds.chunks(19) {
        assert!(per_target[..16].iter().all(|k| *k == Kind::Compile));
        assert_eq!(per_target[16], Kind::Archive);
        assert!(per_target[17..].iter().all(|k| *k == Kind::Link));
    }

    // Desktop first, then the cross target.
    let first_output = runner.calls()[0].value_of("-o").unwrap().to_string();
    assert!(first_output.contains("desktop"));
}

#[test]
fn test_all_sources_missing_fails_at_archive() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let sources = vec![SourceFile::new(root.join("gone.cpp"))];
    let matrix = BuildMatrix::new(vec![toolchain(root, "desktop")], sources, Vec::new(), 0)
        .unwrap()
        .with_policy(FailurePolicy::Stop);
    let runner = ScriptedToolchain::new(0);

    let (report, logs) = run(&matrix, &runner);

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.state, TargetState::Failed);
    assert_eq!(outcome.error.as_ref().unwrap().stage(), Stage::Archive);
    assert!(runner.calls().is_empty());
    assert_eq!(logs.with_severity(Severity::Warning).len(), 1);
    assert_eq!(logs.with_severity(Severity::Error).len(), 1);
}

#[test]
fn test_missing_ndk_fails_cross_targets_but_builds_desktop() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let mut config = default_config();
    config.project.sources = vec![write_source(root, "bytecode.cpp").display().to_string()];
    for product in &mut config.products {
        product.sources = vec![
            write_source(root, &format!("{}.cpp", product.name))
                .display()
                .to_string(),
        ];
    }
    config.desktop.bin_dir = root.join("bin");
    config.desktop.obj_dir = root.join("obj");
    let cross = config.cross.as_mut().unwrap();
    cross.ndk = None;
    cross.bin_dir = root.join("android_bin");
    cross.obj_dir = root.join("android_obj");

    let targets = toolchain::resolve_targets_with_ndk(&config, None).unwrap();
    assert_eq!(targets.len(), 3);
    assert!(targets[1].compiler.starts_with(MISSING_NDK));

    let matrix = BuildMatrix::from_config(&config, targets).unwrap();
    let runner = ScriptedToolchain::new(0);
    let (report, logs) = run(&matrix, &runner);

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.outcomes[0].state, TargetState::Done);
    for outcome in &report.outcomes[1..] {
        assert_eq!(outcome.state, TargetState::Failed, "{}", outcome.target);
        assert_eq!(outcome.error.as_ref().unwrap().stage(), Stage::Compile);
    }
    assert_eq!(report.exit_code(), 1);

    let errors = logs.with_severity(Severity::Error);
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().any(|e| e.text.contains("[armv7]")));
    assert!(errors.iter().any(|e| e.text.contains("[aarch64]")));
    assert_eq!(runner.count(Kind::Archive), 1);
}
