//! Catalog loading and validation, plus settings path resolution.

mod common;
use common::{assertions::assert_error_contains, local_target, TestWorkspace};
use std::path::PathBuf;
use zkalc_collect::{config, Catalog, OutputFormat, Settings, ZkalcError};

#[test]
fn test_builtin_catalog_is_valid() {
    let catalog = Catalog::builtin();
    catalog.validate().unwrap();

    let names: Vec<&str> = catalog.names().collect();
    assert_eq!(names, vec!["arkworks", "blstrs", "zkcrypto", "gnark-crypto", "mcl"]);
}

#[test]
fn test_builtin_catalog_shape() {
    let catalog = Catalog::builtin();

    assert_eq!(catalog.tooling.len(), 1);
    assert_eq!(catalog.tooling[0].to_string(), "cargo install cargo-criterion");

    for name in ["arkworks", "blstrs", "zkcrypto"] {
        let target = catalog.get(name).unwrap();
        assert!(target.source.is_none(), "{} is benchmarked locally", name);
        assert_eq!(target.format, OutputFormat::Json);
        assert_eq!(target.bench.to_string(), "cargo criterion --message-format=json");
        assert_eq!(target.workdir, PathBuf::from("backend").join(name));
    }

    // Exactly two external repositories are cloned
    let checkouts: Vec<_> = catalog.checkouts().collect();
    assert_eq!(checkouts.len(), 2);

    let gnark = catalog.get("gnark-crypto").unwrap();
    assert_eq!(gnark.format, OutputFormat::Json);
    assert_eq!(gnark.setup[0].to_string(), "go mod download");

    let mcl = catalog.get("mcl").unwrap();
    assert_eq!(mcl.format, OutputFormat::Text);
    assert_eq!(mcl.bench.program, "sh");
}

#[test]
fn test_builtin_output_paths() {
    let catalog = Catalog::builtin();
    let settings = Settings::new("/srv/zkalc");

    let paths: Vec<PathBuf> = catalog
        .targets
        .iter()
        .map(|t| settings.output_path(t))
        .collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("/srv/zkalc/perf/data/arkworks.json"),
            PathBuf::from("/srv/zkalc/perf/data/blstrs.json"),
            PathBuf::from("/srv/zkalc/perf/data/zkcrypto.json"),
            PathBuf::from("/srv/zkalc/perf/data/gnark-crypto.json"),
            PathBuf::from("/srv/zkalc/perf/data/mcl.txt"),
        ]
    );
}

#[test]
fn test_unknown_target_lookup() {
    let catalog = Catalog::builtin();
    assert_error_contains(catalog.get("openssl"), "Unknown target: openssl");
}

#[test]
fn test_load_catalog_file_with_defaults() {
    let ws = TestWorkspace::new();
    let path = ws.write(
        "catalog.json",
        r#"{
            "targets": [
                {
                    "name": "pasta",
                    "workdir": "backend/pasta",
                    "bench": { "program": "cargo", "args": ["criterion", "--message-format=json"] },
                    "format": "json"
                },
                {
                    "name": "noble",
                    "workdir": "backend/noble/noble-curves",
                    "source": { "repository": "https://github.com/paulmillr/noble-curves", "checkout": "backend/noble/noble-curves" },
                    "setup": [{ "program": "npm", "args": ["install"] }],
                    "bench": { "program": "npm" },
                    "format": "text"
                }
            ]
        }"#,
    );

    let catalog = Catalog::from_json_file(&path).unwrap();

    assert!(catalog.tooling.is_empty());
    let pasta = catalog.get("pasta").unwrap();
    assert!(pasta.setup.is_empty());
    assert!(pasta.description.is_empty());
    let noble = catalog.get("noble").unwrap();
    assert!(noble.bench.args.is_empty());
    assert_eq!(noble.format.extension(), "txt");
    assert_eq!(noble.source.as_ref().unwrap().revision, None);
}

#[test]
fn test_catalog_json_roundtrip_keeps_builtin() {
    let builtin = Catalog::builtin();
    let json = serde_json::to_string(&builtin).unwrap();
    assert_eq!(Catalog::from_json_str(&json).unwrap(), builtin);
}

#[test]
fn test_rejects_malformed_json() {
    assert_error_contains(Catalog::from_json_str("{ \"targets\": ["), "Invalid catalog");
    assert_error_contains(
        Catalog::from_json_str(
            r#"{"targets":[{"name":"x","workdir":"a","bench":{"program":"p"},"format":"yaml"}]}"#,
        ),
        "Invalid catalog",
    );
}

#[test]
fn test_rejects_oversized_catalog_file() {
    let ws = TestWorkspace::new();
    let padding = " ".repeat(config::MAX_CATALOG_SIZE_BYTES as usize + 1);
    let path = ws.write("huge.json", &padding);

    assert_error_contains(Catalog::from_json_file(&path), "exceeds");
}

#[test]
fn test_missing_catalog_file_is_io_error() {
    let ws = TestWorkspace::new();
    let err = Catalog::from_json_file(ws.root().join("absent.json")).unwrap_err();
    assert!(matches!(err, ZkalcError::Io { .. }));
}

fn catalog_with(targets: Vec<zkalc_collect::Target>) -> Catalog {
    Catalog {
        tooling: Vec::new(),
        targets,
    }
}

#[test]
fn test_rejects_empty_catalog() {
    assert_error_contains(catalog_with(Vec::new()).validate(), "no targets");
}

#[test]
fn test_rejects_duplicate_names() {
    let catalog = catalog_with(vec![
        local_target("blstrs", "backend/a", "true", OutputFormat::Json),
        local_target("blstrs", "backend/b", "true", OutputFormat::Json),
    ]);
    assert_error_contains(catalog.validate(), "duplicate target `blstrs`");
}

#[test]
fn test_rejects_bad_names() {
    for name in ["", "has space", "slash/name", ".hidden", "init", "clean", "all", "fit"] {
        let target = local_target(name, "backend/a", "true", OutputFormat::Json);
        let catalog = catalog_with(vec![target]);
        assert!(
            catalog.validate().is_err(),
            "Name {:?} should have been rejected",
            name
        );
    }
}

#[test]
fn test_rejects_paths_outside_root() {
    for workdir in ["../elsewhere", "/abs/path", ".", "backend/../../up"] {
        let catalog = catalog_with(vec![local_target("x", workdir, "true", OutputFormat::Json)]);
        assert_error_contains(catalog.validate(), "must be a relative path inside the root");
    }

    let mut target =
        common::fixtures::cloned_target("x", "https://example.invalid/x", "backend/x", "true");
    target.source.as_mut().unwrap().checkout = PathBuf::from("..");
    assert_error_contains(catalog_with(vec![target]).validate(), "checkout");
}

#[test]
fn test_rejects_empty_program_and_repository() {
    let mut target = local_target("x", "backend/x", "true", OutputFormat::Json);
    target.bench.program = "  ".to_string();
    assert_error_contains(catalog_with(vec![target]).validate(), "no program");

    let target = common::fixtures::cloned_target("y", "", "backend/y", "true");
    assert_error_contains(catalog_with(vec![target]).validate(), "empty repository URL");
}

#[test]
fn test_settings_outdir_resolution() {
    let settings = Settings::new("/repo");
    assert_eq!(settings.outdir, PathBuf::from("/repo").join(config::DEFAULT_OUTDIR));

    let relative = settings.clone().with_outdir("out/bench");
    assert_eq!(relative.outdir, PathBuf::from("/repo/out/bench"));

    let absolute = settings.with_outdir("/tmp/zkalc-results");
    assert_eq!(absolute.outdir, PathBuf::from("/tmp/zkalc-results"));
}
