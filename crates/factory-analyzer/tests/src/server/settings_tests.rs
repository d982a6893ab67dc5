use serde_json::json;

use super::*;

#[test]
fn defaults_to_spec_factories() {
    let settings = ServerSettings::from_lsp_payload(None);
    assert_eq!(settings.factories.paths, vec!["spec/factories/**/*.rb".to_string()]);
    assert_eq!(settings.logging.level, LogLevel::Info);
}

#[test]
fn parses_namespaced_payload() {
    let payload = json!({
        "factory-analyzer": {
            "factoryPaths": ["spec/factories/**/*.rb", "custom/factories/**/*.rb"],
            "logging": {
                "level": "debug"
            }
        }
    });

    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert_eq!(
        settings.factories.paths,
        vec!["spec/factories/**/*.rb".to_string(), "custom/factories/**/*.rb".to_string()]
    );
    assert_eq!(settings.logging.level, LogLevel::Debug);
}

#[test]
fn parses_direct_payload() {
    let payload = json!({
        "factoryPaths": ["test/factories/*.rb"]
    });

    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert_eq!(settings.factories.paths, vec!["test/factories/*.rb".to_string()]);
    assert_eq!(settings.logging.level, LogLevel::Info);
}

#[test]
fn merge_keeps_unspecified_values() {
    let current = ServerSettings::from_lsp_payload(Some(&json!({
        "factoryPaths": ["custom/**/*.rb"],
        "logging": { "level": "warn" }
    })));

    let merged = current.merged_with_payload(&json!({
        "factory-analyzer": {
            "logging": { "level": "trace" }
        }
    }));

    assert_eq!(merged.factories.paths, vec!["custom/**/*.rb".to_string()]);
    assert_eq!(merged.logging.level, LogLevel::Trace);
}

#[test]
fn trims_blank_and_duplicate_paths() {
    let settings = ServerSettings::from_lsp_payload(Some(&json!({
        "factoryPaths": [" spec/factories/**/*.rb ", "", "   ", "spec/factories/**/*.rb", "lib/factories/*.rb"]
    })));

    assert_eq!(
        settings.factories.paths,
        vec!["spec/factories/**/*.rb".to_string(), "lib/factories/*.rb".to_string()]
    );
}

#[test]
fn explicit_empty_list_disables_scanning() {
    let settings = ServerSettings::from_lsp_payload(Some(&json!({ "factoryPaths": [] })));
    assert!(settings.factories.paths.is_empty());
}

#[test]
fn ignores_malformed_values() {
    let current = ServerSettings::default();
    let merged = current.merged_with_payload(&json!({
        "factoryPaths": "spec/factories/**/*.rb",
        "logging": { "level": "loud" }
    }));

    assert_eq!(merged, current);
}

#[test]
fn ignores_unknown_keys() {
    let settings = ServerSettings::from_lsp_payload(Some(&json!({
        "factory-analyzer": {
            "factoryPaths": ["a/*.rb"],
            "somethingElse": true
        },
        "editor": { "tabSize": 2 }
    })));

    assert_eq!(settings.factories.paths, vec!["a/*.rb".to_string()]);
}

#[test]
fn info_logging_gate() {
    assert!(!LogLevel::Error.allows_info());
    assert!(!LogLevel::Warn.allows_info());
    assert!(LogLevel::Info.allows_info());
    assert!(LogLevel::Trace.allows_info());
}
