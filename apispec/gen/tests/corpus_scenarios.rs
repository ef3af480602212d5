//! Corpus-level scenarios over the bundled corpus and small hand-written units.

use apispec_define::{Body, FieldLocation, QualifiedName, TypeDef};
use apispec_gen::pipeline::{CheckedCorpus, SchemaUnit, bundled_units, check_corpus};
use apispec_gen::request::{RequestBuilder, RequestError};
use apispec_gen::validation::ViolationKind;
use serde_json::json;

fn bundled() -> CheckedCorpus {
    check_corpus(&bundled_units(), true)
}

fn anthropic_settings(checked: &CheckedCorpus) -> &TypeDef {
    checked
        .registry
        .resolve(&QualifiedName::scoped(
            "inference.put_anthropic",
            "AnthropicTaskSettings",
        ))
        .expect("AnthropicTaskSettings is registered")
}

#[test]
fn update_pipeline_requires_connector_id() {
    let checked = bundled();
    let op = checked
        .registry
        .operation("connector.update_pipeline")
        .expect("operation is registered");
    assert!(checked.is_certified(&op.name));

    let err = RequestBuilder::new(op)
        .body_field("pipeline", json!({ "name": "ent-search-generic-ingestion" }))
        .build()
        .unwrap_err();
    match err {
        RequestError::MissingRequiredField { operation, field } => {
            assert_eq!(operation, "connector.update_pipeline");
            assert_eq!(field, "connector_id");
        }
        other => panic!("Expected MissingRequiredField, got: {:?}", other),
    }
}

#[test]
fn update_pipeline_requires_body_pipeline() {
    let checked = bundled();
    let op = checked.registry.operation("connector.update_pipeline").unwrap();

    let err = RequestBuilder::new(op)
        .path_param("connector_id", "my-connector")
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        RequestError::MissingRequiredField {
            operation: "connector.update_pipeline".to_string(),
            field: "pipeline".to_string(),
        }
    );

    let request = RequestBuilder::new(op)
        .path_param("connector_id", "my-connector")
        .body_field("pipeline", json!({ "name": "p" }))
        .build()
        .unwrap();
    assert_eq!(request.path, "/_connector/my-connector/_pipeline");
    assert_eq!(request.body, Some(json!({ "pipeline": { "name": "p" } })));
}

#[test]
fn anthropic_sampling_fields_are_independently_optional() {
    let checked = bundled();
    let TypeDef::Class(settings) = anthropic_settings(&checked) else {
        panic!("AnthropicTaskSettings should be a class");
    };
    for name in ["temperature", "top_p", "top_k"] {
        let field = settings
            .fields
            .iter()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("missing field {name}"));
        assert!(!field.required, "{name} should be optional");
    }
    let max_tokens = settings.fields.iter().find(|f| f.name == "max_tokens").unwrap();
    assert!(max_tokens.required);
}

#[test]
fn anthropic_accepts_neither_or_both_sampling_fields() {
    let checked = bundled();
    let op = checked.registry.operation("inference.put_anthropic").unwrap();
    let base = || {
        RequestBuilder::new(op)
            .path_param("task_type", "completion")
            .path_param("anthropic_inference_id", "anthropic_completion")
            .body_field("service", "anthropic")
            .body_field(
                "service_settings",
                json!({ "api_key": "key", "model_id": "claude" }),
            )
    };

    let neither = base()
        .body_field("task_settings", json!({ "max_tokens": 1024 }))
        .build()
        .unwrap();
    assert_eq!(neither.path, "/_inference/completion/anthropic_completion");

    let both = base()
        .body_field(
            "task_settings",
            json!({ "max_tokens": 1024, "temperature": 0.5, "top_p": 0.9 }),
        )
        .build()
        .unwrap();
    let body = both.body.unwrap();
    assert_eq!(body["task_settings"]["temperature"], 0.5);
    assert_eq!(body["task_settings"]["top_p"], 0.9);
}

#[test]
fn empty_enum_is_malformed() {
    let unit = r#"
        /** @rest_spec_name inference.put_empty */
        export interface Request extends RequestBase {
          urls: [{ path: '/_inference/{task_type}/{id}' methods: ['PUT'] }]
          path_parts: {
            task_type: EmptyTaskType
            id: Id
          }
        }
        export enum EmptyTaskType {}
    "#;
    let checked = check_corpus(&[SchemaUnit::new("empty.ts", unit)], true);
    assert!(!checked.is_certified("inference.put_empty"));

    let violations: Vec<_> = checked.violations_for("inference.put_empty").collect();
    assert_eq!(violations.len(), 1, "{violations:?}");
    assert_eq!(violations[0].kind, ViolationKind::MalformedSchema);
    assert_eq!(violations[0].path, "EmptyTaskType");
}

#[test]
fn per_operation_service_types_do_not_collide() {
    let checked = bundled();
    assert!(
        !checked
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::DuplicateType),
        "{:?}",
        checked.violations
    );
    assert!(checked.is_certified("inference.put_anthropic"));
    assert!(checked.is_certified("inference.put_elasticsearch"));

    let members = |ns: &str| -> Vec<String> {
        match checked
            .registry
            .resolve(&QualifiedName::scoped(ns, "ServiceType"))
            .unwrap()
        {
            TypeDef::Enum(e) => e.variants.iter().map(|v| v.name.clone()).collect(),
            other => panic!("Expected enum, got: {:?}", other),
        }
    };
    assert_eq!(members("inference.put_anthropic"), vec!["anthropic"]);
    assert_eq!(members("inference.put_elasticsearch"), vec!["elasticsearch"]);
}

#[test]
fn required_server_default_is_an_invalid_contract() {
    let unit = r#"
        /** @rest_spec_name inference.put_bad */
        export interface Request extends RequestBase {
          urls: [{ path: '/_inference/bad' methods: ['PUT'] }]
          body: {
            /**
             * @server_default true
             */
            return_documents: boolean
          }
        }
    "#;
    let checked = check_corpus(&[SchemaUnit::new("bad.ts", unit)], false);
    let violation = checked.violations_for("inference.put_bad").next().unwrap();
    assert_eq!(violation.kind, ViolationKind::InvalidFieldContract);
    assert_eq!(violation.path, "body.return_documents");
}

#[test]
fn every_placeholder_has_exactly_one_path_part() {
    let checked = bundled();
    for op in checked.certified_operations() {
        let placeholders = op.placeholders();
        for placeholder in &placeholders {
            let matches = op.path_parts.iter().filter(|p| p.name == *placeholder).count();
            assert_eq!(matches, 1, "{}: {{{placeholder}}}", op.name);
        }
        for part in &op.path_parts {
            assert!(
                placeholders.contains(part.name.as_str()),
                "{}: path part {} is unused",
                op.name,
                part.name
            );
        }
    }
}

#[test]
fn no_certified_field_is_required_with_a_server_default() {
    let checked = bundled();
    for op in checked.certified_operations() {
        for (location, field) in op.fields() {
            assert!(
                !(field.required && field.has_server_default()),
                "{}: {location}.{}",
                op.name,
                field.name
            );
        }
        for name in &op.inline_types {
            if let TypeDef::Class(class) = checked.registry.resolve(name).unwrap() {
                assert!(class.fields.iter().all(|f| !(f.required && f.has_server_default())));
            }
        }
    }
}

#[test]
fn elasticsearch_server_default_is_kept_as_annotation() {
    let checked = bundled();
    let def = checked
        .registry
        .resolve(&QualifiedName::scoped(
            "inference.put_elasticsearch",
            "ElasticsearchTaskSettings",
        ))
        .unwrap();
    let TypeDef::Class(class) = def else {
        panic!("ElasticsearchTaskSettings should be a class");
    };
    let field = &class.fields[0];
    assert_eq!(field.name, "return_documents");
    assert!(!field.required);
    assert_eq!(field.annotations.server_default(), Some("true"));
}

#[test]
fn update_pipeline_body_lists_pipeline() {
    let checked = bundled();
    let op = checked.registry.operation("connector.update_pipeline").unwrap();
    let Body::Properties(fields) = &op.body else {
        panic!("Expected a property body");
    };
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "pipeline");
    assert_eq!(
        op.required_fields(),
        vec![
            (FieldLocation::Path, "connector_id"),
            (FieldLocation::Body, "pipeline"),
        ]
    );
}
