//! Boxing whole Terraform files through the processor

use rstest::rstest;
use std::path::Path;
use yorbox::boxing::{Boxer, TemplateError};
use yorbox::config::{BoxConfig, DEFAULT_BOX_TEMPLATE};
use yorbox::processor::{box_source, unbox_source};

const COMPREHENSION: &str =
    "{ for k, v in /*<box>*/ { yor_trace = 123 } /*</box>*/ : k => v if var.{{ toggleName }} }";

fn boxer(config: &BoxConfig) -> Boxer {
    Boxer::new(config, Path::new(".")).unwrap()
}

fn resource(tags: &str) -> String {
    format!("resource \"aws_s3_bucket\" \"logs\" {{\n  bucket = \"logs\"\n  tags = {tags}\n}}\n")
}

/// Box `source` and check that boxing the result again changes nothing.
fn box_twice(config: &BoxConfig, source: &str) -> String {
    let boxer = boxer(config);
    let once = box_source(source, &boxer).unwrap();
    let twice = box_source(&once, &boxer).unwrap();
    assert_eq!(once, twice, "boxing is not idempotent");
    once
}

#[rstest]
#[case::single_group(
    r#"{ yor_trace = "t1", env = "dev" }"#,
    r#"(var.yor_toggle ? { yor_trace = "t1", env = "dev" } : {})"#
)]
#[case::unmarked_sibling(
    r#"merge({ a = 1 }, { yor_trace = "t1" })"#,
    r#"merge({ a = 1 }, (var.yor_toggle ? { yor_trace = "t1" } : {}))"#
)]
#[case::already_boxed(
    r#"(var.yor_toggle ? { yor_trace = "t1" } : {})"#,
    r#"(var.yor_toggle ? { yor_trace = "t1" } : {})"#
)]
#[case::legacy_toggle(
    r#"merge(var.tags, var.yor_toggle ? { git_commit = "bb85" } : {})"#,
    r#"merge(var.tags, var.yor_toggle ? { git_commit = "bb85" } : {})"#
)]
#[case::object_colon_syntax(
    r#"{ "yor_trace": "t1" }"#,
    r#"(var.yor_toggle ? { "yor_trace": "t1" } : {})"#
)]
#[case::yor_name(
    r#"{ yor_name = "logs" }"#,
    r#"(var.yor_toggle ? { yor_name = "logs" } : {})"#
)]
#[case::no_marked_keys(r#"{ env = "app" }"#, r#"{ env = "app" }"#)]
#[case::reference_only("var.tags", "var.tags")]
fn test_default_configuration(#[case] tags: &str, #[case] expected: &str) {
    assert_eq!(
        box_twice(&BoxConfig::default(), &resource(tags)),
        resource(expected)
    );
}

#[test]
fn test_multiline_resource() {
    let source = r#"resource "example_resource" "example_instance" {
  name = "example"
  tags = {
    yor_trace   = "example_trace"
    environment = "dev"
  }
}
"#;
    let boxed = box_twice(&BoxConfig::default(), source);
    insta::assert_snapshot!(boxed.trim_end(), @r#"
    resource "example_resource" "example_instance" {
      name = "example"
      tags = (var.yor_toggle ? {
        yor_trace   = "example_trace"
        environment = "dev"
      } : {})
    }
    "#);
}

#[test]
fn test_merge_with_partly_boxed_groups() {
    let source = r#"
resource "example_resource" "example_instance" {
  tags = merge(each.value.tags, {}, (var.yor_toggle ? {
    yor_trace = "0c9a0220-f447-473a-a142-0ed147c43691"
  } : {}), {
    git_commit = "d101883be1a535645f359f1e1a047cf4b30bc2a2"
    git_file   = "main.tf"
  })
}
"#;
    let expected = r#"
resource "example_resource" "example_instance" {
  tags = merge(each.value.tags, {}, (var.yor_toggle ? {
    yor_trace = "0c9a0220-f447-473a-a142-0ed147c43691"
  } : {}), (var.yor_toggle ? {
    git_commit = "d101883be1a535645f359f1e1a047cf4b30bc2a2"
    git_file   = "main.tf"
  } : {}))
}
"#;
    assert_eq!(box_twice(&BoxConfig::default(), source), expected);
}

#[test]
fn test_merge_of_three_groups() {
    let source = r#"resource "azurerm_kubernetes_cluster" "main" {
  tags = merge({
    git_commit= "bb858b14"
  }, {
    env = "app"
  }, {
    yor_trace = "12345"
  })
  workload_identity_enabled = var.workload_identity_enabled
}
"#;
    let expected = r#"resource "azurerm_kubernetes_cluster" "main" {
  tags = merge((var.yor_toggle ? {
    git_commit= "bb858b14"
  } : {}), {
    env = "app"
  }, (var.yor_toggle ? {
    yor_trace = "12345"
  } : {}))
  workload_identity_enabled = var.workload_identity_enabled
}
"#;
    assert_eq!(box_twice(&BoxConfig::default(), source), expected);
}

#[test]
fn test_only_resource_and_module_blocks() {
    let source = r#"data "example_data" "foo" {
  tags = { yor_trace = "t1" }
}

module "example_module" {
  source = "../../"
  tags   = { yor_trace = "t2" }
}

locals {
  tags = { yor_trace = "t3" }
}
"#;
    let expected = r#"data "example_data" "foo" {
  tags = { yor_trace = "t1" }
}

module "example_module" {
  source = "../../"
  tags   = (var.yor_toggle ? { yor_trace = "t2" } : {})
}

locals {
  tags = { yor_trace = "t3" }
}
"#;
    assert_eq!(box_twice(&BoxConfig::default(), source), expected);
}

#[test]
fn test_ignored_block_kinds() {
    let config = BoxConfig {
        ignored_block_kinds: ["azurerm_resource_group".to_string(), "module".to_string()].into(),
        ..BoxConfig::default()
    };
    let source = r#"resource "azurerm_resource_group" "rg" {
  tags = { yor_trace = "t1" }
}

resource "azurerm_storage_account" "sa" {
  tags = { yor_trace = "t2" }
}

module "m" {
  tags = { yor_trace = "t3" }
}
"#;
    let expected = r#"resource "azurerm_resource_group" "rg" {
  tags = { yor_trace = "t1" }
}

resource "azurerm_storage_account" "sa" {
  tags = (var.yor_toggle ? { yor_trace = "t2" } : {})
}

module "m" {
  tags = { yor_trace = "t3" }
}
"#;
    assert_eq!(box_twice(&config, source), expected);
}

#[test]
fn test_custom_toggle_and_prefix() {
    let config = BoxConfig {
        toggle_name: "tracing_tags_enabled".to_string(),
        tags_prefix: "acme_".to_string(),
        ..BoxConfig::default()
    };
    let source = resource(r#"merge({ yor_trace = "a" }, { acme_yor_trace = "b" })"#);
    assert_eq!(
        box_twice(&config, &source),
        resource(
            r#"merge({ yor_trace = "a" }, (var.tracing_tags_enabled ? { acme_yor_trace = "b" } : {}))"#
        )
    );
}

#[test]
fn test_template_can_use_dir_path() {
    let config = BoxConfig {
        box_template:
            "(var.{{ toggleName }} ? /*<box>*/ {} /*</box>*/ : { dir = \"{{ dirPath }}\" })"
                .to_string(),
        ..BoxConfig::default()
    };
    let boxer = Boxer::new(&config, Path::new("modules/s3")).unwrap();
    assert_eq!(
        box_source(&resource(r#"{ yor_trace = "t" }"#), &boxer).unwrap(),
        resource(r#"(var.yor_toggle ? { yor_trace = "t" } : { dir = "modules/s3" })"#)
    );
}

#[test]
fn test_migration_to_comprehension() {
    let config = BoxConfig {
        box_template: COMPREHENSION.to_string(),
        old_box_template: Some(DEFAULT_BOX_TEMPLATE.to_string()),
        ..BoxConfig::default()
    };
    assert_eq!(
        box_twice(
            &config,
            &resource(r#"(var.yor_toggle ? { yor_trace = "t1" } : {})"#)
        ),
        resource(r#"{ for k, v in { yor_trace = "t1" } : k => v if var.yor_toggle }"#)
    );
}

#[test]
fn test_migration_leaves_unrelated_ternaries() {
    let config = BoxConfig {
        box_template: COMPREHENSION.to_string(),
        old_box_template: Some(DEFAULT_BOX_TEMPLATE.to_string()),
        ..BoxConfig::default()
    };
    let source = resource(r#"merge((var.yor_toggle ? { env = "dev" } : {}), { a = 1 })"#);
    assert_eq!(box_twice(&config, &source), source);
}

#[test]
fn test_unbox_restores_the_original() {
    let boxer = boxer(&BoxConfig::default());
    let source = r#"resource "azurerm_kubernetes_cluster" "main" {
  tags = merge(var.tags, {
    git_commit = "bb858b14"
  }, { env = "app" })
}
"#;
    let boxed = box_source(source, &boxer).unwrap();
    assert_ne!(boxed, source);
    assert_eq!(unbox_source(&boxed, &boxer).unwrap(), source);
}

#[test]
fn test_broken_templates_are_rejected() {
    let config = BoxConfig {
        box_template: "(var.{{ toggleName }} ? {} : {})".to_string(),
        ..BoxConfig::default()
    };
    assert!(matches!(
        Boxer::new(&config, Path::new(".")),
        Err(TemplateError::MissingBegin)
    ));

    let config = BoxConfig {
        box_template: "(var.{{ toggle }} ? /*<box>*/ {} /*</box>*/ : {})".to_string(),
        ..BoxConfig::default()
    };
    assert!(matches!(
        Boxer::new(&config, Path::new(".")),
        Err(TemplateError::Render(_))
    ));
}
