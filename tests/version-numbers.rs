#[test]
fn test_readme_deps() {
    version_sync::assert_markdown_deps_updated!("README.md");
}

#[test]
fn test_readme_version() {
    version_sync::assert_contains_regex!("README.md", r#"^seidel = "{version}"$"#);
}
