use tempfile::TempDir;
use tracing::info;
use viper_ast::NodeKind;
use viper_diagnostics::DiagnosticKind;
use viperc::ViperC;

mod common;

#[test_log::test]
fn included_declaration_is_parsed_once() -> eyre::Result<()> {
    let dir = common::source_dir(&[
        ("a.vp", "#include \"b\"\n"),
        ("b.vp", "let x: i32 = 0;\n"),
    ])?;
    let viper_c = ViperC::builder().build()?;
    let output = viper_c.compile(&dir.path().join("a.vp"));
    info!("ast:\n{}", output.ast.print_tree());

    assert!(output.is_ok(), "{}", output.render_diagnostics());
    let declarations = output
        .ast
        .walk()
        .filter_map(|(_, node)| match node.kind() {
            NodeKind::VariableDeclaration { name, value, .. } => Some((name.clone(), *value)),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(declarations.len(), 1);
    let (name, value) = &declarations[0];
    assert_eq!(name, "x");
    assert_eq!(output.ast[*value].kind(), &NodeKind::Integer(0));
    assert_eq!(output.units.len(), 2);
    Ok(())
}

#[test_log::test]
fn includes_are_found_in_search_paths() -> eyre::Result<()> {
    let dir = common::source_dir(&[("main.vp", "#include shared\nproc main() { answer; }\n")])?;
    let lib = TempDir::new()?;
    common::write_sources(lib.path(), &[("shared.vp", "let answer: i32 = 42;\n")])?;

    let viper_c = ViperC::builder().search_path(lib.path()).build()?;
    let output = viper_c.compile(&dir.path().join("main.vp"));
    assert!(output.is_ok(), "{}", output.render_diagnostics());
    assert_eq!(
        output.ast.print_tree(),
        "let <answer>: <i32> = 42\nproc <main>: <void> () {\n    answer\n}\n\n"
    );
    Ok(())
}

#[test_log::test]
fn cyclic_include_fails_compilation() -> eyre::Result<()> {
    let dir = common::source_dir(&[
        ("a.vp", "#include b\nlet a: i32 = 1;\n"),
        ("b.vp", "#include a\nlet b: i32 = 2;\n"),
    ])?;
    let viper_c = ViperC::builder().build()?;
    let output = viper_c.compile(&dir.path().join("a.vp"));

    assert!(!output.is_ok());
    assert_eq!(output.diagnostics.fatals().count(), 1);
    assert_eq!(output.ast.roots().len(), 2, "both declarations still parse");
    let rendered = output.render_diagnostics();
    assert!(rendered.starts_with("fatal: cyclic dependency"), "{rendered}");
    assert!(rendered.contains("-> "), "{rendered}");
    Ok(())
}

#[test_log::test]
fn warnings_as_errors_escalates() -> eyre::Result<()> {
    let dir = common::source_dir(&[("main.vp", "#pragma once\nlet y: i32 = 0;\n")])?;

    let lenient = ViperC::builder().build()?;
    let output = lenient.compile(&dir.path().join("main.vp"));
    assert!(!output.diagnostics.has_fatal());
    assert_eq!(output.diagnostics.warnings().count(), 1);

    let strict = ViperC::builder().warnings_as_errors(true).build()?;
    let output = strict.compile(&dir.path().join("main.vp"));
    let fatals = output.diagnostics.fatals().collect::<Vec<_>>();
    assert_eq!(fatals.len(), 1);
    assert_eq!(
        fatals[0].kind(),
        &DiagnosticKind::UnknownDirective("pragma".to_string())
    );
    assert!(!output.is_ok());
    Ok(())
}

#[test_log::test]
fn syntax_errors_fail_compilation() -> eyre::Result<()> {
    let dir = common::source_dir(&[("main.vp", "let y: = 0;\nlet z: i32 = 1;\n")])?;
    let viper_c = ViperC::builder().build()?;
    let output = viper_c.compile(&dir.path().join("main.vp"));
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.syntax_errors.len(), 1);
    assert!(!output.is_ok());
    Ok(())
}

#[test_log::test]
fn missing_file_is_fatal() -> eyre::Result<()> {
    let dir = TempDir::new()?;
    let viper_c = ViperC::builder().build()?;
    let output = viper_c.compile(&dir.path().join("nothing.vp"));
    assert!(output.unit.is_none());
    assert!(output.ast.is_empty());
    let diagnostics = output.diagnostics.into_vec();
    let [fatal] = &diagnostics[..] else {
        panic!("expected exactly one diagnostic");
    };
    assert!(matches!(fatal.kind(), DiagnosticKind::Io { .. }));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn deeply_nested_source_is_a_syntax_error() -> eyre::Result<()> {
    let depth = 2000;
    let nested = format!("let x: i32 = {}1{};\n", "(".repeat(depth), ")".repeat(depth));
    let mut files = vec![("deep.vp".to_string(), format!("#include f0\n{nested}"))];
    files.extend((0..depth).map(|i| {
        let body = if i + 1 < depth {
            format!("#include f{}\n", i + 1)
        } else {
            "let y: i32 = 1;\n".to_string()
        };
        (format!("f{i}.vp"), body)
    }));
    let borrowed = files
        .iter()
        .map(|(path, content)| (path.as_str(), content.as_str()))
        .collect::<Vec<_>>();
    let dir = common::source_dir(&borrowed)?;

    let viper_c = ViperC::builder().jobs(1).build()?;
    let outputs = viper_c.compile_all(vec![dir.path().join("deep.vp")]).await?;
    let [output] = &outputs[..] else {
        panic!("expected exactly one output");
    };
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.units.len(), depth + 1);
    assert_eq!(output.syntax_errors.len(), 1);
    let roots = output.ast.roots();
    assert_eq!(roots.len(), 2);
    assert!(matches!(
        output.ast[roots[0]].kind(),
        NodeKind::VariableDeclaration { .. }
    ));
    assert!(output.ast[roots[1]].kind().is_invalid());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn compile_all_keeps_order() -> eyre::Result<()> {
    let files = (0..8)
        .map(|i| (format!("file{i}.vp"), format!("let v{i}: i32 = {i};\n")))
        .collect::<Vec<_>>();
    let borrowed = files
        .iter()
        .map(|(path, content)| (path.as_str(), content.as_str()))
        .collect::<Vec<_>>();
    let dir = common::source_dir(&borrowed)?;
    let paths = files
        .iter()
        .map(|(path, _)| dir.path().join(path))
        .collect::<Vec<_>>();

    let viper_c = ViperC::builder().jobs(2).build()?;
    let outputs = viper_c.compile_all(paths.clone()).await?;

    assert_eq!(outputs.len(), paths.len());
    for (i, (output, path)) in outputs.iter().zip(&paths).enumerate() {
        assert_eq!(&output.path, path);
        assert!(output.is_ok());
        assert_eq!(
            output.ast.print_tree(),
            format!("let <v{i}>: <i32> = {i}\n")
        );
    }
    Ok(())
}
