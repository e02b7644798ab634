use std::fs;
use tempfile::TempDir;
use test_log::test;
use viper_ast::NodeKind;
use viper_ast_parsing::lexer::tokenize_file;
use viper_ast_parsing::parse;

const SOURCE: &str = r#"
// entry point
proc main(a: i32) -> f64 {
    let x: f64 = a * 2.5;
    x;
}

let y: i32 = 1 + 2 * 3;
"#;

#[test]
fn parse_file_and_print() {
    let dir = TempDir::new().expect("could not create temp dir");
    let path = dir.path().join("main.vp");
    fs::write(&path, SOURCE).expect("could not write source");

    let tokens = tokenize_file(&path).expect("could not tokenize");
    let output = parse(tokens);
    assert!(output.is_ok(), "{:?}", output.errors);
    assert_eq!(
        output.ast.print_tree(),
        "proc <main>: <f64> (<a>: <i32>, ) {\n    let <x>: <f64> = [2.500000 a]\n    x\n}\n\nlet <y>: <i32> = [[3 2] 1]\n"
    );
}

#[test]
fn every_node_has_one_owner() {
    let dir = TempDir::new().expect("could not create temp dir");
    let path = dir.path().join("broken.vp");
    fs::write(&path, "let a: i32 = (1 + ;\nproc f(x: i32) { x = ; x += 1; }\n!b;\n")
        .expect("could not write source");

    let output = parse(tokenize_file(&path).expect("could not tokenize"));
    assert_eq!(output.errors.len(), 2, "{:?}", output.errors);
    let ast = &output.ast;
    for (id, node) in ast.nodes() {
        let is_root = ast.roots().contains(&id);
        assert!(
            is_root != node.parent().is_some(),
            "{id} should have exactly one owner"
        );
    }
    assert_eq!(ast.walk().count(), ast.len());

    let invalid = ast.nodes().filter(|(_, n)| n.kind().is_invalid()).count();
    assert_eq!(invalid, 2);
    assert!(matches!(
        ast[ast.roots()[2]].kind(),
        NodeKind::ExpressionStatement { .. }
    ));
}

#[test]
fn syntax_errors_carry_locations() {
    let dir = TempDir::new().expect("could not create temp dir");
    let path = dir.path().join("located.vp");
    fs::write(&path, "let a: i32 = 1;\nlet b i32 = 2;\n").expect("could not write source");

    let output = parse(tokenize_file(&path).expect("could not tokenize"));
    let [error] = &output.errors[..] else {
        panic!("expected exactly one error, got {:?}", output.errors);
    };
    let location = error.location.as_ref().expect("error should be located");
    assert_eq!((location.line(), location.col()), (2, 7));
    assert!(error.to_string().contains("variable declaration"));
}
