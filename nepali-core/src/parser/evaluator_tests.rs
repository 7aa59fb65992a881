use crate::parser::environment::Environment;
use crate::parser::error::RuntimeError;
use crate::parser::evaluator::{EvalConfig, Evaluator};
use crate::parser::parse;
use crate::types::{HashKey, Object, ObjectType};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Writer that keeps everything the print builtins produce
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn run_with(config: EvalConfig, input: &str) -> (Option<Object>, String) {
    let (program, errors) = parse(input);
    assert!(errors.is_empty(), "unexpected diagnostics for {:?}: {:?}", input, errors);

    let buffer = SharedBuffer::default();
    let mut evaluator = Evaluator::with_config(config).with_output(Box::new(buffer.clone()));
    let env = Environment::new().into_shared();
    let result = evaluator.eval_program(&program, &env);
    (result, buffer.contents())
}

fn eval(input: &str) -> Object {
    run_with(EvalConfig::default(), input)
        .0
        .unwrap_or(Object::Null)
}

fn eval_error(input: &str) -> RuntimeError {
    match eval(input) {
        Object::Error(error) => error,
        other => panic!("Expected error for {:?}, got {}", input, other),
    }
}

#[test]
fn test_integer_arithmetic() {
    let cases = [
        ("5", 5),
        ("-5", -5),
        ("५ + ५", 10),
        ("2 * (5 + 10)", 30),
        ("3 * 3 * 3 + 10", 37),
        ("50 / 2 * 2 + 10", 60),
        ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
        ("7 / 2", 3),
        ("-7 / 2", -3),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), Object::Integer(expected), "for {:?}", input);
    }
}

#[test]
fn test_integer_overflow_wraps() {
    assert_eq!(eval("9223372036854775807 + 1"), Object::Integer(i64::MIN));
    assert_eq!(eval("-9223372036854775807 - 2"), Object::Integer(i64::MAX));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(eval_error("1 / 0"), RuntimeError::DivisionByZero);
    assert_eq!(eval_error("1 / 0").to_string(), "division by zero");
}

#[test]
fn test_boolean_expressions() {
    let cases = [
        ("सत्य", true),
        ("मिथ्या", false),
        ("असत्य", false),
        ("1 < 2", true),
        ("1 > 2", false),
        ("2 <= 2", true),
        ("3 >= 4", false),
        ("1 == 1", true),
        ("1 != 1", false),
        ("सत्य == सत्य", true),
        ("सत्य != मिथ्या", true),
        ("(1 < 2) == सत्य", true),
        ("!सत्य", false),
        ("!!5", true),
        ("!0", false),
        ("!\"\"", false),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), Object::Boolean(expected), "for {:?}", input);
    }
}

#[test]
fn test_equality_rules() {
    assert_eq!(eval("\"क\" == \"क\""), Object::Boolean(true));
    assert_eq!(eval("\"क\" != \"ख\""), Object::Boolean(true));
    assert_eq!(eval("1 == सत्य"), Object::Boolean(false));
    assert_eq!(eval("\"1\" != 1"), Object::Boolean(true));
    assert_eq!(eval("[1] == [1]"), Object::Boolean(false));
    assert_eq!(eval("लेट a = [1]; a == a"), Object::Boolean(true));
    assert_eq!(eval("{} == {}"), Object::Boolean(false));
    assert_eq!(eval("लेट f = फन() {}; f == f"), Object::Boolean(true));
    assert_eq!(eval("लेन == लेन"), Object::Boolean(true));
}

#[test]
fn test_if_else_expressions() {
    let cases = [
        ("यदि (सत्य) { 10 }", Object::Integer(10)),
        ("यदि (मिथ्या) { 10 }", Object::Null),
        ("यदि (1) { 10 }", Object::Integer(10)),
        ("यदि (0) { 10 } अन्यथा { 20 }", Object::Integer(10)),
        ("यदि 1 > 2 { 10 } अन्यथा { 20 }", Object::Integer(20)),
        ("यदि (सत्य) { }", Object::Null),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), expected, "for {:?}", input);
    }
}

#[test]
fn test_return_statements() {
    let cases = [
        ("प्रतिफल 10;", 10),
        ("प्रतिफल 10; 9;", 10),
        ("9; प्रतिफल 2 * 5; 9;", 10),
        ("यदि (10 > 1) { यदि (10 > 1) { प्रतिफल 10; } प्रतिफल 1; }", 10),
        (
            "लेट f = फन(x) { यदि (x > 1) { प्रतिफल x; } प्रतिफल 0; }; f(5) + 1",
            6,
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), Object::Integer(expected), "for {:?}", input);
    }
}

#[test]
fn test_let_statements() {
    assert_eq!(eval("लेट a = 5; a;"), Object::Integer(5));
    assert_eq!(eval("संख्या a = 5 * 5; a;"), Object::Integer(25));
    assert_eq!(eval("लेट a = 5; लेट b = a; लेट c = a + b + 5; c;"), Object::Integer(15));
    assert_eq!(eval("लेट a = 1; लेट a = 2; a"), Object::Integer(2));
}

#[test]
fn test_program_without_value() {
    let (result, _) = run_with(EvalConfig::default(), "लेट a = 5;");
    assert_eq!(result, None);

    let (result, _) = run_with(EvalConfig::default(), "");
    assert_eq!(result, None);
}

#[test]
fn test_functions_and_closures() {
    let cases = [
        ("लेट identity = फन(x) { x; }; identity(5);", 5),
        ("लेट double = फन(x) { x * 2; }; double(5);", 10),
        ("लेट add = फन(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20),
        ("फन(x) { x; }(5)", 5),
        (
            "लेट newAdder = फन(x) { फन(y) { x + y }; }; लेट addTwo = newAdder(2); addTwo(3);",
            5,
        ),
        (
            "लेट x = 10; लेट f = फन() { x }; लेट x = 20; f()",
            20,
        ),
        (
            "लेट fib = फन(n) { यदि (n < 2) { n } अन्यथा { fib(n - 1) + fib(n - 2) } }; fib(15)",
            610,
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), Object::Integer(expected), "for {:?}", input);
    }
}

#[test]
fn test_parameters_shadow_without_leaking() {
    assert_eq!(
        eval("लेट x = 1; लेट f = फन(x) { x * 10 }; f(5) + x"),
        Object::Integer(51)
    );
    assert_eq!(
        eval_error("लेट f = फन() { लेट inner = 1; inner }; f(); inner"),
        RuntimeError::IdentifierNotFound("inner".to_string())
    );
}

#[test]
fn test_function_without_body_value() {
    assert_eq!(eval("लेट f = फन() { लेट a = 1; }; f()"), Object::Null);
    assert_eq!(eval("फन() {}()"), Object::Null);
}

#[test]
fn test_function_object() {
    match eval("फन(x) { x + 2; };") {
        Object::Function(function) => {
            assert_eq!(function.parameters, vec!["x".to_string()]);
            assert_eq!(function.body.to_string(), "{ (x + 2); }");
        }
        other => panic!("Expected function, got {:?}", other),
    }
}

#[test]
fn test_string_operations() {
    assert_eq!(eval("\"नमस्ते\""), Object::from("नमस्ते"));
    assert_eq!(eval("\"नमस्ते\" + \" \" + \"संसार\""), Object::from("नमस्ते संसार"));
    assert_eq!(
        eval_error("\"क\" - \"ख\""),
        RuntimeError::UnknownInfixOperator {
            left: ObjectType::String,
            operator: crate::parser::ast::InfixOperator::Minus,
            right: ObjectType::String,
        }
    );
}

#[test]
fn test_error_messages() {
    let cases = [
        ("5 + सत्य;", "type mismatch: INTEGER + BOOLEAN"),
        ("5 + सत्य; 5;", "type mismatch: INTEGER + BOOLEAN"),
        ("-सत्य", "unknown operator: -BOOLEAN"),
        ("-\"क\"", "unknown operator: -STRING"),
        ("सत्य + मिथ्या;", "unknown operator: BOOLEAN + BOOLEAN"),
        ("5; सत्य + मिथ्या; 5", "unknown operator: BOOLEAN + BOOLEAN"),
        ("यदि (10 > 1) { सत्य + मिथ्या; }", "unknown operator: BOOLEAN + BOOLEAN"),
        (
            "यदि (10 > 1) { यदि (10 > 1) { प्रतिफल सत्य + मिथ्या; } प्रतिफल 1; }",
            "unknown operator: BOOLEAN + BOOLEAN",
        ),
        ("foobar", "identifier not found: foobar"),
        ("\"क\" + 1", "type mismatch: STRING + INTEGER"),
        ("{\"नाम\": \"राम\"}[फन(x) { x }];", "unusable as hash key: FUNCTION"),
        ("{[1]: 2}", "unusable as hash key: ARRAY"),
        ("5[0]", "index operator not supported: INTEGER"),
        ("[1, 2][\"क\"]", "index operator not supported: ARRAY"),
        ("5(1)", "not a function: INTEGER"),
        ("लेट f = फन(x) { x }; f(1, 2)", "wrong number of arguments. got=2, want=1"),
        ("लेन(1)", "argument to `लेन` must be STRING or ARRAY, got INTEGER"),
        ("लेन(\"one\", \"two\")", "wrong number of arguments. got=2, want=1"),
    ];
    for (input, expected) in cases {
        assert_eq!(eval_error(input).to_string(), expected, "for {:?}", input);
    }
}

#[test]
fn test_errors_stop_argument_evaluation() {
    let (result, output) = run_with(
        EvalConfig::default(),
        "प्रिन्ट(missing, प्रिन्ट(\"never\"))",
    );
    assert_eq!(
        result,
        Some(Object::Error(RuntimeError::IdentifierNotFound("missing".to_string())))
    );
    assert_eq!(output, "");
}

#[test]
fn test_errors_are_not_stored() {
    let (program, _) = parse("लेट a = 1 / 0;");
    let env = Environment::new().into_shared();
    let result = Evaluator::new().eval_program(&program, &env);

    assert_eq!(result, Some(Object::Error(RuntimeError::DivisionByZero)));
    assert!(!env.borrow().is_defined("a"));
}

#[test]
fn test_arrays() {
    assert_eq!(
        eval("[1, 2 * 2, 3 + 3]"),
        Object::array(vec![Object::Integer(1), Object::Integer(4), Object::Integer(6)])
    );

    let cases = [
        ("[1, 2, 3][0]", Object::Integer(1)),
        ("[1, 2, 3][1 + 1]", Object::Integer(3)),
        ("लेट i = 0; [1][i];", Object::Integer(1)),
        ("लेट a = [1, 2, 3]; a[0] + a[1] + a[2];", Object::Integer(6)),
        ("[1, 2, 3][3]", Object::Null),
        ("[1, 2, 3][-1]", Object::Null),
        ("[][0]", Object::Null),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), expected, "for {:?}", input);
    }
}

#[test]
fn test_hashes() {
    let input = r#"
        लेट two = "two";
        {
            "one": 10 - 9,
            two: 1 + 1,
            "thr" + "ee": 6 / 2,
            4: 4,
            सत्य: 5,
            मिथ्या: 6
        }
    "#;
    match eval(input) {
        Object::Hash(hash) => {
            let expected = [
                (HashKey::String("one".into()), 1),
                (HashKey::String("two".into()), 2),
                (HashKey::String("three".into()), 3),
                (HashKey::Integer(4), 4),
                (HashKey::Boolean(true), 5),
                (HashKey::Boolean(false), 6),
            ];
            assert_eq!(hash.pairs.len(), expected.len());
            for (key, value) in expected {
                assert_eq!(hash.get(&key), Some(&Object::Integer(value)), "for {:?}", key);
            }
        }
        other => panic!("Expected hash, got {:?}", other),
    }
}

#[test]
fn test_hash_index() {
    let cases = [
        ("{\"foo\": 5}[\"foo\"]", Object::Integer(5)),
        ("{\"foo\": 5}[\"bar\"]", Object::Null),
        ("लेट key = \"foo\"; {\"foo\": 5}[key]", Object::Integer(5)),
        ("{}[\"foo\"]", Object::Null),
        ("{5: 5}[5]", Object::Integer(5)),
        ("{सत्य: 5}[सत्य]", Object::Integer(5)),
        ("{1: \"a\", 1: \"b\"}[1]", Object::from("b")),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), expected, "for {:?}", input);
    }
}

#[test]
fn test_builtins() {
    let cases = [
        ("लेन(\"\")", Object::Integer(0)),
        ("लेन(\"four\")", Object::Integer(4)),
        ("लेन(\"नमस्ते\")", Object::Integer(6)),
        ("लेन([1, 2, 3])", Object::Integer(3)),
        ("टाइप(\"क\")", Object::from("string")),
        ("टाइप(फन() {})", Object::from("function")),
        ("टाइप(लेन)", Object::from("builtin")),
        ("स्ट्रिंग(12) + \"!\"", Object::from("12!")),
        ("स्ट्रिंग(सत्य)", Object::from("सत्य")),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), expected, "for {:?}", input);
    }
}

#[test]
fn test_environment_shadows_builtins() {
    assert_eq!(eval("लेट लेन = फन(x) { 42 }; लेन(\"क\")"), Object::Integer(42));
}

#[test]
fn test_print_output() {
    let (result, output) = run_with(
        EvalConfig::default(),
        "संख्या x = ५\nलेख्नुहोस्(x)\nप्रिन्ट(\"क\", [1, 2], सत्य)\nप्रिन्टल(1, निल)",
    );
    // `निल` is an ordinary identifier, so the last call fails
    assert_eq!(
        result,
        Some(Object::Error(RuntimeError::IdentifierNotFound("निल".to_string())))
    );
    assert_eq!(output, "5\nक [1, 2] सत्य\n");

    let (result, output) = run_with(EvalConfig::default(), "प्रिन्टल(1, \"दुई\")");
    assert_eq!(result, Some(Object::Null));
    assert_eq!(output, "1\nदुई\n");
}

#[test]
fn test_call_depth_ceiling() {
    let input = "लेट loop = फन(n) { loop(n + 1) }; loop(0)";
    let (result, _) = run_with(EvalConfig::with_max_depth(50), input);
    assert_eq!(
        result,
        Some(Object::Error(RuntimeError::StackExhausted { limit: 50 }))
    );
    assert_eq!(
        RuntimeError::StackExhausted { limit: 50 }.to_string(),
        "stack exhausted: call depth exceeded 50"
    );

    let counter = "लेट down = फन(n) { यदि (n == 0) { 0 } अन्यथा { down(n - 1) } }; down(49)";
    let (result, _) = run_with(EvalConfig::with_max_depth(50), counter);
    assert_eq!(result, Some(Object::Integer(0)));
}

#[test]
fn test_deep_recursion_with_default_ceiling() {
    let input = "लेट sum = फन(n) { यदि (n == 0) { 0 } अन्यथा { n + sum(n - 1) } }; sum(1500)";
    assert_eq!(eval(input), Object::Integer(1500 * 1501 / 2));

    let runaway = "लेट f = फन() { f() }; f()";
    assert_eq!(
        eval_error(runaway),
        RuntimeError::StackExhausted { limit: 2000 }
    );
}

#[test]
fn test_deeply_nested_source_evaluates() {
    let nested = "-".repeat(200_000) + "1";
    assert_eq!(eval(&nested), Object::Integer(1));

    let chain = vec!["1"; 100_000].join(" + ");
    assert_eq!(eval(&chain), Object::Integer(100_000));
}

#[test]
fn test_evaluator_is_reusable_after_error() {
    let mut evaluator = Evaluator::with_config(EvalConfig::with_max_depth(10))
        .with_output(Box::new(SharedBuffer::default()));
    let env = Environment::new().into_shared();

    let (runaway, _) = parse("लेट f = फन() { f() }; f()");
    assert!(evaluator.eval_program(&runaway, &env).unwrap().is_error());

    let (program, _) = parse("लेट g = फन(n) { यदि (n == 0) { 0 } अन्यथा { g(n - 1) } }; g(9)");
    assert_eq!(evaluator.eval_program(&program, &env), Some(Object::Integer(0)));
}

#[test]
fn test_environment_persists_between_programs() {
    let mut evaluator = Evaluator::new().with_output(Box::new(SharedBuffer::default()));
    let env = Environment::new().into_shared();

    let (first, _) = parse("लेट x = 40; लेट add = फन(a) { a + x };");
    assert_eq!(evaluator.eval_program(&first, &env), None);

    let (second, _) = parse("add(2)");
    assert_eq!(evaluator.eval_program(&second, &env), Some(Object::Integer(42)));
}

#[test]
fn test_printed_program_evaluates_the_same() {
    let input = "लेट f = फन(a, b) { यदि a > b { a - b } अन्यथा { [a, b][1] * 2 } }; f(3, 5) + f(9, 4)";
    let (program, errors) = parse(input);
    assert!(errors.is_empty());

    let printed = program.to_string();
    let (reparsed, errors) = parse(&printed);
    assert!(errors.is_empty(), "diagnostics for {:?}: {:?}", printed, errors);

    assert_eq!(eval(input), Object::Integer(15));
    assert_eq!(eval(&printed), eval(input));
    assert_eq!(reparsed, program);
}
