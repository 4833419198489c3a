#[cfg(test)]
mod interpreter_tests {
    use std::io::{self, Write};

    use rox::RunError;

    /// Runs `source`, returning everything printed and the error, if any.
    fn run(source: &str) -> (String, Option<RunError>) {
        let mut out: Vec<u8> = Vec::new();
        let result = rox::run(source, &mut out);
        let printed = String::from_utf8(out).expect("output is utf-8");

        (printed, result.err())
    }

    fn assert_prints(source: &str, expected: &str) {
        let (printed, error) = run(source);
        if let Some(e) = error {
            panic!("unexpected error: {}", e);
        }
        assert_eq!(printed, expected);
    }

    fn runtime_error(source: &str) -> (String, String) {
        match run(source) {
            (printed, Some(e @ RunError::Runtime(_))) => {
                assert_eq!(e.exit_code(), 70);
                (printed, e.to_string())
            }
            (_, other) => panic!("expected a runtime error, got {:?}", other),
        }
    }

    // ───────────────────────────── expressions ─────────────────────────────

    #[test]
    fn test_arithmetic_and_concatenation() {
        assert_prints(
            "print 1 + 2; print \"a\" + \"b\"; print (1 + 2) * 3 - 4 / 2; print -3;",
            "3\nab\n7\n-3\n",
        );
    }

    #[test]
    fn test_adding_number_and_string_is_a_runtime_error() {
        let (_, message) = runtime_error("print 1 + \"a\";");
        assert_eq!(message, "Operands must be two numbers or two strings.\n[line 1]");
    }

    #[test]
    fn test_comparison_needs_numbers() {
        let (_, message) = runtime_error("print \"a\" < 1;");
        assert_eq!(message, "Operands must be numbers.\n[line 1]");

        let (_, message) = runtime_error("print -\"a\";");
        assert_eq!(message, "Operand must be a number.\n[line 1]");
    }

    #[test]
    fn test_value_rendering() {
        assert_prints(
            "print nil; print true; print false; print 2.5; print 10; print \"s\";
             fun f() {} print f;
             class Foo {} print Foo; print Foo();",
            "nil\ntrue\nfalse\n2.5\n10\ns\n<fn f>\nFoo\nFoo instance\n",
        );
    }

    #[test]
    fn test_division_by_zero_is_infinite() {
        assert_prints("print 1 / 0; print -1 / 0;", "inf\n-inf\n");
    }

    #[test]
    fn test_truthiness_and_logical_operators() {
        assert_prints(
            "print nil or \"yes\"; print 0 and \"zero is truthy\"; print false and crash;
             print !nil; print !\"\";",
            "yes\nzero is truthy\nfalse\ntrue\nfalse\n",
        );
    }

    #[test]
    fn test_equality_across_kinds() {
        assert_prints(
            "print 1 == 1; print 1 == \"1\"; print nil == nil; print nil == false;
             print \"a\" == \"a\"; print 1 != 2;
             class A {} var a = A(); var b = a; print a == b; print a == A();",
            "true\nfalse\ntrue\nfalse\ntrue\ntrue\ntrue\nfalse\n",
        );
    }

    // ──────────────────────────── variables ───────────────────────────────

    #[test]
    fn test_block_shadowing() {
        assert_prints(
            "var a = \"outer\"; { var a = \"inner\"; print a; } print a;",
            "inner\nouter\n",
        );
    }

    #[test]
    fn test_uninitialized_variable_is_nil() {
        assert_prints("var a; print a;", "nil\n");
    }

    #[test]
    fn test_undefined_variable() {
        let (_, message) = runtime_error("print missing;");
        assert_eq!(message, "Undefined variable 'missing'.\n[line 1]");

        let (_, message) = runtime_error("missing = 1;");
        assert_eq!(message, "Undefined variable 'missing'.\n[line 1]");
    }

    #[test]
    fn test_closure_sees_binding_at_declaration() {
        assert_prints(
            "var a = \"global\";
             {
               fun show() { print a; }
               show();
               var a = \"block\";
               show();
             }",
            "global\nglobal\n",
        );
    }

    // ──────────────────────────── control flow ────────────────────────────

    #[test]
    fn test_if_else_and_while() {
        assert_prints(
            "if (1 > 2) print \"no\"; else print \"yes\";
             var i = 0; while (i < 3) { print i; i = i + 1; }",
            "yes\n0\n1\n2\n",
        );
    }

    #[test]
    fn test_for_loop_counts() {
        assert_prints("for (var i = 0; i < 3; i = i + 1) print i;", "0\n1\n2\n");
    }

    #[test]
    fn test_for_loop_closures_capture_each_iteration() {
        assert_prints(
            "var a; var b; var c;
             for (var i = 0; i < 3; i = i + 1) {
               fun f() { print i; }
               if (i == 0) a = f;
               if (i == 1) b = f;
               if (i == 2) c = f;
             }
             a(); b(); c();",
            "0\n1\n2\n",
        );
    }

    #[test]
    fn test_for_loop_body_writes_reach_the_increment() {
        assert_prints(
            "for (var i = 0; i < 10; i = i + 1) { i = i + 4; print i; }",
            "4\n9\n",
        );
    }

    #[test]
    fn test_return_from_inside_loop() {
        assert_prints(
            "fun first(n) { for (var i = 0; i < 100; i = i + 1) { if (i >= n) return i; } return -1; }
             print first(3);
             fun spin() { while (true) { return \"done\"; } }
             print spin();",
            "3\ndone\n",
        );
    }

    // ───────────────────────────── functions ──────────────────────────────

    #[test]
    fn test_recursion() {
        assert_prints(
            "fun fib(n) { if (n < 2) return n; return fib(n - 2) + fib(n - 1); }
             print fib(15);",
            "610\n",
        );
    }

    #[test]
    fn test_counter_closure() {
        assert_prints(
            "fun makeCounter() {
               var count = 0;
               fun counter() { count = count + 1; return count; }
               return counter;
             }
             var c = makeCounter();
             print c(); print c();
             var d = makeCounter();
             print d();",
            "1\n2\n1\n",
        );
    }

    #[test]
    fn test_function_without_return_yields_nil() {
        assert_prints("fun f() {} print f(); fun g() { return; } print g();", "nil\nnil\n");
    }

    #[test]
    fn test_arity_mismatch() {
        let (_, message) = runtime_error("fun f(a, b) {}\nf(1);");
        assert_eq!(message, "Expected 2 arguments but got 1.\n[line 2]");
    }

    #[test]
    fn test_calling_a_non_callable() {
        let (_, message) = runtime_error("\"text\"();");
        assert_eq!(message, "Can only call functions and classes.\n[line 1]");
    }

    // ────────────────────────────── classes ───────────────────────────────

    #[test]
    fn test_fields_and_methods() {
        assert_prints(
            "class Point {
               init(x, y) { this.x = x; this.y = y; }
               sum() { return this.x + this.y; }
             }
             var p = Point(1, 2);
             print p.sum();
             p.x = 10;
             print p.x;
             p.label = \"origin-ish\";
             print p.label;",
            "3\n10\norigin-ish\n",
        );
    }

    #[test]
    fn test_bound_method_remembers_receiver() {
        assert_prints(
            "class Greeter { init(name) { this.name = name; } hi() { print \"hi \" + this.name; } }
             var hi = Greeter(\"bob\").hi;
             hi();",
            "hi bob\n",
        );
    }

    #[test]
    fn test_initializer_returns_this() {
        assert_prints(
            "class A { init() { this.n = 1; return; } }
             var a = A();
             print a.init() == a;
             print a.n;",
            "true\n1\n",
        );
    }

    #[test]
    fn test_class_arity_follows_init() {
        let (_, message) = runtime_error("class A { init(a) {} }\nA();");
        assert_eq!(message, "Expected 1 arguments but got 0.\n[line 2]");

        let (_, message) = runtime_error("class B {}\nB(1);");
        assert_eq!(message, "Expected 0 arguments but got 1.\n[line 2]");
    }

    #[test]
    fn test_inheritance_and_super() {
        assert_prints(
            "class A { method() { return \"A method\"; } both() { return \"A\"; } }
             class B < A { both() { return \"B then \" + super.both(); } }
             class C < B {}
             var c = C();
             print c.method();
             print c.both();",
            "A method\nB then A\n",
        );
    }

    #[test]
    fn test_super_binds_to_the_defining_class() {
        assert_prints(
            "class A { say() { print \"A\"; } }
             class B < A { say() { print \"B\"; } test() { super.say(); } }
             class C < B {}
             C().test();",
            "A\n",
        );
    }

    #[test]
    fn test_inherited_initializer() {
        assert_prints(
            "class A { init(v) { this.v = v; } }
             class B < A {}
             print B(7).v;",
            "7\n",
        );
    }

    #[test]
    fn test_superclass_must_be_a_class() {
        let (_, message) = runtime_error("var NotAClass = 1;\nclass B < NotAClass {}");
        assert_eq!(message, "Superclass must be a class.\n[line 2]");
    }

    #[test]
    fn test_property_errors() {
        let (_, message) = runtime_error("class A {}\nprint A().missing;");
        assert_eq!(message, "Undefined property 'missing'.\n[line 2]");

        let (_, message) = runtime_error("var x = 1;\nprint x.field;");
        assert_eq!(message, "Only instances have properties.\n[line 2]");

        let (_, message) = runtime_error("var x = 1;\nx.field = 2;");
        assert_eq!(message, "Only instances have fields.\n[line 2]");
    }

    #[test]
    fn test_super_method_missing() {
        let (_, message) =
            runtime_error("class A {}\nclass B < A { f() { return super.nope; } }\nB().f();");
        assert_eq!(message, "Undefined property 'nope'.\n[line 2]");
    }

    // ───────────────────────────── pipeline ───────────────────────────────

    #[test]
    fn test_output_before_runtime_error_is_kept() {
        let (printed, message) = runtime_error("print \"before\";\nprint nil + 1;\nprint \"after\";");
        assert_eq!(printed, "before\n");
        assert_eq!(message, "Operands must be two numbers or two strings.\n[line 2]");
    }

    #[test]
    fn test_static_errors_prevent_execution() {
        let (printed, error) = run("print \"never\";\nclass B < B {}");
        assert_eq!(printed, "");

        match error {
            Some(e @ RunError::Static(_)) => {
                assert_eq!(e.exit_code(), 65);
                assert_eq!(
                    e.to_string(),
                    "[line 2] Error at 'B': A class can't inherit from itself."
                );
            }
            other => panic!("expected static error, got {:?}", other),
        }
    }

    #[test]
    fn test_every_parse_error_is_reported() {
        let (printed, error) = run("var = 2;\nprint \"never\";\nprint (;");
        assert_eq!(printed, "");

        let Some(RunError::Static(errors)) = error else {
            panic!("expected static errors");
        };
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_scan_errors_stop_the_pipeline() {
        let (printed, error) = run("print 1; @");
        assert_eq!(printed, "");

        match error {
            Some(e @ RunError::Static(_)) => {
                assert_eq!(e.to_string(), "[line 1] Error: Unexpected character.")
            }
            other => panic!("expected scan error, got {:?}", other),
        }
    }

    #[test]
    fn test_staged_api_keeps_globals() {
        let scanned = rox::scan("var answer = 42; print answer;");
        let parsed = rox::parse(&scanned.tokens);
        let resolved = rox::resolve(&parsed.statements);

        let mut interpreter = rox::interpreter::Interpreter::new(resolved.locals, Vec::new());
        interpreter
            .interpret(&parsed.statements)
            .expect("program runs");

        {
            let globals = interpreter.globals().borrow();
            let answer = globals
                .get(&scanned.tokens[1])
                .expect("answer is defined");
            assert_eq!(answer.to_string(), "42");
        }

        assert_eq!(interpreter.into_output(), b"42\n");
    }

    #[test]
    fn test_runtime_error_carries_line_and_message() {
        let (_, error) = run("var a = 1;\n\nprint a();");

        let Some(RunError::Runtime(e)) = error else {
            panic!("expected a runtime error");
        };
        assert_eq!(e.line(), Some(3));
        assert_eq!(e.message(), "Can only call functions and classes.");
    }

    // ──────────────────────────── deep nesting ────────────────────────────

    #[test]
    fn test_deep_but_finite_recursion() {
        assert_prints(
            "fun f(n) { if (n == 0) return 0; return f(n - 1) + 1; }
             print f(1500);",
            "1500\n",
        );
    }

    #[test]
    fn test_unbounded_recursion_is_a_runtime_error() {
        let (printed, error) = run("print \"start\";\nfun f(n) { return f(n + 1); }\nf(0);");
        assert_eq!(printed, "start\n");

        match error {
            Some(RunError::Runtime(e)) => {
                assert_eq!(e.message(), "Stack overflow.");
                assert_eq!(e.line(), Some(2));
            }
            other => panic!("expected a runtime error, got {:?}", other),
        }
    }

    #[test]
    fn test_recursion_depth_resets_after_an_error() {
        let declarations = rox::scan("fun f() { f(); } fun g(n) { if (n > 0) g(n - 1); }");
        let runaway = rox::scan("f();");
        let bounded = rox::scan("g(1000);");

        let declarations_ast = rox::parse(&declarations.tokens);
        let runaway_ast = rox::parse(&runaway.tokens);
        let bounded_ast = rox::parse(&bounded.tokens);
        let resolved = rox::resolve(&declarations_ast.statements);

        let mut interpreter = rox::interpreter::Interpreter::new(resolved.locals, Vec::new());
        interpreter
            .interpret(&declarations_ast.statements)
            .expect("declarations run");

        assert!(interpreter.interpret(&runaway_ast.statements).is_err());

        // a fresh chain of calls still gets the full depth
        interpreter
            .interpret(&bounded_ast.statements)
            .expect("depth was released");
    }

    #[test]
    fn test_deeply_nested_expression() {
        let depth = 1000;
        let source = format!("print {}1{};", "(".repeat(depth), ")".repeat(depth));
        assert_prints(&source, "1\n");

        let source = format!("print {}true;", "!".repeat(depth));
        assert_prints(&source, "true\n");
    }

    #[test]
    fn test_deeply_nested_blocks() {
        let depth = 1000;
        let source = format!("{}print 1;{}", "{".repeat(depth), "}".repeat(depth));
        assert_prints(&source, "1\n");
    }

    // ────────────────────────────── output ────────────────────────────────

    /// Accepts writes but refuses to flush.
    struct UnflushableSink(Vec<u8>);

    impl Write for UnflushableSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "flush refused"))
        }
    }

    #[test]
    fn test_runtime_error_wins_over_flush_failure() {
        let result = rox::run("print 1;\nprint nil + 1;", UnflushableSink(Vec::new()));

        match result {
            Err(RunError::Runtime(e)) => {
                assert_eq!(e.message(), "Operands must be two numbers or two strings.");
                assert_eq!(e.line(), Some(2));
            }
            other => panic!("expected the runtime error, got {:?}", other),
        }
    }

    #[test]
    fn test_flush_failure_is_reported_after_success() {
        let result = rox::run("print 1;", UnflushableSink(Vec::new()));

        match result {
            Err(RunError::Runtime(rox::LoxError::Io(e))) => assert_eq!(e.to_string(), "flush refused"),
            other => panic!("expected an io error, got {:?}", other),
        }
    }
}
