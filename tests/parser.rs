#[cfg(test)]
mod parser_tests {
    use std::collections::HashSet;

    use rox::ast::{Expr, ExprId, Stmt};
    use rox::scanner::scan;
    use rox::token::{Literal, TokenType};

    /// Scan + parse, returning the rendered parse errors.
    fn parse_errors(source: &str) -> Vec<String> {
        let scanned = scan(source);
        assert!(!scanned.had_error(), "unexpected scan errors");

        let parsed = rox::parse(&scanned.tokens);
        parsed.errors.iter().map(|e| e.to_string()).collect()
    }

    fn collect_ids(stmt: &Stmt, ids: &mut Vec<ExprId>) {
        match stmt {
            Stmt::Expression(e) | Stmt::Print(e) => collect_expr_ids(e, ids),
            Stmt::Var { initializer, .. } => {
                if let Some(e) = initializer {
                    collect_expr_ids(e, ids);
                }
            }
            Stmt::Block(stmts) => stmts.iter().for_each(|s| collect_ids(s, ids)),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                collect_expr_ids(condition, ids);
                collect_ids(then_branch, ids);
                if let Some(e) = else_branch {
                    collect_ids(e, ids);
                }
            }
            Stmt::While { condition, body } => {
                collect_expr_ids(condition, ids);
                collect_ids(body, ids);
            }
            Stmt::Function(decl) => decl.body.iter().for_each(|s| collect_ids(s, ids)),
            Stmt::Return { value, .. } => {
                if let Some(e) = value {
                    collect_expr_ids(e, ids);
                }
            }
            Stmt::Class {
                superclass,
                methods,
                ..
            } => {
                if let Some(e) = superclass {
                    collect_expr_ids(e, ids);
                }
                for m in methods {
                    m.body.iter().for_each(|s| collect_ids(s, ids));
                }
            }
        }
    }

    fn collect_expr_ids(expr: &Expr, ids: &mut Vec<ExprId>) {
        match expr {
            Expr::Literal(_) => {}
            Expr::Unary { right, .. } => collect_expr_ids(right, ids),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                collect_expr_ids(left, ids);
                collect_expr_ids(right, ids);
            }
            Expr::Grouping(e) => collect_expr_ids(e, ids),
            Expr::Variable { id, .. } | Expr::This { id, .. } | Expr::Super { id, .. } => {
                ids.push(*id)
            }
            Expr::Assign { id, value, .. } => {
                ids.push(*id);
                collect_expr_ids(value, ids);
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                collect_expr_ids(callee, ids);
                arguments.iter().for_each(|a| collect_expr_ids(a, ids));
            }
            Expr::Get { object, .. } => collect_expr_ids(object, ids),
            Expr::Set { object, value, .. } => {
                collect_expr_ids(object, ids);
                collect_expr_ids(value, ids);
            }
        }
    }

    #[test]
    fn test_factor_binds_tighter_than_term() {
        let scanned = scan("1 + 2 * 3;");
        let parsed = rox::parse(&scanned.tokens);
        assert!(!parsed.had_error());

        let Stmt::Expression(Expr::Binary {
            left,
            operator,
            right,
        }) = &parsed.statements[0]
        else {
            panic!("expected a binary expression statement");
        };

        assert_eq!(operator.token_type, TokenType::PLUS);
        assert_eq!(**left, Expr::Literal(Literal::Number(1.0)));
        match &**right {
            Expr::Binary { operator, .. } => assert_eq!(operator.token_type, TokenType::STAR),
            other => panic!("expected 2 * 3, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let scanned = scan("a = b = 1;");
        let parsed = rox::parse(&scanned.tokens);
        assert!(!parsed.had_error());

        let Stmt::Expression(Expr::Assign { name, value, .. }) = &parsed.statements[0] else {
            panic!("expected assignment");
        };
        assert_eq!(name.lexeme, "a");
        assert!(matches!(&**value, Expr::Assign { name, .. } if name.lexeme == "b"));
    }

    #[test]
    fn test_property_assignment_becomes_set() {
        let scanned = scan("a.b.c = 1;");
        let parsed = rox::parse(&scanned.tokens);
        assert!(!parsed.had_error());

        let Stmt::Expression(Expr::Set { object, name, .. }) = &parsed.statements[0] else {
            panic!("expected set expression");
        };
        assert_eq!(name.lexeme, "c");
        assert!(matches!(&**object, Expr::Get { name, .. } if name.lexeme == "b"));
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(
            parse_errors("1 + 2 = 3;"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
    }

    #[test]
    fn test_missing_semicolon_at_end() {
        assert_eq!(
            parse_errors("print 1"),
            vec!["[line 1] Error at end: Expect ';' after value."]
        );
    }

    #[test]
    fn test_recovers_and_reports_every_statement() {
        let errors = parse_errors("var = 1;\nprint (2;\nvar ok = 3;\nfun () {}\n");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '=': Expect variable name.",
                "[line 2] Error at ';': Expect ')' after expression.",
                "[line 4] Error at '(': Expect function name.",
            ]
        );
    }

    #[test]
    fn test_errors_inside_blocks_keep_the_block() {
        let scanned = scan("{ print ; print 1; }");
        let parsed = rox::parse(&scanned.tokens);

        assert_eq!(parsed.errors.len(), 1);
        match &parsed.statements[..] {
            [Stmt::Block(inner)] => assert_eq!(inner.len(), 1),
            other => panic!("expected one block, got {:?}", other),
        }
    }

    #[test]
    fn test_too_many_arguments() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});", args.join(", "));

        let errors = parse_errors(&source);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with("Can't have more than 255 arguments."));
    }

    #[test]
    fn test_too_many_parameters() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));

        let errors = parse_errors(&source);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with("Error at 'p255': Can't have more than 255 parameters."));
    }

    #[test]
    fn test_for_without_var_desugars_to_while() {
        let scanned = scan("for (i = 0; i < 3; i = i + 1) print i;");
        let parsed = rox::parse(&scanned.tokens);
        assert!(!parsed.had_error());

        let [Stmt::Block(outer)] = &parsed.statements[..] else {
            panic!("expected block around the loop");
        };
        assert!(matches!(outer[0], Stmt::Expression(Expr::Assign { .. })));

        let Stmt::While { body, .. } = &outer[1] else {
            panic!("expected while");
        };
        match &**body {
            Stmt::Block(parts) => {
                assert!(matches!(parts[0], Stmt::Print(_)));
                assert!(matches!(parts[1], Stmt::Expression(Expr::Assign { .. })));
            }
            other => panic!("expected body + increment, got {:?}", other),
        }
    }

    #[test]
    fn test_for_with_empty_clauses_loops_on_true() {
        let scanned = scan("for (;;) print 1;");
        let parsed = rox::parse(&scanned.tokens);
        assert!(!parsed.had_error());

        match &parsed.statements[..] {
            [Stmt::While { condition, body }] => {
                assert_eq!(*condition, Expr::Literal(Literal::Bool(true)));
                assert!(matches!(**body, Stmt::Print(_)));
            }
            other => panic!("expected bare while, got {:?}", other),
        }
    }

    #[test]
    fn test_for_var_gets_a_binding_per_iteration() {
        let scanned = scan("for (var i = 0; i < 3; i = i + 1) print i;");
        let parsed = rox::parse(&scanned.tokens);
        assert!(!parsed.had_error());

        let [Stmt::Block(outer)] = &parsed.statements[..] else {
            panic!("expected block around the loop");
        };
        assert!(matches!(&outer[0], Stmt::Var { name, .. } if name.lexeme == "i"));

        let Stmt::While { body, .. } = &outer[1] else {
            panic!("expected while");
        };
        let Stmt::Block(parts) = &**body else {
            panic!("expected iteration + increment");
        };
        let Stmt::Block(iteration) = &parts[0] else {
            panic!("expected iteration block");
        };

        // the copy of the loop variable lives in a nested block
        let Stmt::Block(fresh) = &iteration[1] else {
            panic!("expected per-iteration block");
        };
        assert!(matches!(&fresh[0], Stmt::Var { name, .. } if name.lexeme == "i"));
        assert!(matches!(fresh[1], Stmt::Print(_)));
    }

    #[test]
    fn test_class_with_superclass_and_methods() {
        let scanned = scan("class B < A { init(x) { this.x = x; } get() { return super.get(); } }");
        let parsed = rox::parse(&scanned.tokens);
        assert!(!parsed.had_error());

        let Stmt::Class {
            name,
            superclass,
            methods,
        } = &parsed.statements[0]
        else {
            panic!("expected class");
        };

        assert_eq!(name.lexeme, "B");
        assert!(matches!(superclass, Some(Expr::Variable { name, .. }) if name.lexeme == "A"));
        let names: Vec<&str> = methods.iter().map(|m| m.name.lexeme).collect();
        assert_eq!(names, vec!["init", "get"]);
        assert_eq!(methods[0].params.len(), 1);
    }

    #[test]
    fn test_super_requires_a_method_name() {
        assert_eq!(
            parse_errors("super;"),
            vec!["[line 1] Error at ';': Expect '.' after 'super'."]
        );
    }

    #[test]
    fn test_expression_ids_are_unique() {
        let scanned = scan("var a = a; a = a; fun f(x) { return x + this + a; } for (var i = 0; i < 1; i = i + 1) a;");
        let parsed = rox::parse(&scanned.tokens);
        assert!(!parsed.had_error());

        let mut ids = Vec::new();
        parsed.statements.iter().for_each(|s| collect_ids(s, &mut ids));

        let unique: HashSet<ExprId> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.len() > 8);
    }

    #[test]
    fn test_parse_without_eof_token_does_not_panic() {
        let scanned = scan("print 1;");
        let without_eof = &scanned.tokens[..scanned.tokens.len() - 1];

        let parsed = rox::parse(without_eof);
        assert!(!parsed.had_error());
        assert_eq!(parsed.statements.len(), 1);
    }
}
