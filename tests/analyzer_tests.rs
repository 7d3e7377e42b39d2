use chimerac::analyzer::{
    GlobalProcedureTable, GlobalSymbolTable, SemanticAnalyzer, SymbolKind, Type, Value,
};
use chimerac::error::SemanticError;
use chimerac::lexer::Scanner;
use chimerac::parser::Parser;

fn analyze(input: &str) -> Result<(GlobalSymbolTable, GlobalProcedureTable), SemanticError> {
    let tokens = Scanner::scan(input);
    let program = Parser::new(tokens).parse().expect("input parses");
    SemanticAnalyzer::new().analyze(&program)
}

#[test]
fn test_global_tables_hold_declarations() {
    let (gs_table, _) = analyze("const x := 5;\nvar y: integer;\nprogram\n    y := x + 1;\nend;")
        .unwrap();

    let x = gs_table.get("x").unwrap();
    assert!(x.is_constant);
    assert_eq!(x.symbol_type, Type::Integer);
    assert_eq!(x.value, Value::Int(5));

    let y = gs_table.get("y").unwrap();
    assert!(!y.is_constant);
    assert_eq!(y.symbol_type, Type::Integer);
    assert_eq!(y.value, Value::Int(0));
}

#[test]
fn test_predefined_procedures_are_registered() {
    let (_, gp_table) = analyze("program end;").unwrap();
    let cat_str = gp_table.get("CatStr").unwrap();
    assert!(cat_str.is_predefined);
    assert_eq!(cat_str.return_type, Type::String);

    let params = cat_str.parameters();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].0, "s1");
    assert_eq!(params[1].0, "s2");
    assert_eq!(params[0].1.symbol_type, Type::String);
}

#[test]
fn test_constant_list_value() {
    let (gs_table, _) = analyze("const xs := {1, 2};\nprogram end;").unwrap();
    let xs = gs_table.get("xs").unwrap();
    assert_eq!(xs.symbol_type, Type::ListOfInteger);
    assert_eq!(xs.value, Value::IntList(vec![1, 2]));
}

#[test]
fn test_empty_constant_list_is_rejected() {
    let error = analyze("const xs := {};\nprogram end;").unwrap_err();
    assert_eq!(error.message, "Constant lists cannot be empty: xs");
}

#[test]
fn test_mixed_list_elements_are_rejected() {
    let error = analyze("const xs := {1, true};\nprogram end;").unwrap_err();
    assert_eq!(error.message, "All list elements should be of the same type");
}

#[test]
fn test_integer_literal_overflow() {
    let error = analyze("const x := 2147483648;\nprogram end;").unwrap_err();
    assert_eq!(error.message, "Integer literal too large: 2147483648");
}

#[test]
fn test_assignment_to_constant_is_rejected() {
    let error = analyze("const x := 5;\nprogram\n    x := 1;\nend;").unwrap_err();
    assert_eq!(error.message, "Cannot perform assignment to constant: x");
    assert_eq!(error.row, 3);
}

#[test]
fn test_assignment_type_mismatch() {
    let error = analyze("var y: integer;\nprogram\n    y := true;\nend;").unwrap_err();
    assert_eq!(
        error.message,
        "Expecting type INTEGER instead of BOOLEAN in assignment statement"
    );
}

#[test]
fn test_undeclared_identifier() {
    let error = analyze("program\n    y := 1;\nend;").unwrap_err();
    assert_eq!(error.message, "Undeclared identifier: y");
}

#[test]
fn test_duplicated_global_symbol() {
    let error = analyze("var x: integer; x: string;\nprogram end;").unwrap_err();
    assert_eq!(error.message, "Duplicated symbol: x");
}

#[test]
fn test_call_arity_mismatch() {
    let error = analyze("program\n    WrInt();\nend;").unwrap_err();
    assert_eq!(
        error.message,
        "Expecting 1 argument(s) instead of 0 in call to WrInt"
    );
}

#[test]
fn test_call_argument_type_mismatch() {
    let error = analyze("program\n    WrInt(true);\nend;").unwrap_err();
    assert_eq!(
        error.message,
        "Expecting type INTEGER instead of BOOLEAN in argument 1 of call to WrInt"
    );
}

#[test]
fn test_value_returning_call_is_not_a_statement() {
    let error = analyze("program\n    RdInt();\nend;").unwrap_err();
    assert_eq!(
        error.message,
        "Procedure RdInt returns a value and cannot be called as a statement"
    );
}

#[test]
fn test_void_call_is_not_an_expression() {
    let error = analyze("var y: integer;\nprogram\n    y := WrLn();\nend;").unwrap_err();
    assert_eq!(
        error.message,
        "Procedure WrLn returns no value and cannot be used in an expression"
    );
}

#[test]
fn test_exit_outside_loop() {
    let error = analyze("program\n    exit;\nend;").unwrap_err();
    assert_eq!(error.message, "Exit statement used outside a loop");
}

#[test]
fn test_exit_inside_for_is_allowed() {
    let input = "var x: integer; xs: list of integer;
program
    for x in xs do
        exit;
    end;
end;";
    assert!(analyze(input).is_ok());
}

#[test]
fn test_for_variable_type_mismatch() {
    let input = "var s: string; xs: list of integer;
program
    for s in xs do
    end;
end;";
    let error = analyze(input).unwrap_err();
    assert_eq!(
        error.message,
        "Expecting type INTEGER instead of STRING in for statement"
    );
}

#[test]
fn test_for_integer_variable_over_string_list() {
    let input = "var i: integer; names: list of string;
program
    for i in names do
    end;
end;";
    let error = analyze(input).unwrap_err();
    assert_eq!(
        error.message,
        "Expecting type STRING instead of INTEGER in for statement"
    );
}

#[test]
fn test_for_over_non_list() {
    let input = "var x, y: integer;
program
    for x in y do
    end;
end;";
    let error = analyze(input).unwrap_err();
    assert_eq!(
        error.message,
        "Expecting a list type instead of INTEGER in for statement"
    );
}

#[test]
fn test_for_over_constant_variable() {
    let input = "const x := 5;
var xs: list of integer;
program
    for x in xs do
    end;
end;";
    let error = analyze(input).unwrap_err();
    assert_eq!(error.message, "Cannot use constant x as loop variable");
}

#[test]
fn test_top_level_return_with_value() {
    let error = analyze("program\n    return 5;\nend;").unwrap_err();
    assert_eq!(
        error.message,
        "Return statement with a value is only allowed inside a procedure"
    );
}

#[test]
fn test_return_type_mismatch() {
    let input = "procedure F(): integer;
begin
    return true;
end;
program
end;";
    let error = analyze(input).unwrap_err();
    assert_eq!(
        error.message,
        "Expecting type INTEGER instead of BOOLEAN in return statement"
    );
}

#[test]
fn test_return_value_in_void_procedure() {
    let input = "procedure F();
begin
    return {};
end;
program
end;";
    let error = analyze(input).unwrap_err();
    assert_eq!(
        error.message,
        "Return statement with a value is not allowed in a procedure with no return type"
    );
}

#[test]
fn test_equality_needs_matching_scalar_operands() {
    let error = analyze("program\n    WrBool(1 = true);\nend;").unwrap_err();
    assert_eq!(
        error.message,
        "Expecting two BOOLEAN or two INTEGER operands in operator ="
    );
}

#[test]
fn test_local_shadows_global() {
    let input = "var x: integer;
procedure F(x: string;);
begin
    WrStr(x);
end;
program
    WrInt(x);
end;";
    let (_, gp_table) = analyze(input).unwrap();
    let f = gp_table.get("F").unwrap();
    let x = f.locals.get("x").unwrap();
    assert_eq!(x.symbol_type, Type::String);
    assert_eq!(x.kind, SymbolKind::Param);
    assert_eq!(x.position, 0);
}

#[test]
fn test_recursive_procedure_resolves() {
    let input = "procedure Fact(n: integer;): integer;
begin
    if n <= 1 then
        return 1;
    end;
    return n * Fact(n - 1);
end;
program
    WrInt(Fact(5));
end;";
    assert!(analyze(input).is_ok());
}

#[test]
fn test_local_constant_evaluation() {
    let input = "procedure F(): integer;
const k := 7;
begin
    return k;
end;
program
end;";
    let (_, gp_table) = analyze(input).unwrap();
    let k = gp_table.get("F").unwrap().locals.get("k").unwrap();
    assert_eq!(k.kind, SymbolKind::Const);
    assert_eq!(k.value, Value::Int(7));
}

#[test]
fn test_empty_list_literal_never_assigns() {
    let error = analyze("var xs: list of integer;\nprogram\n    xs := {};\nend;").unwrap_err();
    assert_eq!(
        error.message,
        "Expecting type LIST_OF_INTEGER instead of VOID in assignment statement"
    );
}

#[test]
fn test_duplicated_procedure_against_predefined() {
    let input = "procedure WrInt(x: integer;);
begin
end;
program
end;";
    let error = analyze(input).unwrap_err();
    assert_eq!(error.message, "Duplicated procedure: WrInt");
}

#[test]
fn test_index_needs_integer() {
    let input = "var xs: list of integer; y: integer;
program
    y := xs[true];
end;";
    let error = analyze(input).unwrap_err();
    assert_eq!(
        error.message,
        "Expecting type INTEGER instead of BOOLEAN in index expression"
    );
}
