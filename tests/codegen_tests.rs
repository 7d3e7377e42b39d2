use chimerac::compile;

#[test]
fn test_output_skeleton() {
    let cil = compile("program end;").unwrap();
    assert!(cil.starts_with("// Code generated by the chimera compiler.\n"));
    assert!(cil.contains(".assembly 'chimera' {}\n"));
    assert!(cil.contains(".assembly extern 'chimeralib' {}\n"));
    assert!(cil.contains(".class public 'ChimeraProgram' extends ['mscorlib']'System'.'Object' {\n"));
    assert!(cil.contains("\t.method public static void '.init' () {\n"));
    assert!(cil.contains("\t.method public static void 'main'() {\n"));
    assert!(cil.contains("\t\t.entrypoint\n"));
    assert!(cil.contains("\t\tcall void class 'ChimeraProgram'::'.init'()\n"));
    assert!(cil.ends_with("}\n"));
}

#[test]
fn test_globals_become_fields_and_init_stores() {
    let cil = compile("const x := 5;\nvar y: integer;\nprogram\n    y := x + 1;\nend;").unwrap();

    assert!(cil.contains("\t.field public static int32 'x'\n"));
    assert!(cil.contains("\t.field public static int32 'y'\n"));
    assert!(cil.contains("\t\tldc.i4 5\n\t\tstsfld int32 'ChimeraProgram'::'x'\n"));
    assert!(cil.contains("\t\tldc.i4 0\n\t\tstsfld int32 'ChimeraProgram'::'y'\n"));

    let statement = "\t\tldsfld int32 'ChimeraProgram'::'x'\n\
                     \t\tldc.i4 1\n\
                     \t\tadd.ovf\n\
                     \t\tstsfld int32 'ChimeraProgram'::'y'\n";
    assert!(cil.contains(statement));

    // Straight-line code needs no labels.
    assert!(!cil.contains('$'));
}

#[test]
fn test_and_short_circuits() {
    let cil = compile("var a, b: boolean;\nprogram\n    a := a and b;\nend;").unwrap();
    let expected = "\t\tldsfld bool 'ChimeraProgram'::'a'\n\
                    \t\tdup\n\
                    \t\tbrfalse $000000\n\
                    \t\tldsfld bool 'ChimeraProgram'::'b'\n\
                    \t\tand\n\
                    \t\t$000000:\n";
    assert!(cil.contains(expected));
}

#[test]
fn test_or_short_circuits() {
    let cil = compile("var a, b: boolean;\nprogram\n    a := a or b;\nend;").unwrap();
    assert!(cil.contains("\t\tdup\n\t\tbrtrue $000000\n"));
    assert!(cil.contains("\t\tor\n\t\t$000000:\n"));
}

#[test]
fn test_smaller_eq_lowering() {
    let cil = compile("var b: boolean;\nprogram\n    b := 1 <= 2;\nend;").unwrap();
    let expected = "\t\tldc.i4.1\n\
                    \t\tldc.i4 1\n\
                    \t\tldc.i4 2\n\
                    \t\tble $000000\n\
                    \t\tpop\n\
                    \t\tldc.i4.0\n\
                    \t\t$000000:\n";
    assert!(cil.contains(expected));
}

#[test]
fn test_not_equal_lowering() {
    let cil = compile("var b: boolean;\nprogram\n    b := 1 <> 2;\nend;").unwrap();
    assert!(cil.contains("\t\tceq\n\t\tldc.i4.0\n\t\tceq\n"));
}

#[test]
fn test_nested_loops_exit_targets() {
    let input = "program
    loop
        loop
            exit;
        end;
        exit;
    end;
end;";
    let cil = compile(input).unwrap();
    let expected = "\t\t$000000:\n\
                    \t\t$000002:\n\
                    \t\tbr $000003\n\
                    \t\tbr $000002\n\
                    \t\t$000003:\n\
                    \t\tbr $000001\n\
                    \t\tbr $000000\n\
                    \t\t$000001:\n";
    assert!(cil.contains(expected));
}

#[test]
fn test_if_elseif_else_branching() {
    let input = "var x: integer;
program
    if x = 1 then
        WrInt(1);
    elseif x = 2 then
        WrInt(2);
    else
        WrInt(3);
    end;
end;";
    let cil = compile(input).unwrap();
    // $000000 is the end label, $000001/$000002 chain the clauses.
    assert!(cil.contains("\t\tbrfalse $000001\n"));
    assert!(cil.contains("\t\tbrfalse $000002\n"));
    assert!(cil.contains("\t\tbr $000000\n"));
    assert!(cil.contains("\t\t$000000:\n"));
}

#[test]
fn test_for_lowering_uses_hidden_locals() {
    let input = "var x: integer; xs: list of integer;
program
    for x in xs do
        WrInt(x);
    end;
end;";
    let cil = compile(input).unwrap();
    assert!(cil.contains("\t\t.locals init (int32[] '$000000_list', int32 '$000000_idx')\n"));

    let guard = "\t\t$000001:\n\
                 \t\tldloc '$000000_idx'\n\
                 \t\tldloc '$000000_list'\n\
                 \t\tldlen\n\
                 \t\tconv.i4\n\
                 \t\tclt\n\
                 \t\tbrfalse $000002\n";
    assert!(cil.contains(guard));

    let element = "\t\tldloc '$000000_list'\n\
                   \t\tldloc '$000000_idx'\n\
                   \t\tldelem.i4\n\
                   \t\tstsfld int32 'ChimeraProgram'::'x'\n";
    assert!(cil.contains(element));

    let step = "\t\tldloc '$000000_idx'\n\
                \t\tldc.i4.1\n\
                \t\tadd\n\
                \t\tstloc '$000000_idx'\n\
                \t\tbr $000001\n\
                \t\t$000002:\n";
    assert!(cil.contains(step));
}

#[test]
fn test_user_and_predefined_calls() {
    let input = "var y: integer;
procedure Double(n: integer;): integer;
begin
    return n * 2;
end;
program
    y := Double(5);
    WrInt(y);
end;";
    let cil = compile(input).unwrap();
    assert!(cil.contains("\t.method public static int32 'Double' (int32 'n') {\n"));
    assert!(cil.contains("\t\tldarg 'n'\n\t\tldc.i4 2\n\t\tmul.ovf\n\t\tret\n"));
    assert!(cil.contains("\t\tldc.i4 5\n\t\tcall int32 class 'ChimeraProgram'::'Double'(int32)\n"));
    assert!(cil.contains("\t\tcall void class ['chimeralib']'Chimera'.'Utils'::'WrInt'(int32)\n"));
}

#[test]
fn test_procedure_locals_and_params() {
    let input = "procedure Sum(xs: list of integer;): integer;
var total, i: integer;
begin
    for i in xs do
        total := total + i;
    end;
    return total;
end;
program
end;";
    let cil = compile(input).unwrap();
    assert!(cil.contains("\t.method public static int32 'Sum' (int32[] 'xs') {\n"));
    assert!(cil.contains("\t\t.locals init (int32 'total', int32 'i')\n"));
    assert!(cil.contains("\t\tldarg 'xs'\n"));
    assert!(cil.contains("\t\tstloc 'total'\n"));
}

#[test]
fn test_local_constant_initialization() {
    let input = "procedure F(): integer;
const k := 7;
begin
    return k;
end;
program
end;";
    let cil = compile(input).unwrap();
    assert!(cil.contains("\t\t.locals init (int32 'k')\n\t\tldc.i4 7\n\t\tstloc 'k'\n"));
}

#[test]
fn test_constant_list_materialized_in_init() {
    let cil = compile("const xs := {1, 2};\nprogram end;").unwrap();
    assert!(cil.contains("\t.field public static int32[] 'xs'\n"));
    let init = "\t\tldc.i4 2\n\
                \t\tnewarr int32\n\
                \t\tdup\n\
                \t\tldc.i4 0\n\
                \t\tldc.i4 1\n\
                \t\tstelem.i4\n\
                \t\tdup\n\
                \t\tldc.i4 1\n\
                \t\tldc.i4 2\n\
                \t\tstelem.i4\n\
                \t\tstsfld int32[] 'ChimeraProgram'::'xs'\n";
    assert!(cil.contains(init));
}

#[test]
fn test_indexed_assignment_and_load() {
    let input = "var xs: list of string; s: string;
program
    xs := NewLstStr(3);
    xs[0] := \"hi\";
    s := xs[0];
end;";
    let cil = compile(input).unwrap();
    assert!(cil.contains("\t\tcall string[] class ['chimeralib']'Chimera'.'Utils'::'NewLstStr'(int32)\n"));

    let store = "\t\tldsfld string[] 'ChimeraProgram'::'xs'\n\
                 \t\tldc.i4 0\n\
                 \t\tldstr \"hi\"\n\
                 \t\tstelem.ref\n";
    assert!(cil.contains(store));

    let load = "\t\tldsfld string[] 'ChimeraProgram'::'xs'\n\
                \t\tldc.i4 0\n\
                \t\tldelem.ref\n\
                \t\tstsfld string 'ChimeraProgram'::'s'\n";
    assert!(cil.contains(load));
}

#[test]
fn test_empty_list_return_fails_before_codegen() {
    let result = compile("procedure F();\nbegin\n    return {};\nend;\nprogram\nend;");
    let error = result.unwrap_err();
    assert!(error.to_string().starts_with("Semantic Error:"));
}

#[test]
fn test_string_literal_escaping() {
    let cil = compile("program\n    WrStr(\"say \"\"hi\"\"\");\nend;").unwrap();
    assert!(cil.contains("\t\tldstr \"say \\\"hi\\\"\"\n"));
}

#[test]
fn test_unary_operators() {
    let cil = compile("var y: integer; b: boolean;\nprogram\n    y := -y;\n    b := not b;\nend;")
        .unwrap();
    assert!(cil.contains("\t\tldsfld int32 'ChimeraProgram'::'y'\n\t\tneg\n"));
    assert!(cil.contains("\t\tldsfld bool 'ChimeraProgram'::'b'\n\t\tldc.i4.0\n\t\tceq\n"));
}
