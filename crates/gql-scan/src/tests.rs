//! End-to-end token stream tests: scan a document, dump every emitted
//! token with its span and payload, and compare against an inline
//! snapshot. Errors render through their `Display` form on the last line.

use std::fmt::Write;
use std::ops::ControlFlow;

use expect_test::{expect, Expect};
use pretty_assertions::assert_eq;

use crate::{scan, Token};

fn dump(input: &str) -> String {
    let mut acc = String::new();
    let result = scan(input.as_bytes(), |s| {
        match s.span() {
            Some(span) => writeln!(
                acc,
                "{:?}@{}..{} {:?}",
                s.token(),
                span.start,
                span.end,
                String::from_utf8_lossy(s.bytes())
            )
            .unwrap(),
            None => writeln!(acc, "{:?}@{}", s.token(), s.offset()).unwrap(),
        }
        ControlFlow::Continue(())
    });
    if let Err(err) = result {
        writeln!(acc, "{err}").unwrap();
    }
    acc
}

fn check(input: &str, expect: Expect) {
    expect.assert_eq(&dump(input));
}

#[test]
fn bare_selection_set() {
    check(
        "{a}",
        expect![[r#"
            DefQry@0
            Set@1
            Field@1..2 "a"
            SetEnd@3
        "#]],
    );
}

#[test]
fn operation_with_variables_and_arguments() {
    check(
        "query Q($x:Int!){a(b:$x)}",
        expect![[r#"
            DefQry@5
            OprName@6..7 "Q"
            VarList@8
            VarName@9..10 "x"
            VarTypeName@11..14 "Int"
            VarTypeNotNull@15
            VarListEnd@16
            Set@17
            Field@17..18 "a"
            ArgList@19
            ArgName@19..20 "b"
            VarRef@22..23 "x"
            ArgListEnd@24
            SetEnd@25
        "#]],
    );
}

#[test]
fn aliased_field() {
    check(
        "{a:b}",
        expect![[r#"
            DefQry@0
            Set@1
            FieldAlias@1..2 "a"
            Field@3..4 "b"
            SetEnd@5
        "#]],
    );
}

#[test]
fn mutation_with_list_argument() {
    check(
        "mutation{u(x:[1,2,3])}",
        expect![[r#"
            DefMut@8
            Set@9
            Field@9..10 "u"
            ArgList@11
            ArgName@11..12 "x"
            Arr@14
            Int@14..15 "1"
            Int@16..17 "2"
            Int@18..19 "3"
            ArrEnd@20
            ArgListEnd@21
            SetEnd@22
        "#]],
    );
}

#[test]
fn fragment_definition() {
    check(
        "fragment F on T{a}",
        expect![[r#"
            DefFrag@8
            FragName@9..10 "F"
            FragTypeCond@14..15 "T"
            Set@16
            Field@16..17 "a"
            SetEnd@18
        "#]],
    );
}

#[test]
fn three_definitions_in_sequence() {
    check(
        "{a} mutation{b} subscription{c}",
        expect![[r#"
            DefQry@0
            Set@1
            Field@1..2 "a"
            SetEnd@3
            DefMut@12
            Set@13
            Field@13..14 "b"
            SetEnd@15
            DefSub@28
            Set@29
            Field@29..30 "c"
            SetEnd@31
        "#]],
    );
}

#[test]
fn comments_are_insignificant() {
    check(
        "# lead\n{ # in\na # trail\n}",
        expect![[r#"
            DefQry@7
            Set@8
            Field@14..15 "a"
            SetEnd@25
        "#]],
    );
}

#[test]
fn object_argument_value() {
    check(
        "{a(b:{x:1,y:\"s\"})}",
        expect![[r#"
            DefQry@0
            Set@1
            Field@1..2 "a"
            ArgList@3
            ArgName@3..4 "b"
            Obj@6
            ObjField@6..7 "x"
            Int@8..9 "1"
            ObjField@10..11 "y"
            Str@13..14 "s"
            ObjEnd@16
            ArgListEnd@17
            SetEnd@18
        "#]],
    );
}

#[test]
fn field_directive_with_arguments() {
    check(
        "{f @skip(if:$c)}",
        expect![[r#"
            DefQry@0
            Set@1
            Field@1..2 "f"
            DirName@4..8 "skip"
            ArgList@9
            ArgName@9..11 "if"
            VarRef@13..14 "c"
            ArgListEnd@15
            SetEnd@16
        "#]],
    );
}

#[test]
fn inline_fragment_and_named_spread() {
    check(
        "{... on User{id} ...F}",
        expect![[r#"
            DefQry@0
            Set@1
            FragInline@8..12 "User"
            Set@13
            Field@13..15 "id"
            SetEnd@16
            FragRef@20..21 "F"
            SetEnd@22
        "#]],
    );
}

#[test]
fn unexpected_eof_after_set_open() {
    check(
        "{",
        expect![[r#"
            DefQry@0
            Set@1
            error at index 1: unexpected end of file; expected selection
        "#]],
    );
}

#[test]
fn missing_argument_value() {
    check(
        "{a(b: )}",
        expect![[r#"
            DefQry@0
            Set@1
            Field@1..2 "a"
            ArgList@3
            ArgName@3..4 "b"
            error at index 6 (')'): invalid value; expected value
        "#]],
    );
}

#[test]
fn leading_zero_is_an_invalid_number() {
    check(
        "{a(b: 01)}",
        expect![[r#"
            DefQry@0
            Set@1
            Field@1..2 "a"
            ArgList@3
            ArgName@3..4 "b"
            error at index 7 ('1'): invalid number value; expected value
        "#]],
    );
}

#[test]
fn unterminated_string() {
    check(
        "{a(b:\"abc",
        expect![[r#"
            DefQry@0
            Set@1
            Field@1..2 "a"
            ArgList@3
            ArgName@3..4 "b"
            error at index 9: unexpected end of file; expected end of string
        "#]],
    );
}

#[test]
fn illegal_escape_sequence() {
    check(
        "{a(b: \"x\\q\")}",
        expect![[r#"
            DefQry@0
            Set@1
            Field@1..2 "a"
            ArgList@3
            ArgName@3..4 "b"
            error at index 9 ('q'): unexpected token; expected escaped sequence
        "#]],
    );
}

#[test]
fn block_string_interprets_to_dedented_lines() {
    let input = "{a(s:\"\"\"  hello\n  world\"\"\")}";
    let mut raw = None;
    scan(input.as_bytes(), |s| {
        if s.token() == Token::StrBlock {
            raw = Some(s.bytes());
        }
        ControlFlow::Continue(())
    })
    .unwrap();
    let raw = raw.unwrap();
    assert_eq!(raw, b"  hello\n  world");

    let mut buf = [0u8; 8];
    let mut text = Vec::new();
    let flow = crate::block_string::interpret(raw, &mut buf, |chunk| {
        text.extend_from_slice(chunk);
        ControlFlow::Continue(())
    });
    assert!(flow.is_continue());
    assert_eq!(text, b"hello\nworld");
}

#[test]
fn every_opener_is_balanced_by_its_closer() {
    let input = "query($v:[Int!]){a(b:[{x:[1]}]) c@d(e:1){f}} fragment F on T{g}";
    let mut opens = Vec::new();
    scan(input.as_bytes(), |s| {
        match s.token() {
            Token::Set | Token::Obj | Token::Arr | Token::ArgList | Token::VarList
            | Token::VarTypeArr => opens.push(s.token()),
            Token::SetEnd => assert_eq!(opens.pop(), Some(Token::Set)),
            Token::ObjEnd => assert_eq!(opens.pop(), Some(Token::Obj)),
            Token::ArrEnd => assert_eq!(opens.pop(), Some(Token::Arr)),
            Token::ArgListEnd => assert_eq!(opens.pop(), Some(Token::ArgList)),
            Token::VarListEnd => assert_eq!(opens.pop(), Some(Token::VarList)),
            Token::VarTypeArrEnd => assert_eq!(opens.pop(), Some(Token::VarTypeArr)),
            _ => {}
        }
        ControlFlow::Continue(())
    })
    .unwrap();
    assert!(opens.is_empty());
}

#[test]
fn name_payloads_rebuild_the_source_names() {
    let input = "query Op($first:Int){people(limit:$first){edges{node{name}}}}";
    let mut names = Vec::new();
    scan(input.as_bytes(), |s| {
        if !s.bytes().is_empty() {
            names.push(String::from_utf8_lossy(s.bytes()).into_owned());
        }
        ControlFlow::Continue(())
    })
    .unwrap();
    assert_eq!(
        names,
        ["Op", "first", "Int", "people", "limit", "first", "edges", "node", "name"]
    );
}

#[test]
fn output_is_a_pure_function_of_the_input() {
    let input = "query Q($x:[String!]!) @opr {a(b:{c:[1.5e3,\"\"\"b\"\"\"]}) ... on T {d}}";
    let first = dump(input);
    for _ in 0..8 {
        assert_eq!(dump(input), first);
    }
}
