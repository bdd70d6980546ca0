use std::fmt;

/// The grammar construct the scanner was attempting to read when an error
/// was raised. Carried by every [`Error`](crate::Error) except callback
/// aborts.
///
/// `AfterVarType` annotates two syntactically distinct follow-up positions:
/// the closure of a list type wrapper (where another `!` may still appear)
/// and the end of a complete variable type (where `)` or the next variable
/// is expected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Expect {
    Def = 1,
    AfterDefKeyword = 2,
    AfterOprName = 3,
    OprName = 4,
    SelSet = 5,
    Sel = 6,
    FieldName = 7,
    ArgName = 8,
    ColumnAfterArgName = 9,
    Val = 10,
    ObjFieldName = 11,
    ColumnAfterObjFieldName = 12,
    VarName = 13,
    ColumnAfterVarName = 14,
    VarType = 15,
    AfterVarType = 16,
    VarRefName = 17,
    EndOfString = 18,
    EndOfBlockString = 19,
    EscapedSequence = 20,
    EscapedUnicodeSequence = 21,
    FragName = 22,
    FragKeywordOn = 23,
    FragTypeCond = 24,
    Spread = 25,
    DirName = 26,
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Expect::Def => "definition",
            Expect::AfterDefKeyword => "operation name, variable list or selection set",
            Expect::AfterOprName => "variable list or selection set",
            Expect::OprName => "operation name",
            Expect::SelSet => "selection set",
            Expect::Sel => "selection",
            Expect::FieldName => "field name",
            Expect::ArgName => "argument name",
            Expect::ColumnAfterArgName => "column after argument name",
            Expect::Val => "value",
            Expect::ObjFieldName => "object field name",
            Expect::ColumnAfterObjFieldName => "column after object field name",
            Expect::VarName => "variable name",
            Expect::ColumnAfterVarName => "column after variable name",
            Expect::VarType => "variable type",
            Expect::AfterVarType => "variable list closure or variable",
            Expect::VarRefName => "referenced variable name",
            Expect::EndOfString => "end of string",
            Expect::EndOfBlockString => "end of block string",
            Expect::EscapedSequence => "escaped sequence",
            Expect::EscapedUnicodeSequence => "escaped unicode sequence",
            Expect::FragName => "fragment name",
            Expect::FragKeywordOn => "keyword 'on'",
            Expect::FragTypeCond => "fragment type condition",
            Expect::Spread => "fragment spread",
            Expect::DirName => "directive name",
        };
        f.write_str(name)
    }
}
