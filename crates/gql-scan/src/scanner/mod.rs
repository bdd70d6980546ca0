//! The push-mode scanner: state object, driver state machine, and the
//! lexing routines for names, numbers, strings and block strings.
//!
//! The driver is a single loop over a [`State`] enum. Every state consumes
//! leading separators and `#` comments, inspects the byte at the head
//! cursor, emits at most one token through the caller's sink, and yields
//! the next state. The first failure aborts the loop with an [`Error`].

pub(crate) mod classify;

use std::mem;
use std::ops::{ControlFlow, Range};

use crate::error::{Error, ErrorCode};
use crate::expect::Expect;
use crate::pool;
use crate::token::Token;

use classify::{
    is_control, is_digit, is_hex_digit, is_name_body, is_name_start, is_separator, is_terminator,
};

/// The caller-supplied token sink.
pub(crate) trait Sink<'a>: FnMut(&Scanner<'a>) -> ControlFlow<()> {}

impl<'a, F: FnMut(&Scanner<'a>) -> ControlFlow<()>> Sink<'a> for F {}

/// Scans `input` as a GraphQL executable document, invoking `f` once per
/// token in source order.
///
/// The callback reads the current token kind, payload and selection depth
/// from the borrowed [`Scanner`]; returning
/// [`Break`](std::ops::ControlFlow::Break) aborts the scan with
/// [`ErrorCode::CallbackAbort`](crate::ErrorCode::CallbackAbort).
///
/// Token payloads are views into `input` and stay valid for as long as
/// `input` does; the scanner itself retains nothing past return.
pub fn scan<'a, F>(input: &'a [u8], mut f: F) -> Result<(), Error>
where
    F: FnMut(&Scanner<'a>) -> ControlFlow<()>,
{
    Scanner::new(input).run(&mut f)
}

/// Marker for an open composite value on the scanner stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Open {
    Obj,
    Arr,
}

/// Where an argument list hands control back after its `)`.
#[derive(Debug, Clone, Copy)]
enum ArgsReturn {
    Field,
    Dir(DirTarget),
}

/// The construct a directive is attached to; decides where the driver
/// resumes once the directive (and its optional argument list) ends.
#[derive(Debug, Clone, Copy)]
enum DirTarget {
    Operation,
    Variable,
    Field,
    FragmentRef,
    FragmentDef,
    FragmentInline,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Definition,
    DefinitionEnd,
    AfterDefKeyword,
    AfterOprName,
    VarListItem,
    ColonAfterVarName,
    VarType,
    AfterType { bang: bool },
    SelSet(DirTarget),
    Sel,
    AfterSel,
    FieldName,
    AfterFieldName,
    AfterArgList,
    ArgName,
    ColonAfterArgName,
    Value,
    AfterValue,
    ObjFieldName,
    ColonAfterObjField,
    Spread,
    AfterFragRef,
    FragName,
    FragKeywordOn,
    FragTypeCond,
    FragInlineType,
    DirName(DirTarget),
    AfterDirName(DirTarget),
}

/// The scanner state handed to the token sink.
///
/// Exposes the current [`Token`], its payload bytes (a view into the
/// scanned input) and the selection depth. Instances are created by
/// [`scan`] and live only for the duration of one call; the stack's
/// backing storage is recycled through a process-wide pool.
pub struct Scanner<'a> {
    input: &'a [u8],
    head: usize,
    tail: Option<usize>,
    token: Token,
    level: usize,
    type_depth: usize,
    stack: Vec<Open>,
    args_ret: ArgsReturn,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            head: 0,
            tail: None,
            token: Token::DefQry,
            level: 0,
            type_depth: 0,
            stack: pool::STACKS.acquire(),
            args_ret: ArgsReturn::Field,
        }
    }

    /// The kind of the token currently being emitted.
    pub fn token(&self) -> Token {
        self.token
    }

    /// The current token's payload, or an empty slice for structural
    /// tokens. The returned slice borrows from the scanned input, not from
    /// the scanner.
    pub fn bytes(&self) -> &'a [u8] {
        match self.tail {
            Some(tail) => &self.input[tail..self.head],
            None => &[],
        }
    }

    /// The byte range of the current token's payload, if it has one.
    pub fn span(&self) -> Option<Range<usize>> {
        self.tail.map(|tail| tail..self.head)
    }

    /// The number of currently open selection sets. During a
    /// [`Token::Set`] callback this is the depth surrounding the set being
    /// opened; the matching [`Token::SetEnd`] observes the same value.
    pub fn level(&self) -> usize {
        self.level
    }

    /// The head cursor: the offset of the next byte to be inspected.
    pub fn offset(&self) -> usize {
        self.head
    }

    fn run<F: Sink<'a>>(&mut self, f: &mut F) -> Result<(), Error> {
        let mut state = State::Definition;
        loop {
            state = match state {
                State::Definition => self.definition(f)?,
                State::DefinitionEnd => {
                    self.skip_ignored();
                    if self.at().is_none() {
                        return Ok(());
                    }
                    State::Definition
                }
                State::AfterDefKeyword => self.after_def_keyword(f)?,
                State::AfterOprName => self.after_opr_name(f)?,
                State::VarListItem => self.var_list_item(f)?,
                State::ColonAfterVarName => self.colon(Expect::ColumnAfterVarName, State::VarType)?,
                State::VarType => self.var_type(f)?,
                State::AfterType { bang } => self.after_type(f, bang)?,
                State::SelSet(target) => self.sel_set(f, target)?,
                State::Sel => self.sel(f)?,
                State::AfterSel => self.after_sel(f)?,
                State::FieldName => self.field_name(f)?,
                State::AfterFieldName => self.after_field_name(f)?,
                State::AfterArgList => self.after_arg_list(f)?,
                State::ArgName => self.arg_name(f)?,
                State::ColonAfterArgName => self.colon(Expect::ColumnAfterArgName, State::Value)?,
                State::Value => self.value(f)?,
                State::AfterValue => self.after_value(f)?,
                State::ObjFieldName => self.obj_field_name(f)?,
                State::ColonAfterObjField => {
                    self.colon(Expect::ColumnAfterObjFieldName, State::Value)?
                }
                State::Spread => self.spread(f)?,
                State::AfterFragRef => self.after_frag_ref()?,
                State::FragName => self.frag_name(f)?,
                State::FragKeywordOn => self.frag_keyword_on()?,
                State::FragTypeCond => self.frag_type_cond(f)?,
                State::FragInlineType => self.frag_inline_type(f)?,
                State::DirName(target) => self.dir_name(f, target)?,
                State::AfterDirName(target) => self.after_dir_name(f, target)?,
            };
        }
    }

    // Cursor primitives.

    fn at(&self) -> Option<u8> {
        self.input.get(self.head).copied()
    }

    fn at_n(&self, n: usize) -> Option<u8> {
        self.input.get(self.head + n).copied()
    }

    fn keyword(&self, word: &[u8]) -> bool {
        classify::keyword(self.input, self.head, word)
    }

    /// Consumes separators and `#` comments up to the next significant
    /// byte. Comments run to the line feed or the end of input.
    fn skip_ignored(&mut self) {
        loop {
            while let Some(b) = self.at() {
                if is_separator(b) {
                    self.head += 1;
                } else {
                    break;
                }
            }
            if self.at() != Some(b'#') {
                return;
            }
            while let Some(b) = self.at() {
                self.head += 1;
                if b == b'\n' {
                    break;
                }
            }
        }
    }

    // Emission and error construction.

    fn emit<F: Sink<'a>>(
        &mut self,
        f: &mut F,
        token: Token,
        tail: Option<usize>,
    ) -> Result<(), Error> {
        self.token = token;
        self.tail = tail;
        #[cfg(feature = "log")]
        log::trace!("emit {token:?} at {}", self.head);
        match f(self) {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(()) => Err(Error::abort(self.head)),
        }
    }

    fn err_at(&self, index: usize, code: ErrorCode, expect: Expect) -> Error {
        Error::new(self.input, index, code, Some(expect))
    }

    fn eof(&self, expect: Expect) -> Error {
        Error::eof(self.head, expect)
    }

    /// Unexpected-token error at the head, or unexpected EOF if the input
    /// is exhausted.
    fn bail(&self, expect: Expect) -> Error {
        match self.at() {
            Some(_) => self.err_at(self.head, ErrorCode::UnexpectedToken, expect),
            None => self.eof(expect),
        }
    }

    // Shared lexing routines.

    /// Reads a name at the head. The inner loop inspects eight bytes per
    /// step. Returns the start offset; the head ends up one past the last
    /// name byte. Separators terminate a name; any other control byte
    /// inside one is an error.
    fn name(&mut self, expect: Expect) -> Result<usize, Error> {
        match self.at() {
            Some(b) if is_name_start(b) => {}
            _ => return Err(self.bail(expect)),
        }
        let start = self.head;
        self.head += 1;
        loop {
            match self.input.get(self.head..self.head + 8) {
                Some(chunk) => match classify::name_run(chunk) {
                    Some(i) => {
                        self.head += i;
                        break;
                    }
                    None => self.head += 8,
                },
                None => {
                    while let Some(b) = self.at() {
                        if is_name_body(b) {
                            self.head += 1;
                        } else {
                            break;
                        }
                    }
                    break;
                }
            }
        }
        if let Some(b) = self.at() {
            if is_control(b) && !is_separator(b) {
                return Err(self.err_at(self.head, ErrorCode::UnexpectedToken, expect));
            }
        }
        Ok(start)
    }

    /// Lexes a number per the GraphQL grammar: optional `-`, integer part
    /// with no leading zeros, optional fraction and exponent, terminated
    /// by a separator, a closing bracket, `#`, or the end of input.
    fn number<F: Sink<'a>>(&mut self, f: &mut F) -> Result<(), Error> {
        let start = self.head;
        if self.at() == Some(b'-') {
            self.head += 1;
        }
        match self.at() {
            Some(b'0') => {
                self.head += 1;
                if let Some(b) = self.at() {
                    if is_digit(b) {
                        return Err(self.err_at(self.head, ErrorCode::InvalidNumber, Expect::Val));
                    }
                }
            }
            Some(b) if is_digit(b) => {
                while self.at().is_some_and(is_digit) {
                    self.head += 1;
                }
            }
            Some(_) => return Err(self.err_at(self.head, ErrorCode::InvalidNumber, Expect::Val)),
            None => return Err(self.eof(Expect::Val)),
        }
        let mut float = false;
        if self.at() == Some(b'.') {
            self.head += 1;
            float = true;
            self.digit_run()?;
        }
        if let Some(b'e' | b'E') = self.at() {
            self.head += 1;
            float = true;
            if let Some(b'+' | b'-') = self.at() {
                self.head += 1;
            }
            self.digit_run()?;
        }
        match self.at() {
            None => {}
            Some(b) if is_terminator(b) => {}
            Some(_) => return Err(self.err_at(self.head, ErrorCode::InvalidNumber, Expect::Val)),
        }
        self.emit(f, if float { Token::Float } else { Token::Int }, Some(start))
    }

    /// At least one digit, then as many as follow.
    fn digit_run(&mut self) -> Result<(), Error> {
        match self.at() {
            Some(b) if is_digit(b) => self.head += 1,
            Some(_) => return Err(self.err_at(self.head, ErrorCode::InvalidNumber, Expect::Val)),
            None => return Err(self.eof(Expect::Val)),
        }
        while self.at().is_some_and(is_digit) {
            self.head += 1;
        }
        Ok(())
    }

    /// Lexes a string or block string; the head is at the opening quote.
    fn string<F: Sink<'a>>(&mut self, f: &mut F) -> Result<(), Error> {
        if self.at_n(1) == Some(b'"') && self.at_n(2) == Some(b'"') {
            return self.block_string(f);
        }
        self.head += 1;
        let start = self.head;
        loop {
            self.seek_str_special();
            match self.at() {
                None => return Err(self.eof(Expect::EndOfString)),
                Some(b'"') => {
                    self.emit(f, Token::Str, Some(start))?;
                    self.head += 1;
                    return Ok(());
                }
                Some(b'\\') => {
                    self.head += 1;
                    match self.at() {
                        None => return Err(self.eof(Expect::EndOfString)),
                        Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => {
                            self.head += 1;
                        }
                        Some(b'u') => {
                            self.head += 1;
                            for _ in 0..4 {
                                match self.at() {
                                    None => return Err(self.eof(Expect::EndOfString)),
                                    Some(b) if is_hex_digit(b) => self.head += 1,
                                    Some(_) => {
                                        return Err(self.err_at(
                                            self.head,
                                            ErrorCode::UnexpectedToken,
                                            Expect::EscapedUnicodeSequence,
                                        ))
                                    }
                                }
                            }
                        }
                        Some(_) => {
                            return Err(self.err_at(
                                self.head,
                                ErrorCode::UnexpectedToken,
                                Expect::EscapedSequence,
                            ))
                        }
                    }
                }
                Some(_) => {
                    return Err(self.err_at(
                        self.head,
                        ErrorCode::UnexpectedToken,
                        Expect::EndOfString,
                    ))
                }
            }
        }
    }

    /// Advances the head to the next quote, backslash or control byte,
    /// eight bytes per step.
    fn seek_str_special(&mut self) {
        loop {
            match self.input.get(self.head..self.head + 8) {
                Some(chunk) => match classify::str_special(chunk) {
                    Some(i) => {
                        self.head += i;
                        return;
                    }
                    None => self.head += 8,
                },
                None => break,
            }
        }
        while let Some(b) = self.at() {
            if b == b'"' || b == b'\\' || is_control(b) {
                return;
            }
            self.head += 1;
        }
    }

    /// Lexes a `"""` block string; the head is at the first quote. The
    /// payload is the raw body; `\"""` sequences are carried through
    /// verbatim and resolved by [`crate::block_string::interpret`].
    fn block_string<F: Sink<'a>>(&mut self, f: &mut F) -> Result<(), Error> {
        self.head += 3;
        let start = self.head;
        loop {
            self.seek_block_special();
            match self.at() {
                None => return Err(self.eof(Expect::EndOfBlockString)),
                Some(b'\\') => {
                    if self.at_n(1) == Some(b'"')
                        && self.at_n(2) == Some(b'"')
                        && self.at_n(3) == Some(b'"')
                    {
                        self.head += 4;
                    } else {
                        self.head += 1;
                    }
                }
                Some(_) => {
                    if self.at_n(1) == Some(b'"') && self.at_n(2) == Some(b'"') {
                        self.emit(f, Token::StrBlock, Some(start))?;
                        self.head += 3;
                        return Ok(());
                    }
                    self.head += 1;
                }
            }
        }
    }

    fn seek_block_special(&mut self) {
        loop {
            match self.input.get(self.head..self.head + 8) {
                Some(chunk) => match classify::block_special(chunk) {
                    Some(i) => {
                        self.head += i;
                        return;
                    }
                    None => self.head += 8,
                },
                None => break,
            }
        }
        while let Some(b) = self.at() {
            if b == b'"' || b == b'\\' {
                return;
            }
            self.head += 1;
        }
    }

    // Driver states.

    fn definition<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            None => Err(self.eof(Expect::Def)),
            Some(b'{') => {
                self.emit(f, Token::DefQry, None)?;
                Ok(State::SelSet(DirTarget::Operation))
            }
            Some(_) if self.keyword(b"query") => {
                self.head += 5;
                self.emit(f, Token::DefQry, None)?;
                Ok(State::AfterDefKeyword)
            }
            Some(_) if self.keyword(b"mutation") => {
                self.head += 8;
                self.emit(f, Token::DefMut, None)?;
                Ok(State::AfterDefKeyword)
            }
            Some(_) if self.keyword(b"subscription") => {
                self.head += 12;
                self.emit(f, Token::DefSub, None)?;
                Ok(State::AfterDefKeyword)
            }
            Some(_) if self.keyword(b"fragment") => {
                self.head += 8;
                self.emit(f, Token::DefFrag, None)?;
                Ok(State::FragName)
            }
            Some(_) => Err(self.err_at(self.head, ErrorCode::UnexpectedToken, Expect::Def)),
        }
    }

    fn after_def_keyword<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            Some(b'(') => {
                self.head += 1;
                self.emit(f, Token::VarList, None)?;
                Ok(State::VarListItem)
            }
            Some(b'{') => {
                self.head += 1;
                self.emit(f, Token::Set, None)?;
                self.level += 1;
                Ok(State::Sel)
            }
            Some(b'@') => {
                self.head += 1;
                Ok(State::DirName(DirTarget::Operation))
            }
            Some(b) if is_name_start(b) => {
                let start = self.name(Expect::OprName)?;
                self.emit(f, Token::OprName, Some(start))?;
                Ok(State::AfterOprName)
            }
            _ => Err(self.bail(Expect::AfterDefKeyword)),
        }
    }

    fn after_opr_name<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            Some(b'(') => {
                self.head += 1;
                self.emit(f, Token::VarList, None)?;
                Ok(State::VarListItem)
            }
            Some(b'{') => {
                self.head += 1;
                self.emit(f, Token::Set, None)?;
                self.level += 1;
                Ok(State::Sel)
            }
            Some(b'@') => {
                self.head += 1;
                Ok(State::DirName(DirTarget::Operation))
            }
            _ => Err(self.bail(Expect::AfterOprName)),
        }
    }

    fn var_list_item<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            Some(b'$') => {
                self.head += 1;
                let start = self.name(Expect::VarName)?;
                self.emit(f, Token::VarName, Some(start))?;
                Ok(State::ColonAfterVarName)
            }
            _ => Err(self.bail(Expect::VarName)),
        }
    }

    /// Shared `:` separator state; `expect` names the construct for error
    /// reporting and `next` is where the driver resumes.
    fn colon(&mut self, expect: Expect, next: State) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            Some(b':') => {
                self.head += 1;
                Ok(next)
            }
            _ => Err(self.bail(expect)),
        }
    }

    fn var_type<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            None => Err(self.eof(Expect::VarType)),
            Some(b'[') => {
                self.head += 1;
                self.emit(f, Token::VarTypeArr, None)?;
                self.type_depth += 1;
                Ok(State::VarType)
            }
            Some(b) if is_name_start(b) => {
                let start = self.name(Expect::VarType)?;
                self.emit(f, Token::VarTypeName, Some(start))?;
                Ok(State::AfterType { bang: true })
            }
            Some(_) => Err(self.err_at(self.head, ErrorCode::InvalidType, Expect::VarType)),
        }
    }

    fn after_type<F: Sink<'a>>(&mut self, f: &mut F, bang: bool) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            None => Err(self.eof(Expect::AfterVarType)),
            Some(b'!') => {
                if !bang {
                    return Err(self.err_at(
                        self.head,
                        ErrorCode::InvalidType,
                        Expect::AfterVarType,
                    ));
                }
                self.head += 1;
                self.emit(f, Token::VarTypeNotNull, None)?;
                Ok(State::AfterType { bang: false })
            }
            Some(b']') if self.type_depth > 0 => {
                self.head += 1;
                self.emit(f, Token::VarTypeArrEnd, None)?;
                self.type_depth -= 1;
                Ok(State::AfterType { bang: true })
            }
            Some(_) if self.type_depth > 0 => {
                Err(self.err_at(self.head, ErrorCode::InvalidType, Expect::AfterVarType))
            }
            Some(b')') => {
                self.head += 1;
                self.emit(f, Token::VarListEnd, None)?;
                Ok(State::SelSet(DirTarget::Operation))
            }
            Some(b']') => Err(self.err_at(self.head, ErrorCode::InvalidType, Expect::AfterVarType)),
            Some(b'@') => {
                self.head += 1;
                Ok(State::DirName(DirTarget::Variable))
            }
            Some(_) => Ok(State::VarListItem),
        }
    }

    fn sel_set<F: Sink<'a>>(&mut self, f: &mut F, target: DirTarget) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            Some(b'{') => {
                self.head += 1;
                self.emit(f, Token::Set, None)?;
                self.level += 1;
                Ok(State::Sel)
            }
            Some(b'@') => {
                self.head += 1;
                Ok(State::DirName(target))
            }
            _ => Err(self.bail(Expect::SelSet)),
        }
    }

    fn sel<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            Some(b'.') => {
                if self.at_n(1) == Some(b'.') && self.at_n(2) == Some(b'.') {
                    self.head += 3;
                    Ok(State::Spread)
                } else {
                    Err(self.err_at(self.head, ErrorCode::UnexpectedToken, Expect::Sel))
                }
            }
            Some(b) if is_name_start(b) => {
                let start = self.name(Expect::Sel)?;
                // Alias lookahead crosses separators only, so the payload
                // stays the bare name.
                let mut i = self.head;
                while let Some(&b) = self.input.get(i) {
                    if is_separator(b) {
                        i += 1;
                    } else {
                        break;
                    }
                }
                if self.input.get(i) == Some(&b':') {
                    self.emit(f, Token::FieldAlias, Some(start))?;
                    self.head = i + 1;
                    Ok(State::FieldName)
                } else {
                    self.emit(f, Token::Field, Some(start))?;
                    Ok(State::AfterFieldName)
                }
            }
            _ => Err(self.bail(Expect::Sel)),
        }
    }

    fn after_sel<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            Some(b'}') => {
                self.head += 1;
                self.level -= 1;
                self.emit(f, Token::SetEnd, None)?;
                if self.level == 0 {
                    Ok(State::DefinitionEnd)
                } else {
                    Ok(State::AfterSel)
                }
            }
            _ => Ok(State::Sel),
        }
    }

    fn field_name<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        let start = self.name(Expect::FieldName)?;
        self.emit(f, Token::Field, Some(start))?;
        Ok(State::AfterFieldName)
    }

    fn after_field_name<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            Some(b'(') => {
                self.head += 1;
                self.emit(f, Token::ArgList, None)?;
                self.args_ret = ArgsReturn::Field;
                Ok(State::ArgName)
            }
            Some(b'{') => {
                self.head += 1;
                self.emit(f, Token::Set, None)?;
                self.level += 1;
                Ok(State::Sel)
            }
            Some(b'@') => {
                self.head += 1;
                Ok(State::DirName(DirTarget::Field))
            }
            _ => Ok(State::AfterSel),
        }
    }

    fn after_arg_list<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            Some(b'{') => {
                self.head += 1;
                self.emit(f, Token::Set, None)?;
                self.level += 1;
                Ok(State::Sel)
            }
            Some(b'@') => {
                self.head += 1;
                Ok(State::DirName(DirTarget::Field))
            }
            _ => Ok(State::AfterSel),
        }
    }

    fn arg_name<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            Some(b) if is_name_start(b) => {
                self.stack.clear();
                let start = self.name(Expect::ArgName)?;
                self.emit(f, Token::ArgName, Some(start))?;
                Ok(State::ColonAfterArgName)
            }
            _ => Err(self.bail(Expect::ArgName)),
        }
    }

    fn value<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            None => Err(self.eof(Expect::Val)),
            Some(b'{') => {
                self.head += 1;
                self.emit(f, Token::Obj, None)?;
                self.stack.push(Open::Obj);
                Ok(State::ObjFieldName)
            }
            Some(b'[') => {
                self.head += 1;
                self.emit(f, Token::Arr, None)?;
                self.skip_ignored();
                if self.at() == Some(b']') {
                    self.head += 1;
                    self.emit(f, Token::ArrEnd, None)?;
                    Ok(State::AfterValue)
                } else {
                    self.stack.push(Open::Arr);
                    Ok(State::Value)
                }
            }
            Some(b'"') => {
                self.string(f)?;
                Ok(State::AfterValue)
            }
            Some(b'$') => {
                self.head += 1;
                let start = self.name(Expect::VarRefName)?;
                self.emit(f, Token::VarRef, Some(start))?;
                Ok(State::AfterValue)
            }
            Some(b'-' | b'+') => {
                self.number(f)?;
                Ok(State::AfterValue)
            }
            Some(b) if is_digit(b) => {
                self.number(f)?;
                Ok(State::AfterValue)
            }
            Some(b) if is_name_start(b) => {
                let start = self.name(Expect::Val)?;
                match &self.input[start..self.head] {
                    b"true" => self.emit(f, Token::True, None)?,
                    b"false" => self.emit(f, Token::False, None)?,
                    b"null" => self.emit(f, Token::Null, None)?,
                    _ => self.emit(f, Token::EnumVal, Some(start))?,
                }
                Ok(State::AfterValue)
            }
            Some(_) => Err(self.err_at(self.head, ErrorCode::InvalidValue, Expect::Val)),
        }
    }

    fn after_value<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.stack.last() {
            Some(Open::Obj) => Ok(State::ObjFieldName),
            Some(Open::Arr) => {
                if self.at() == Some(b']') {
                    self.head += 1;
                    self.stack.pop();
                    self.emit(f, Token::ArrEnd, None)?;
                    Ok(State::AfterValue)
                } else {
                    Ok(State::Value)
                }
            }
            None => match self.at() {
                Some(b')') => {
                    self.head += 1;
                    self.emit(f, Token::ArgListEnd, None)?;
                    match self.args_ret {
                        ArgsReturn::Field => Ok(State::AfterArgList),
                        ArgsReturn::Dir(target) => Ok(self.after_dir(target)),
                    }
                }
                Some(b) if is_name_start(b) => Ok(State::ArgName),
                _ => Err(self.bail(Expect::ArgName)),
            },
        }
    }

    fn obj_field_name<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            Some(b'}') => {
                self.head += 1;
                self.stack.pop();
                self.emit(f, Token::ObjEnd, None)?;
                Ok(State::AfterValue)
            }
            Some(b) if is_name_start(b) => {
                let start = self.name(Expect::ObjFieldName)?;
                self.emit(f, Token::ObjField, Some(start))?;
                Ok(State::ColonAfterObjField)
            }
            _ => Err(self.bail(Expect::ObjFieldName)),
        }
    }

    fn spread<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            None => Err(self.eof(Expect::Spread)),
            Some(_)
                if self.keyword(b"on") && self.at_n(2).map_or(true, is_separator) =>
            {
                self.head += 2;
                Ok(State::FragInlineType)
            }
            Some(b) if is_name_start(b) => {
                let start = self.name(Expect::Spread)?;
                self.emit(f, Token::FragRef, Some(start))?;
                Ok(State::AfterFragRef)
            }
            Some(_) => Err(self.err_at(self.head, ErrorCode::UnexpectedToken, Expect::Spread)),
        }
    }

    fn after_frag_ref(&mut self) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            Some(b'@') => {
                self.head += 1;
                Ok(State::DirName(DirTarget::FragmentRef))
            }
            _ => Ok(State::AfterSel),
        }
    }

    fn frag_name<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        let start = self.name(Expect::FragName)?;
        if &self.input[start..self.head] == b"on" {
            return Err(self.err_at(start, ErrorCode::IllegalFragmentName, Expect::FragName));
        }
        self.emit(f, Token::FragName, Some(start))?;
        Ok(State::FragKeywordOn)
    }

    fn frag_keyword_on(&mut self) -> Result<State, Error> {
        self.skip_ignored();
        if self.keyword(b"on") && !self.at_n(2).is_some_and(is_name_body) {
            self.head += 2;
            Ok(State::FragTypeCond)
        } else {
            Err(self.bail(Expect::FragKeywordOn))
        }
    }

    fn frag_type_cond<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        let start = self.name(Expect::FragTypeCond)?;
        self.emit(f, Token::FragTypeCond, Some(start))?;
        Ok(State::SelSet(DirTarget::FragmentDef))
    }

    fn frag_inline_type<F: Sink<'a>>(&mut self, f: &mut F) -> Result<State, Error> {
        self.skip_ignored();
        let start = self.name(Expect::FragTypeCond)?;
        self.emit(f, Token::FragInline, Some(start))?;
        Ok(State::SelSet(DirTarget::FragmentInline))
    }

    fn dir_name<F: Sink<'a>>(&mut self, f: &mut F, target: DirTarget) -> Result<State, Error> {
        self.skip_ignored();
        let start = self.name(Expect::DirName)?;
        self.emit(f, Token::DirName, Some(start))?;
        Ok(State::AfterDirName(target))
    }

    fn after_dir_name<F: Sink<'a>>(&mut self, f: &mut F, target: DirTarget) -> Result<State, Error> {
        self.skip_ignored();
        match self.at() {
            Some(b'(') => {
                self.head += 1;
                self.emit(f, Token::ArgList, None)?;
                self.args_ret = ArgsReturn::Dir(target);
                Ok(State::ArgName)
            }
            _ => Ok(self.after_dir(target)),
        }
    }

    /// Where the driver resumes once a directive ends; each host position
    /// accepts further directives.
    fn after_dir(&self, target: DirTarget) -> State {
        match target {
            DirTarget::Operation => State::SelSet(DirTarget::Operation),
            DirTarget::Variable => State::AfterType { bang: false },
            DirTarget::Field => State::AfterArgList,
            DirTarget::FragmentRef => State::AfterFragRef,
            DirTarget::FragmentDef => State::SelSet(DirTarget::FragmentDef),
            DirTarget::FragmentInline => State::SelSet(DirTarget::FragmentInline),
        }
    }
}

impl Drop for Scanner<'_> {
    fn drop(&mut self) {
        pool::STACKS.release(mem::take(&mut self.stack));
    }
}
