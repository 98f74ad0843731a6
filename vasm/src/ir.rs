//! The assembler's intermediate representation (`spec.md` 3.2): a linear,
//! insertion-ordered sequence of nodes built by walking the parse tree once
//! (`spec.md` 4.2). Import flattening ([`crate::imports`]), macro expansion
//! ([`crate::macros`]), and label resolution ([`crate::labels`]) all operate
//! on `Vec<Node>` in place, each pass narrowing what node kinds remain.

use crate::error::{Error, Result};
use crate::expr::eval_paren_expr;
use crate::int_util::{narrow_to_u16, process_number};
use crate::parser::Rule;
use pest::iterators::Pair;
use vmcore::RegisterId;

/// An operand as the parser saw it, before addressing-mode classification.
/// `spec.md` 3.3's four operand kinds, plus the two bracketed forms GET/PUT
/// use to mark an operand as an address rather than a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(RegisterId),
    /// `RA:RB`, packed as `(RA << 4) | RB`. Grammar-reserved per `spec.md`
    /// 3.3; no opcode in the table currently consumes it.
    RegisterPair(RegisterId, RegisterId),
    Number(i64),
    Label(String),
    MacroArg(String),
    BracketRegister(RegisterId),
    BracketNumber(i64),
    BracketLabel(String),
}

impl Operand {
    fn is_register_like(&self) -> bool {
        matches!(self, Operand::Register(_) | Operand::BracketRegister(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataItem {
    Number(i64),
    String(String),
}

/// A still-unencoded instruction: mnemonic plus the operands the parser
/// captured, addressing mode not yet decided (that's `crate::encode`'s
/// job, since label operands can't be classified as IMM vs MEM_DIRECT
/// until resolution — both look like `Operand::Label` here).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionNode {
    pub line: u32,
    pub mnemonic: String,
    pub operands: Vec<Operand>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    pub line: u32,
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCall {
    pub line: u32,
    pub name: String,
    pub args: Vec<Operand>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Instruction(InstructionNode),
    Label { line: u32, name: String },
    Data { line: u32, items: Vec<DataItem> },
    Import { line: u32, filename: String },
    MacroDef(MacroDef),
    MacroCall(MacroCall),
}

impl Node {
    pub fn line(&self) -> u32 {
        match self {
            Node::Instruction(i) => i.line,
            Node::Label { line, .. } => *line,
            Node::Data { line, .. } => *line,
            Node::Import { line, .. } => *line,
            Node::MacroDef(m) => m.line,
            Node::MacroCall(c) => c.line,
        }
    }
}

/// Walks a fully-parsed `program` pair and emits one [`Node`] per
/// statement, in source order. Line numbers come from pest's own span
/// tracking, counted from 1.
pub fn build_nodes(program: Pair<Rule>) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();
    for statement in program.into_inner() {
        if statement.as_rule() == Rule::EOI {
            continue;
        }
        nodes.push(build_statement(statement)?);
    }
    Ok(nodes)
}

fn line_of(pair: &Pair<Rule>) -> u32 {
    pair.as_span().start_pos().line_col().0 as u32
}

fn build_statement(pair: Pair<Rule>) -> Result<Node> {
    let line = line_of(&pair);
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::label_stmt => {
            let name = inner.into_inner().next().unwrap().as_str().to_string();
            Ok(Node::Label { line, name })
        }
        Rule::import_stmt => {
            let string_pair = inner.into_inner().next().unwrap();
            let filename = unquote(string_pair.as_str());
            Ok(Node::Import { line, filename })
        }
        Rule::data_stmt => build_data(line, inner),
        Rule::macro_def => build_macro_def(line, inner),
        Rule::call_stmt => build_call(line, inner),
        _ => unreachable!("unexpected statement rule {:?}", inner.as_rule()),
    }
}

fn unquote(s: &str) -> String {
    s[1..s.len() - 1].to_string()
}

fn build_data(line: u32, pair: Pair<Rule>) -> Result<Node> {
    let mut items = Vec::new();
    for item in pair.into_inner() {
        let inner = item.into_inner().next().unwrap();
        items.push(match inner.as_rule() {
            Rule::string => DataItem::String(unquote(inner.as_str())),
            Rule::number => DataItem::Number(process_number(inner)?),
            _ => unreachable!(),
        });
    }
    Ok(Node::Data { line, items })
}

fn build_macro_def(line: u32, pair: Pair<Rule>) -> Result<Node> {
    let mut pairs = pair.into_inner();
    let name = pairs.next().unwrap().as_str().to_string();

    let mut next = pairs.next().unwrap();
    let mut params = Vec::new();
    if next.as_rule() == Rule::macro_params {
        for p in next.into_inner() {
            params.push(p.as_str()[1..].to_string());
        }
        next = pairs.next().unwrap();
    }

    let mut body = Vec::new();
    for stmt in next.into_inner() {
        let stmt_line = line_of(&stmt);
        body.push(match stmt.as_rule() {
            Rule::data_stmt => build_data(stmt_line, stmt)?,
            Rule::call_stmt => build_call(stmt_line, stmt)?,
            _ => unreachable!(),
        });
    }

    Ok(Node::MacroDef(MacroDef { line, name, params, body }))
}

fn build_call(line: u32, pair: Pair<Rule>) -> Result<Node> {
    let mut pairs = pair.into_inner();
    let name = pairs.next().unwrap().as_str().to_string();
    let mut operands = Vec::new();
    for operand in pairs {
        operands.push(build_operand(line, operand)?);
    }

    // The grammar cannot tell an instruction mnemonic from a macro call —
    // both are `identifier operand, ...`. Defer that classification to the
    // macro expander (which knows the registry) and the encoder (which
    // knows the opcode table): emit a MacroCall candidate here only when
    // the name isn't a known mnemonic, otherwise an InstructionNode.
    if vmcore::Opcode::parse(&name).is_ok() {
        Ok(Node::Instruction(InstructionNode { line, mnemonic: name, operands }))
    } else {
        Ok(Node::MacroCall(MacroCall { line, name, args: operands }))
    }
}

fn build_operand(line: u32, pair: Pair<Rule>) -> Result<Operand> {
    match pair.as_rule() {
        Rule::register => Ok(Operand::Register(parse_register(line, pair.as_str())?)),
        Rule::register_pair => {
            let s = pair.as_str();
            let mut parts = s.split(':');
            let ra = parse_register(line, parts.next().unwrap())?;
            let rb = parse_register(line, parts.next().unwrap())?;
            Ok(Operand::RegisterPair(ra, rb))
        }
        Rule::number => Ok(Operand::Number(process_number(pair)?)),
        Rule::paren_expr => Ok(Operand::Number(eval_paren_expr(pair)?)),
        Rule::macro_param => Ok(Operand::MacroArg(pair.as_str()[1..].to_string())),
        Rule::identifier => Ok(Operand::Label(pair.as_str().to_string())),
        Rule::bracket_operand => {
            let inner = pair.into_inner().next().unwrap();
            match inner.as_rule() {
                Rule::register => Ok(Operand::BracketRegister(parse_register(line, inner.as_str())?)),
                Rule::number => Ok(Operand::BracketNumber(process_number(inner)?)),
                Rule::identifier => Ok(Operand::BracketLabel(inner.as_str().to_string())),
                _ => unreachable!(),
            }
        }
        _ => unreachable!("unexpected operand rule {:?}", pair.as_rule()),
    }
}

fn parse_register(line: u32, name: &str) -> Result<RegisterId> {
    RegisterId::parse(name).map_err(|_| Error::Semantic {
        line,
        message: format!("unknown register \"{}\"", name),
    })
}

/// Narrows an already-evaluated constant to a 16-bit word. Exposed for
/// `crate::encode`, which needs the same narrowing rule for plain NUMBER
/// operands.
pub fn narrow(line: u32, value: i64) -> Result<u16> {
    narrow_to_u16(line, value)
}
