use crate::error::{Error, Result};
use crate::function::{Clamper, Values};
use grisaille_syntax::object::Number;
use log::error;
use phf::phf_map;
use smallvec::SmallVec;
use std::fmt;

/// The operand stack of a calculator function may hold at most 100 values.
const STACK_LIMIT: usize = 100;

/// A type 4 function (PostScript calculator).
#[derive(Debug)]
pub(crate) struct Type4 {
    program: Vec<Op>,
    pub(crate) clamper: Clamper,
}

impl Type4 {
    pub(crate) fn new(data: &[u8], clamper: Clamper) -> Result<Self> {
        let program = Parser::new(data)
            .program()
            .ok_or_else(|| Error::Function("invalid PostScript program".to_string()))?;

        Ok(Self { program, clamper })
    }

    pub(crate) fn eval(&self, mut input: Values) -> Option<Values> {
        self.clamper.clamp_input(&mut input);

        let mut stack = Stack::default();

        for value in input {
            stack.push(Value::Real(value))?;
        }

        stack.run(&self.program)?;

        let mut out = stack.0.iter().map(|v| v.real()).collect::<Values>();
        self.clamper.clamp_output(&mut out);

        Some(out)
    }
}

impl fmt::Display for Type4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_block(&self.program, f)
    }
}

fn write_block(block: &[Op], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("{")?;

    for op in block {
        match op {
            Op::Number(Number::Real(v)) if v.fract() == 0.0 => write!(f, " {v:.1}")?,
            Op::Number(n) => write!(f, " {n}")?,
            Op::If(then) => {
                f.write_str(" ")?;
                write_block(then, f)?;
                f.write_str(" if")?;
            }
            Op::IfElse(then, otherwise) => {
                f.write_str(" ")?;
                write_block(then, f)?;
                f.write_str(" ")?;
                write_block(otherwise, f)?;
                f.write_str(" ifelse")?;
            }
            Op::Keyword(k) => write!(f, " {}", k.name())?,
        }
    }

    f.write_str(" }")
}

/// A value on the operand stack. Integers are represented as reals.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Value {
    Real(f32),
    Bool(bool),
}

impl Value {
    fn real(self) -> f32 {
        match self {
            Self::Real(r) => r,
            Self::Bool(b) => f32::from(u8::from(b)),
        }
    }

    fn int(self) -> i32 {
        self.real() as i32
    }

    fn truthy(self) -> bool {
        match self {
            Self::Real(r) => r != 0.0,
            Self::Bool(b) => b,
        }
    }
}

#[derive(Default)]
struct Stack(SmallVec<[Value; 16]>);

impl Stack {
    fn push(&mut self, value: Value) -> Option<()> {
        if self.0.len() >= STACK_LIMIT {
            error!("PostScript operand stack overflow");

            return None;
        }

        self.0.push(value);

        Some(())
    }

    fn pop(&mut self) -> Option<Value> {
        let value = self.0.pop();

        if value.is_none() {
            error!("PostScript operand stack underflow");
        }

        value
    }

    /// Pop two values, returning them in the order they were pushed.
    fn pop_pair(&mut self) -> Option<(Value, Value)> {
        let b = self.pop()?;
        let a = self.pop()?;

        Some((a, b))
    }

    /// Pop a count operand and make sure that many values are below it.
    fn pop_count(&mut self) -> Option<usize> {
        let n = usize::try_from(self.pop()?.int()).ok()?;

        (n <= self.0.len()).then_some(n)
    }

    fn unary(&mut self, f: impl Fn(f32) -> f32) -> Option<()> {
        let a = self.pop()?.real();
        self.push(Value::Real(f(a)))
    }

    fn binary(&mut self, f: impl Fn(f32, f32) -> f32) -> Option<()> {
        let (a, b) = self.pop_pair()?;
        self.push(Value::Real(f(a.real(), b.real())))
    }

    fn compare(&mut self, f: impl Fn(f32, f32) -> bool) -> Option<()> {
        let (a, b) = self.pop_pair()?;
        self.push(Value::Bool(f(a.real(), b.real())))
    }

    /// Bitwise on integers, logical as soon as one of the operands is a boolean.
    fn bitwise(&mut self, ints: fn(i32, i32) -> i32, bools: fn(bool, bool) -> bool) -> Option<()> {
        let value = match self.pop_pair()? {
            (Value::Real(a), Value::Real(b)) => Value::Real(ints(a as i32, b as i32) as f32),
            (a, b) => Value::Bool(bools(a.truthy(), b.truthy())),
        };

        self.push(value)
    }

    fn run(&mut self, program: &[Op]) -> Option<()> {
        for op in program {
            match op {
                Op::Number(n) => self.push(Value::Real(n.as_f32()))?,
                Op::If(then) => {
                    if self.pop()?.truthy() {
                        self.run(then)?;
                    }
                }
                Op::IfElse(then, otherwise) => {
                    let branch = if self.pop()?.truthy() { then } else { otherwise };
                    self.run(branch)?;
                }
                Op::Keyword(k) => self.apply(*k)?,
            }
        }

        Some(())
    }

    fn apply(&mut self, keyword: Keyword) -> Option<()> {
        use Keyword::*;

        match keyword {
            Abs => self.unary(f32::abs),
            Neg => self.unary(|a| -a),
            Ceiling => self.unary(f32::ceil),
            Floor => self.unary(f32::floor),
            Round => self.unary(f32::round),
            Truncate | Cvi => self.unary(f32::trunc),
            Cvr => self.unary(|a| a),
            Sqrt => self.unary(f32::sqrt),
            Sin => self.unary(|a| a.to_radians().sin()),
            Cos => self.unary(|a| a.to_radians().cos()),
            Ln => self.unary(f32::ln),
            Log => self.unary(f32::log10),
            Add => self.binary(|a, b| a + b),
            Sub => self.binary(|a, b| a - b),
            Mul => self.binary(|a, b| a * b),
            Div => self.binary(|a, b| a / b),
            Mod => self.binary(|a, b| a % b),
            Exp => self.binary(f32::powf),
            // Angles are given in degrees, in the range [0, 360).
            Atan => self.binary(|num, den| num.atan2(den).to_degrees().rem_euclid(360.0)),
            Idiv => {
                let (a, b) = self.pop_pair()?;
                let q = a.int().checked_div(b.int())?;
                self.push(Value::Real(q as f32))
            }
            Bitshift => {
                let (a, b) = self.pop_pair()?;
                let (num, shift) = (a.int() as u32, b.int());
                let shifted = if shift >= 0 {
                    num.checked_shl(shift.unsigned_abs())
                } else {
                    num.checked_shr(shift.unsigned_abs())
                };
                self.push(Value::Real(shifted.unwrap_or(0) as f32))
            }
            Eq => self.compare(|a, b| a == b),
            Ne => self.compare(|a, b| a != b),
            Ge => self.compare(|a, b| a >= b),
            Gt => self.compare(|a, b| a > b),
            Le => self.compare(|a, b| a <= b),
            Lt => self.compare(|a, b| a < b),
            And => self.bitwise(|a, b| a & b, |a, b| a && b),
            Or => self.bitwise(|a, b| a | b, |a, b| a || b),
            Xor => self.bitwise(|a, b| a ^ b, |a, b| a ^ b),
            Not => {
                let value = match self.pop()? {
                    Value::Real(r) => Value::Real(!(r as i32) as f32),
                    Value::Bool(b) => Value::Bool(!b),
                };
                self.push(value)
            }
            True => self.push(Value::Bool(true)),
            False => self.push(Value::Bool(false)),
            Pop => self.pop().map(|_| ()),
            Dup => {
                let top = *self.0.last()?;
                self.push(top)
            }
            Exch => {
                let (a, b) = self.pop_pair()?;
                self.push(b)?;
                self.push(a)
            }
            Copy => {
                let n = self.pop_count()?;
                let start = self.0.len() - n;

                for i in start..start + n {
                    self.push(self.0[i])?;
                }

                Some(())
            }
            Index => {
                let n = usize::try_from(self.pop()?.int()).ok()?;
                let i = self.0.len().checked_sub(n + 1)?;
                self.push(self.0[i])
            }
            Roll => {
                let j = self.pop()?.int();
                let n = self.pop_count()?;
                let start = self.0.len() - n;
                let window = &mut self.0[start..];

                if !window.is_empty() {
                    let shift = j.unsigned_abs() as usize % window.len();

                    if j >= 0 {
                        window.rotate_right(shift);
                    } else {
                        window.rotate_left(shift);
                    }
                }

                Some(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Number(Number),
    Keyword(Keyword),
    If(Vec<Op>),
    IfElse(Vec<Op>, Vec<Op>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Abs,
    Add,
    Atan,
    Ceiling,
    Cos,
    Cvi,
    Cvr,
    Div,
    Exp,
    Floor,
    Idiv,
    Ln,
    Log,
    Mod,
    Mul,
    Neg,
    Round,
    Sin,
    Sqrt,
    Sub,
    Truncate,
    And,
    Bitshift,
    Eq,
    False,
    Ge,
    Gt,
    Le,
    Lt,
    Ne,
    Not,
    Or,
    True,
    Xor,
    Copy,
    Dup,
    Exch,
    Index,
    Pop,
    Roll,
}

static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "abs" => Keyword::Abs,
    "add" => Keyword::Add,
    "atan" => Keyword::Atan,
    "ceiling" => Keyword::Ceiling,
    "cos" => Keyword::Cos,
    "cvi" => Keyword::Cvi,
    "cvr" => Keyword::Cvr,
    "div" => Keyword::Div,
    "exp" => Keyword::Exp,
    "floor" => Keyword::Floor,
    "idiv" => Keyword::Idiv,
    "ln" => Keyword::Ln,
    "log" => Keyword::Log,
    "mod" => Keyword::Mod,
    "mul" => Keyword::Mul,
    "neg" => Keyword::Neg,
    "round" => Keyword::Round,
    "sin" => Keyword::Sin,
    "sqrt" => Keyword::Sqrt,
    "sub" => Keyword::Sub,
    "truncate" => Keyword::Truncate,
    "and" => Keyword::And,
    "bitshift" => Keyword::Bitshift,
    "eq" => Keyword::Eq,
    "false" => Keyword::False,
    "ge" => Keyword::Ge,
    "gt" => Keyword::Gt,
    "le" => Keyword::Le,
    "lt" => Keyword::Lt,
    "ne" => Keyword::Ne,
    "not" => Keyword::Not,
    "or" => Keyword::Or,
    "true" => Keyword::True,
    "xor" => Keyword::Xor,
    "copy" => Keyword::Copy,
    "dup" => Keyword::Dup,
    "exch" => Keyword::Exch,
    "index" => Keyword::Index,
    "pop" => Keyword::Pop,
    "roll" => Keyword::Roll,
};

impl Keyword {
    fn name(self) -> &'static str {
        KEYWORDS
            .entries()
            .find_map(|(name, k)| (*k == self).then_some(*name))
            .unwrap_or_default()
    }
}

/// Reads a program of the form `{ ... }`, with nested blocks for `if` and `ifelse`.
struct Parser<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn token(&mut self) -> Option<&'a [u8]> {
        let rest = &self.data[self.offset..];
        let start = self.offset + rest.iter().position(|b| !b.is_ascii_whitespace())?;
        let rest = &self.data[start..];

        let len = if matches!(rest[0], b'{' | b'}') {
            1
        } else {
            rest.iter()
                .position(|b| b.is_ascii_whitespace() || matches!(b, b'{' | b'}'))
                .unwrap_or(rest.len())
        };

        self.offset = start + len;

        Some(&rest[..len])
    }

    fn program(&mut self) -> Option<Vec<Op>> {
        if self.token()? != b"{" {
            error!("PostScript program doesn't start with a block");

            return None;
        }

        self.block()
    }

    /// Read the rest of a block whose opening brace was already consumed.
    fn block(&mut self) -> Option<Vec<Op>> {
        let mut ops = vec![];
        // Blocks read so far that still wait for their `if` or `ifelse`.
        let mut blocks = vec![];

        loop {
            match self.token()? {
                b"}" => return Some(ops),
                b"{" => blocks.push(self.block()?),
                b"if" => ops.push(Op::If(blocks.pop()?)),
                b"ifelse" => {
                    let otherwise = blocks.pop()?;
                    let then = blocks.pop()?;
                    ops.push(Op::IfElse(then, otherwise));
                }
                token => ops.push(op(token)?),
            }
        }
    }
}

fn op(token: &[u8]) -> Option<Op> {
    let text = std::str::from_utf8(token).ok()?;

    if let Ok(i) = text.parse::<i32>() {
        return Some(Op::Number(Number::Integer(i)));
    }

    if let Ok(r) = text.parse::<f32>() {
        return Some(Op::Number(Number::Real(r)));
    }

    match KEYWORDS.get(text) {
        Some(k) => Some(Op::Keyword(*k)),
        None => {
            error!("unknown PostScript operator {text}");

            None
        }
    }
}
