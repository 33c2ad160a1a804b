//! Expression trees.

use smallvec::SmallVec;

use crate::ValueId;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    Not4b,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "not",
            UnaryOp::Not4b => "not4b",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
    Rem,
    Concat,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
    Xor,
    And4b,
    Or4b,
    Xor4b,
    ShiftLeft,
    ShiftRight,
    RotateLeft,
    RotateRight,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Mod => "mod",
            BinaryOp::Rem => "rem",
            BinaryOp::Concat => "&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::And4b => "and4b",
            BinaryOp::Or4b => "or4b",
            BinaryOp::Xor4b => "xor4b",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::RotateLeft => "<@",
            BinaryOp::RotateRight => "@>",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEqual | BinaryOp::GreaterEqual
        )
    }
}

/// Predefined functions the engine can fold.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Builtin {
    Bit2Hex,
    Bit2Oct,
    Bit2Int,
    Bit2Str,
    Hex2Bit,
    Hex2Oct,
    Hex2Int,
    Hex2Str,
    Oct2Bit,
    Oct2Hex,
    Oct2Int,
    Oct2Str,
    Oct2Char,
    Char2Oct,
    Int2Char,
    Char2Int,
    Int2Unichar,
    Unichar2Int,
    Int2Str,
    Str2Int,
    Int2Float,
    Float2Int,
    Int2Bit,
    Int2Hex,
    Int2Oct,
    Lengthof,
    Substr,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Bit2Hex => "bit2hex",
            Builtin::Bit2Oct => "bit2oct",
            Builtin::Bit2Int => "bit2int",
            Builtin::Bit2Str => "bit2str",
            Builtin::Hex2Bit => "hex2bit",
            Builtin::Hex2Oct => "hex2oct",
            Builtin::Hex2Int => "hex2int",
            Builtin::Hex2Str => "hex2str",
            Builtin::Oct2Bit => "oct2bit",
            Builtin::Oct2Hex => "oct2hex",
            Builtin::Oct2Int => "oct2int",
            Builtin::Oct2Str => "oct2str",
            Builtin::Oct2Char => "oct2char",
            Builtin::Char2Oct => "char2oct",
            Builtin::Int2Char => "int2char",
            Builtin::Char2Int => "char2int",
            Builtin::Int2Unichar => "int2unichar",
            Builtin::Unichar2Int => "unichar2int",
            Builtin::Int2Str => "int2str",
            Builtin::Str2Int => "str2int",
            Builtin::Int2Float => "int2float",
            Builtin::Float2Int => "float2int",
            Builtin::Int2Bit => "int2bit",
            Builtin::Int2Hex => "int2hex",
            Builtin::Int2Oct => "int2oct",
            Builtin::Lengthof => "lengthof",
            Builtin::Substr => "substr",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Builtin::Int2Bit | Builtin::Int2Hex | Builtin::Int2Oct => 2,
            Builtin::Substr => 3,
            _ => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum IntrospectOp {
    IsBound,
    IsPresent,
    IsValue,
    IsChosen,
}

impl IntrospectOp {
    pub fn name(self) -> &'static str {
        match self {
            IntrospectOp::IsBound => "isbound",
            IntrospectOp::IsPresent => "ispresent",
            IntrospectOp::IsValue => "isvalue",
            IntrospectOp::IsChosen => "ischosen",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Expression {
    Unary {
        op: UnaryOp,
        operand: ValueId,
    },
    Binary {
        op: BinaryOp,
        left: ValueId,
        right: ValueId,
    },
    Call {
        func: Builtin,
        args: SmallVec<[ValueId; 3]>,
    },
    /// `target` is a reference value, or any value for `isvalue`.
    Introspect {
        op: IntrospectOp,
        target: ValueId,
    },
    Rnd {
        seed: Option<ValueId>,
    },
}

impl Expression {
    pub fn operands(&self) -> SmallVec<[ValueId; 3]> {
        match self {
            Expression::Unary { operand, .. } => SmallVec::from_slice(&[*operand]),
            Expression::Binary { left, right, .. } => SmallVec::from_slice(&[*left, *right]),
            Expression::Call { args, .. } => args.clone(),
            Expression::Introspect { target, .. } => SmallVec::from_slice(&[*target]),
            Expression::Rnd { seed } => seed.iter().copied().collect(),
        }
    }
}
