//! Folding of expression values.

use num_bigint::BigInt;
use tsl_diagnostic::ErrorCode;

use crate::arena::Derived;
use crate::chain::ReferenceChain;
use crate::timestamp::CompilationTimestamp;
use crate::value::{BinaryOp, Builtin, Expectation, Expression, IndexedValue, ValueKind, Values};
use crate::ValueId;

use super::operators::{self, OpError};
use super::ValueChecker;

/// What an expression reduces to.
pub(super) enum Folded {
    Value(ValueKind),
    Unfoldable,
    /// An operand is erroneous; already reported.
    Erroneous,
}

type FoldResult = Result<Folded, OpError>;

impl ValueChecker<'_> {
    pub(super) fn fold_expression(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        expr: &Expression,
        expected: Expectation,
        chain: &mut ReferenceChain,
    ) -> ValueId {
        let outcome = match expr {
            Expression::Unary { op, operand } => {
                match self.operands(ts, &[*operand], expected, chain) {
                    Ok(folded) => operators::unary(*op, self.arena.kind(folded[0])).map(Folded::Value),
                    Err(outcome) => Ok(outcome),
                }
            }
            Expression::Binary { op, left, right } => {
                self.fold_binary(ts, *op, *left, *right, expected, chain)
            }
            Expression::Call { func, args } => self.fold_call(ts, *func, args, expected, chain),
            Expression::Introspect { op, target } => {
                self.fold_introspection(ts, *op, *target, chain)
            }
            Expression::Rnd { .. } => Ok(Folded::Unfoldable),
        };

        let span = self.arena.span(id);
        match outcome {
            // Marked while folding its own operands: a cycle ran through it.
            Ok(Folded::Value(_)) if self.arena.is_erroneous(id) => id,
            Ok(Folded::Value(kind)) => {
                let ty = self.arena.ty(id);
                self.arena.push_derived(id, Derived::Folded, kind, span, ty)
            }
            Ok(Folded::Unfoldable) => id,
            Ok(Folded::Erroneous) => {
                self.arena.mark_erroneous(id);
                id
            }
            Err(err) => {
                self.error_at(id, err.to_diagnostic(span));
                id
            }
        }
    }

    /// Fold every operand. Any erroneous operand makes the whole list
    /// erroneous; otherwise any symbolic one makes it unfoldable.
    fn operands(
        &mut self,
        ts: CompilationTimestamp,
        ids: &[ValueId],
        expected: Expectation,
        chain: &mut ReferenceChain,
    ) -> Result<Vec<ValueId>, Folded> {
        let mut folded = Vec::with_capacity(ids.len());
        let mut unfoldable = false;
        for &id in ids {
            let last = self.get_value_refd_last(ts, id, expected, chain);
            if self.arena.is_erroneous(last) || self.arena.is_erroneous(id) {
                return Err(Folded::Erroneous);
            }
            unfoldable |= self.arena.kind(last).is_symbolic();
            folded.push(last);
        }
        if unfoldable {
            Err(Folded::Unfoldable)
        } else {
            Ok(folded)
        }
    }

    fn fold_binary(
        &mut self,
        ts: CompilationTimestamp,
        op: BinaryOp,
        left: ValueId,
        right: ValueId,
        expected: Expectation,
        chain: &mut ReferenceChain,
    ) -> FoldResult {
        // `false and x` and `true or x` do not need `x`.
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            if let Ok(l) = self.operands(ts, &[left], expected, chain) {
                if let ValueKind::Boolean(b) = self.arena.kind(l[0]) {
                    if *b == (op == BinaryOp::Or) {
                        return Ok(Folded::Value(ValueKind::Boolean(*b)));
                    }
                }
            }
        }

        let folded = match self.operands(ts, &[left, right], expected, chain) {
            Ok(folded) => folded,
            Err(outcome) => return Ok(outcome),
        };
        let (l, r) = (folded[0], folded[1]);

        if matches!(op, BinaryOp::Equal | BinaryOp::NotEqual) {
            if self.is_unfoldable(ts, l, expected, chain) || self.is_unfoldable(ts, r, expected, chain) {
                return Ok(Folded::Unfoldable);
            }
            let equal = self.equal_values(ts, l, r, chain);
            return Ok(Folded::Value(ValueKind::Boolean(equal != (op == BinaryOp::NotEqual))));
        }

        if op.is_comparison() {
            if let (ValueKind::Enumerated(a), ValueKind::Enumerated(b)) =
                (self.arena.kind(l), self.arena.kind(r))
            {
                let shape = self.shape(l).or_else(|| self.shape(r));
                let order = shape.and_then(|s| Some((s.item_index(*a)?, s.item_index(*b)?)));
                return match order {
                    Some((a, b)) => Ok(Folded::Value(ValueKind::Boolean(
                        operators::ordering_holds(op, Some(a.cmp(&b))),
                    ))),
                    None => Err(OpError::new(
                        ErrorCode::E2001,
                        format!(
                            "operands of `{}` are not items of one enumerated type",
                            op.as_str()
                        ),
                    )),
                };
            }
        }

        let (lk, rk) = (self.arena.kind(l), self.arena.kind(r));
        let result = match op {
            BinaryOp::Add
            | BinaryOp::Subtract
            | BinaryOp::Multiply
            | BinaryOp::Divide
            | BinaryOp::Mod
            | BinaryOp::Rem => operators::arithmetic(op, lk, rk),
            BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEqual | BinaryOp::GreaterEqual => {
                operators::compare(op, lk, rk)
            }
            BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => operators::logical(op, lk, rk),
            BinaryOp::And4b | BinaryOp::Or4b | BinaryOp::Xor4b => operators::bitwise(op, lk, rk),
            BinaryOp::ShiftLeft | BinaryOp::ShiftRight => operators::shift(op, lk, rk),
            BinaryOp::RotateLeft | BinaryOp::RotateRight => operators::rotate(op, lk, rk),
            BinaryOp::Concat => operators::concat(lk, rk),
            BinaryOp::Equal | BinaryOp::NotEqual => return Ok(Folded::Unfoldable),
        };
        result.map(Folded::Value)
    }

    fn fold_call(
        &mut self,
        ts: CompilationTimestamp,
        func: Builtin,
        args: &[ValueId],
        expected: Expectation,
        chain: &mut ReferenceChain,
    ) -> FoldResult {
        let folded = match self.operands(ts, args, expected, chain) {
            Ok(folded) => folded,
            Err(outcome) => return Ok(outcome),
        };

        if func == Builtin::Lengthof {
            if let Some(Values::Indexed(entries)) = folded
                .first()
                .and_then(|&v| self.arena.kind(v).list_values())
                .cloned()
            {
                return Ok(self.sparse_length(ts, &entries, chain));
            }
        }

        let kinds: Vec<&ValueKind> = folded.iter().map(|&v| self.arena.kind(v)).collect();
        operators::builtin(func, &kinds).map(Folded::Value)
    }

    /// Logical length of a sparse list: one past the highest index.
    fn sparse_length(
        &mut self,
        ts: CompilationTimestamp,
        entries: &[IndexedValue],
        chain: &mut ReferenceChain,
    ) -> Folded {
        let mut length = BigInt::from(0);
        for entry in entries {
            let index = self.get_value_refd_last(ts, entry.index, Expectation::Constant, chain);
            match self.arena.kind(index) {
                ValueKind::Integer(i) => {
                    let next = i + 1;
                    if next > length {
                        length = next;
                    }
                }
                _ if self.arena.is_erroneous(index) => return Folded::Erroneous,
                _ => return Folded::Unfoldable,
            }
        }
        Folded::Value(ValueKind::Integer(length))
    }
}
