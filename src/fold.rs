//! Constant folder
//!
//! Reduces an all-literal `Unary`/`Binary`/`Intrinsic`/`Constructor`/
//! `Swizzle`/const-`LValue` expression to a `Literal` node (spec.md §4.H).
//! Ported from `examples/original_source/source/constant_folding.cpp`;
//! design note §9 collapses its three `scalar_literal_cast` overloads plus
//! `vector_literal_cast` into the single generic [`cast_lane`] here.

use crate::arena::{Arena, Handle};
use crate::ast::{AssignOp, BinaryOp, Expr, IntrinsicOp, LiteralValue, UnaryOp, VariableDecl};
use crate::types::{BaseType, Type};

/// A single scalar lane in a base-type-agnostic form, used as the pivot
/// representation for `cast_lane` and elementwise operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lane {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl Lane {
    fn as_f64(self) -> f64 {
        match self {
            Lane::Bool(b) => b as i64 as f64,
            Lane::Int(i) => i as f64,
            Lane::Uint(u) => u as f64,
            Lane::Float(f) => f,
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            Lane::Bool(b) => b as i64,
            Lane::Int(i) => i,
            Lane::Uint(u) => u as i64,
            Lane::Float(f) => f as i64,
        }
    }

    fn as_u64(self) -> u64 {
        match self {
            Lane::Bool(b) => b as u64,
            Lane::Int(i) => i as u64,
            Lane::Uint(u) => u,
            Lane::Float(f) => f as u64,
        }
    }

    fn is_nonzero(self) -> bool {
        match self {
            Lane::Bool(b) => b,
            Lane::Int(i) => i != 0,
            Lane::Uint(u) => u != 0,
            Lane::Float(f) => f != 0.0,
        }
    }
}

/// Converts one scalar lane from its current representation to `to`,
/// truncating towards zero for float-to-integral conversions. Collapses
/// the original's per-type cast overloads into one generic routine
/// (design note §9).
pub fn cast_lane(lane: Lane, to: BaseType) -> Lane {
    match to {
        BaseType::Bool => Lane::Bool(lane.is_nonzero()),
        BaseType::Int => Lane::Int(lane.as_i64()),
        BaseType::Uint => Lane::Uint(lane.as_u64()),
        BaseType::Float => Lane::Float(lane.as_f64()),
        _ => lane,
    }
}

fn lanes_of(value: &LiteralValue, count: usize) -> Vec<Lane> {
    match value {
        LiteralValue::Bool(a) => a[..count].iter().map(|&b| Lane::Bool(b)).collect(),
        LiteralValue::Int(a) => a[..count].iter().map(|&i| Lane::Int(i)).collect(),
        LiteralValue::Uint(a) => a[..count].iter().map(|&u| Lane::Uint(u)).collect(),
        LiteralValue::Float(a) => a[..count].iter().map(|&f| Lane::Float(f)).collect(),
        LiteralValue::String(_) => Vec::new(),
    }
}

fn pack_lanes(base: BaseType, lanes: &[Lane]) -> LiteralValue {
    match base {
        BaseType::Bool => {
            let mut out = [false; 16];
            for (i, l) in lanes.iter().enumerate().take(16) {
                out[i] = l.is_nonzero();
            }
            LiteralValue::Bool(out)
        }
        BaseType::Int => {
            let mut out = [0i64; 16];
            for (i, l) in lanes.iter().enumerate().take(16) {
                out[i] = l.as_i64();
            }
            LiteralValue::Int(out)
        }
        BaseType::Uint => {
            let mut out = [0u64; 16];
            for (i, l) in lanes.iter().enumerate().take(16) {
                out[i] = l.as_u64();
            }
            LiteralValue::Uint(out)
        }
        BaseType::Float => {
            let mut out = [0.0f64; 16];
            for (i, l) in lanes.iter().enumerate().take(16) {
                out[i] = l.as_f64();
            }
            LiteralValue::Float(out)
        }
        _ => LiteralValue::Int([0; 16]),
    }
}

fn literal_of(arena: &Arena<Expr>, handle: Handle<Expr>) -> Option<(Type, LiteralValue)> {
    match arena.get(handle) {
        Expr::Literal { ty, value } => Some((*ty, value.clone())),
        _ => None,
    }
}

/// The lane-wise arithmetic promotion base type for a binary operator
/// given both operand base types, per spec.md §4.F's promotion table:
/// mixed int/float promotes to float, otherwise the wider of the two
/// integral kinds.
pub(crate) fn promote(a: BaseType, b: BaseType) -> BaseType {
    use BaseType::*;
    match (a, b) {
        (Float, _) | (_, Float) => Float,
        (Uint, _) | (_, Uint) => Uint,
        (Int, _) | (_, Int) => Int,
        _ => Bool,
    }
}

fn elementwise_unary(lane: Lane, op: UnaryOp, base: BaseType) -> Lane {
    match op {
        UnaryOp::Negate => match base {
            BaseType::Float => Lane::Float(-lane.as_f64()),
            _ => Lane::Int(-lane.as_i64()),
        },
        UnaryOp::BitwiseNot => Lane::Int(!lane.as_i64()),
        _ => lane,
    }
}

fn elementwise_binary(lhs: Lane, rhs: Lane, op: BinaryOp, base: BaseType) -> Lane {
    use BinaryOp::*;
    if base == BaseType::Float {
        let (a, b) = (lhs.as_f64(), rhs.as_f64());
        return match op {
            Add => Lane::Float(a + b),
            Sub => Lane::Float(a - b),
            Mul => Lane::Float(a * b),
            Div => Lane::Float(a / b),
            Mod => Lane::Float(a % b),
            Less => Lane::Bool(a < b),
            LessEqual => Lane::Bool(a <= b),
            Greater => Lane::Bool(a > b),
            GreaterEqual => Lane::Bool(a >= b),
            Equal => Lane::Bool(a == b),
            NotEqual => Lane::Bool(a != b),
            LogicalAnd => Lane::Bool(a != 0.0 && b != 0.0),
            LogicalOr => Lane::Bool(a != 0.0 || b != 0.0),
            _ => Lane::Float(a),
        };
    }
    let (a, b) = (lhs.as_i64(), rhs.as_i64());
    match op {
        Add => Lane::Int(a.wrapping_add(b)),
        Sub => Lane::Int(a.wrapping_sub(b)),
        Mul => Lane::Int(a.wrapping_mul(b)),
        Div => Lane::Int(if b == 0 { 0 } else { a.wrapping_div(b) }),
        Mod => Lane::Int(if b == 0 { 0 } else { a.wrapping_rem(b) }),
        Less => Lane::Bool(a < b),
        LessEqual => Lane::Bool(a <= b),
        Greater => Lane::Bool(a > b),
        GreaterEqual => Lane::Bool(a >= b),
        Equal => Lane::Bool(a == b),
        NotEqual => Lane::Bool(a != b),
        BitAnd => Lane::Int(a & b),
        BitOr => Lane::Int(a | b),
        BitXor => Lane::Int(a ^ b),
        LogicalAnd => Lane::Bool(a != 0 && b != 0),
        LogicalOr => Lane::Bool(a != 0 || b != 0),
        Shl => Lane::Int(a.wrapping_shl(b as u32)),
        Shr => Lane::Int(a.wrapping_shr(b as u32)),
        ElementExtract => Lane::Int(a),
    }
}

fn is_bool_producing(op: BinaryOp) -> bool {
    use BinaryOp::*;
    matches!(
        op,
        Less | LessEqual | Greater | GreaterEqual | Equal | NotEqual | LogicalAnd | LogicalOr
    )
}

/// `true` if `op` is only defined over integral operands; the semantic
/// checker (not the folder) rejects non-integral operands ahead of time,
/// so the folder can assume they're already integral (spec.md §4.H).
fn is_int_only(op: BinaryOp) -> bool {
    use BinaryOp::*;
    matches!(op, Shl | Shr | BitAnd | BitOr | BitXor)
}

/// Attempts to fold `expr` (already built in `arena`) to a `Literal`
/// node, allocating the result in `arena` and returning its handle.
/// Non-foldable expressions (an operand isn't a literal, or folding is
/// inhibited) are returned unchanged.
pub fn fold_expr(arena: &mut Arena<Expr>, variables: &Arena<VariableDecl>, expr: Handle<Expr>) -> Handle<Expr> {
    let folded = match arena.get(expr).clone() {
        Expr::Unary { op, operand, ty } => fold_unary(arena, op, operand, ty),
        Expr::Binary { op, lhs, rhs, ty } => fold_binary(arena, op, lhs, rhs, ty),
        Expr::Intrinsic { op, arguments, ty } => fold_intrinsic(arena, op, &arguments, ty),
        Expr::Constructor { target_type, arguments } => fold_constructor(arena, target_type, &arguments),
        Expr::Swizzle { operand, mask, ty } => fold_swizzle(arena, operand, mask, ty),
        Expr::LValue { variable, .. } => fold_const_lvalue(arena, variables, variable),
        _ => None,
    };
    match folded {
        Some((ty, value)) => arena.alloc(Expr::Literal { ty, value }),
        None => expr,
    }
}

fn fold_unary(arena: &Arena<Expr>, op: UnaryOp, operand: Handle<Expr>, ty: Type) -> Option<(Type, LiteralValue)> {
    let (operand_ty, operand_value) = literal_of(arena, operand)?;
    let count = operand_ty.lane_count().min(16);

    match op {
        UnaryOp::Negate | UnaryOp::BitwiseNot => {
            let lanes: Vec<Lane> = lanes_of(&operand_value, count)
                .into_iter()
                .map(|l| elementwise_unary(l, op, ty.base_type))
                .collect();
            Some((ty, pack_lanes(ty.base_type, &lanes)))
        }
        UnaryOp::LogicalNot => {
            let as_int: Vec<Lane> = lanes_of(&operand_value, count)
                .into_iter()
                .map(|l| Lane::Int(l.as_i64()))
                .collect();
            let lanes: Vec<Lane> = as_int.into_iter().map(|l| Lane::Bool(!l.is_nonzero())).collect();
            Some((ty, pack_lanes(BaseType::Bool, &lanes)))
        }
        UnaryOp::Cast => {
            let src_lanes = lanes_of(&operand_value, operand_ty.lane_count().min(16));
            let take = src_lanes.len().min(count);
            let mut lanes: Vec<Lane> = src_lanes[..take]
                .iter()
                .map(|&l| cast_lane(l, ty.base_type))
                .collect();
            lanes.resize(count, cast_lane(Lane::Float(0.0), ty.base_type));
            Some((ty, pack_lanes(ty.base_type, &lanes)))
        }
        _ => None,
    }
}

fn fold_binary(
    arena: &Arena<Expr>,
    op: BinaryOp,
    lhs: Handle<Expr>,
    rhs: Handle<Expr>,
    ty: Type,
) -> Option<(Type, LiteralValue)> {
    let (lhs_ty, lhs_value) = literal_of(arena, lhs)?;
    let (rhs_ty, rhs_value) = literal_of(arena, rhs)?;

    if matches!(op, BinaryOp::Div | BinaryOp::Mod) {
        // Only lane 0 of the RHS is inspected, matching the original's
        // divide-by-zero check (spec.md §9 open question: preserved as-is).
        let rhs_lane0 = lanes_of(&rhs_value, 1).first().copied();
        if let Some(lane) = rhs_lane0 {
            if !lane.is_nonzero() {
                return None;
            }
        }
    }

    let base = if is_int_only(op) {
        BaseType::Int
    } else {
        promote(lhs_ty.base_type, rhs_ty.base_type)
    };

    let count = lhs_ty.components().max(rhs_ty.components()) as usize;
    let lhs_lanes = broadcast(&lhs_value, lhs_ty, count);
    let rhs_lanes = broadcast(&rhs_value, rhs_ty, count);

    let lanes: Vec<Lane> = lhs_lanes
        .into_iter()
        .zip(rhs_lanes)
        .map(|(a, b)| {
            let a = cast_lane(a, base);
            let b = cast_lane(b, base);
            elementwise_binary(a, b, op, base)
        })
        .collect();

    let result_base = if is_bool_producing(op) { BaseType::Bool } else { base };
    Some((ty, pack_lanes(result_base, &lanes)))
}

fn broadcast(value: &LiteralValue, ty: Type, count: usize) -> Vec<Lane> {
    let own = ty.components() as usize;
    let lanes = lanes_of(value, own.max(1).min(16));
    if own == 1 && count > 1 {
        vec![lanes[0]; count]
    } else {
        lanes
    }
}

fn fold_unary_math(lane: Lane, op: IntrinsicOp) -> Option<Lane> {
    let v = lane.as_f64();
    let r = match op {
        IntrinsicOp::Abs => v.abs(),
        IntrinsicOp::Sin => v.sin(),
        IntrinsicOp::Cos => v.cos(),
        IntrinsicOp::Tan => v.tan(),
        IntrinsicOp::Sinh => v.sinh(),
        IntrinsicOp::Cosh => v.cosh(),
        IntrinsicOp::Tanh => v.tanh(),
        IntrinsicOp::Asin => v.asin(),
        IntrinsicOp::Acos => v.acos(),
        IntrinsicOp::Atan => v.atan(),
        IntrinsicOp::Exp => v.exp(),
        IntrinsicOp::Exp2 => v.exp2(),
        IntrinsicOp::Log => v.ln(),
        IntrinsicOp::Log10 => v.log10(),
        IntrinsicOp::Log2 => v.log2(),
        IntrinsicOp::Sqrt => v.sqrt(),
        IntrinsicOp::Rsqrt => 1.0 / v.sqrt(),
        IntrinsicOp::Ceil => v.ceil(),
        IntrinsicOp::Floor => v.floor(),
        IntrinsicOp::Round => v.round(),
        IntrinsicOp::Trunc => v.trunc(),
        IntrinsicOp::Frac => v.fract(),
        IntrinsicOp::Radians => v.to_radians(),
        IntrinsicOp::Degrees => v.to_degrees(),
        IntrinsicOp::Rcp => 1.0 / v,
        IntrinsicOp::Saturate => v.clamp(0.0, 1.0),
        IntrinsicOp::Sign => v.signum(),
        _ => return None,
    };
    Some(Lane::Float(r))
}

fn fold_binary_math(a: Lane, b: Lane, op: IntrinsicOp) -> Option<Lane> {
    let (x, y) = (a.as_f64(), b.as_f64());
    let r = match op {
        IntrinsicOp::Atan2 => x.atan2(y),
        IntrinsicOp::Pow => x.powf(y),
        IntrinsicOp::Max => x.max(y),
        IntrinsicOp::Min => x.min(y),
        _ => return None,
    };
    Some(Lane::Float(r))
}

fn fold_intrinsic(
    arena: &Arena<Expr>,
    op: IntrinsicOp,
    arguments: &[Handle<Expr>],
    ty: Type,
) -> Option<(Type, LiteralValue)> {
    let args: Vec<(Type, LiteralValue)> = arguments
        .iter()
        .map(|&h| literal_of(arena, h))
        .collect::<Option<_>>()?;

    if args.len() == 1 {
        let (arg_ty, arg_value) = &args[0];
        let count = arg_ty.lane_count().min(16);
        let lanes: Vec<Lane> = lanes_of(arg_value, count)
            .into_iter()
            .map(|l| fold_unary_math(l, op))
            .collect::<Option<_>>()?;
        return Some((ty, pack_lanes(BaseType::Float, &lanes)));
    }
    if args.len() == 2 {
        let (a_ty, a_value) = &args[0];
        let (_, b_value) = &args[1];
        let count = a_ty.lane_count().min(16);
        let a_lanes = lanes_of(a_value, count);
        let b_lanes = lanes_of(b_value, count);
        let lanes: Vec<Lane> = a_lanes
            .into_iter()
            .zip(b_lanes)
            .map(|(a, b)| fold_binary_math(a, b, op))
            .collect::<Option<_>>()?;
        return Some((ty, pack_lanes(BaseType::Float, &lanes)));
    }
    None
}

fn fold_constructor(
    arena: &Arena<Expr>,
    target_type: Type,
    arguments: &[Handle<Expr>],
) -> Option<(Type, LiteralValue)> {
    let mut lanes = Vec::new();
    for &arg in arguments {
        let (arg_ty, arg_value) = literal_of(arena, arg)?;
        lanes.extend(lanes_of(&arg_value, arg_ty.lane_count().min(16)));
    }
    if lanes.len() != target_type.components() as usize {
        return None;
    }
    let cast: Vec<Lane> = lanes.into_iter().map(|l| cast_lane(l, target_type.base_type)).collect();
    Some((target_type, pack_lanes(target_type.base_type, &cast)))
}

fn fold_swizzle(arena: &Arena<Expr>, operand: Handle<Expr>, mask: [i8; 4], ty: Type) -> Option<(Type, LiteralValue)> {
    let (operand_ty, operand_value) = literal_of(arena, operand)?;
    let lanes = lanes_of(&operand_value, operand_ty.lane_count().min(16));
    let selected: Vec<Lane> = mask
        .iter()
        .take_while(|&&m| m >= 0)
        .map(|&m| lanes[m as usize])
        .collect();
    Some((ty, pack_lanes(ty.base_type, &selected)))
}

fn fold_const_lvalue(
    arena: &Arena<Expr>,
    variables: &Arena<VariableDecl>,
    variable: Handle<VariableDecl>,
) -> Option<(Type, LiteralValue)> {
    let decl = variables.get(variable);
    if !decl.ty.has_qualifier(crate::types::Qualifiers::CONST) {
        return None;
    }
    let init = decl.initializer?;
    literal_of(arena, init)
}

/// `true` iff `op` applied to a compound-assignment target would fold to
/// the same result as re-evaluating the equivalent binary operator; used
/// by the parser when lowering `x += 1` against literal `x`.
pub fn assign_op_to_binary(op: AssignOp) -> Option<BinaryOp> {
    Some(match op {
        AssignOp::Add => BinaryOp::Add,
        AssignOp::Sub => BinaryOp::Sub,
        AssignOp::Mul => BinaryOp::Mul,
        AssignOp::Div => BinaryOp::Div,
        AssignOp::Mod => BinaryOp::Mod,
        AssignOp::BitAnd => BinaryOp::BitAnd,
        AssignOp::BitOr => BinaryOp::BitOr,
        AssignOp::BitXor => BinaryOp::BitXor,
        AssignOp::Shl => BinaryOp::Shl,
        AssignOp::Shr => BinaryOp::Shr,
        AssignOp::None => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    fn lit_int(arena: &mut Arena<Expr>, v: i64) -> Handle<Expr> {
        let mut value = [0i64; 16];
        value[0] = v;
        arena.alloc(Expr::Literal {
            ty: Type::INT,
            value: LiteralValue::Int(value),
        })
    }

    fn lit_float(arena: &mut Arena<Expr>, v: f64) -> Handle<Expr> {
        let mut value = [0.0; 16];
        value[0] = v;
        arena.alloc(Expr::Literal {
            ty: Type::FLOAT,
            value: LiteralValue::Float(value),
        })
    }

    #[test]
    fn folds_two_plus_three_times_four_to_fourteen() {
        let mut arena: Arena<Expr> = Arena::new();
        let vars: Arena<VariableDecl> = Arena::new();
        let three = lit_int(&mut arena, 3);
        let four = lit_int(&mut arena, 4);
        let mul = arena.alloc(Expr::Binary { op: BinaryOp::Mul, lhs: three, rhs: four, ty: Type::INT });
        let mul = fold_expr(&mut arena, &vars, mul);
        let two = lit_int(&mut arena, 2);
        let add = arena.alloc(Expr::Binary { op: BinaryOp::Add, lhs: two, rhs: mul, ty: Type::INT });
        let add = fold_expr(&mut arena, &vars, add);
        match arena.get(add) {
            Expr::Literal { value: LiteralValue::Int(v), .. } => assert_eq!(v[0], 14),
            other => panic!("expected folded literal, got {other:?}"),
        }
    }

    #[test]
    fn division_by_literal_zero_is_not_folded() {
        let mut arena: Arena<Expr> = Arena::new();
        let vars: Arena<VariableDecl> = Arena::new();
        let a = lit_int(&mut arena, 5);
        let zero = lit_int(&mut arena, 0);
        let div = arena.alloc(Expr::Binary { op: BinaryOp::Div, lhs: a, rhs: zero, ty: Type::INT });
        let result = fold_expr(&mut arena, &vars, div);
        assert!(matches!(arena.get(result), Expr::Binary { .. }));
    }

    #[test]
    fn fold_is_idempotent() {
        let mut arena: Arena<Expr> = Arena::new();
        let vars: Arena<VariableDecl> = Arena::new();
        let a = lit_int(&mut arena, 2);
        let b = lit_int(&mut arena, 3);
        let add = arena.alloc(Expr::Binary { op: BinaryOp::Add, lhs: a, rhs: b, ty: Type::INT });
        let once = fold_expr(&mut arena, &vars, add);
        let twice = fold_expr(&mut arena, &vars, once);
        assert_eq!(arena.get(once), arena.get(twice));
    }

    #[test]
    fn cast_float_to_int_truncates_towards_zero() {
        let mut arena: Arena<Expr> = Arena::new();
        let vars: Arena<VariableDecl> = Arena::new();
        let f = lit_float(&mut arena, 3.9);
        let cast = arena.alloc(Expr::Unary { op: UnaryOp::Cast, operand: f, ty: Type::INT });
        let folded = fold_expr(&mut arena, &vars, cast);
        match arena.get(folded) {
            Expr::Literal { value: LiteralValue::Int(v), .. } => assert_eq!(v[0], 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn constructor_concatenates_and_casts_arguments() {
        let mut arena: Arena<Expr> = Arena::new();
        let vars: Arena<VariableDecl> = Arena::new();
        let a = lit_int(&mut arena, 1);
        let b = lit_int(&mut arena, 2);
        let c = lit_int(&mut arena, 3);
        let ctor = arena.alloc(Expr::Constructor {
            target_type: Type::vector(BaseType::Float, 3),
            arguments: vec![a, b, c],
        });
        let folded = fold_expr(&mut arena, &vars, ctor);
        match arena.get(folded) {
            Expr::Literal { value: LiteralValue::Float(v), .. } => assert_eq!(&v[..3], &[1.0, 2.0, 3.0]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn swizzle_selects_requested_lanes() {
        let mut arena: Arena<Expr> = Arena::new();
        let vars: Arena<VariableDecl> = Arena::new();
        let mut value = [0i64; 16];
        value[0] = 10;
        value[1] = 20;
        let vec = arena.alloc(Expr::Literal { ty: Type::vector(BaseType::Int, 2), value: LiteralValue::Int(value) });
        let swizzle = arena.alloc(Expr::Swizzle { operand: vec, mask: [1, 0, -1, -1], ty: Type::vector(BaseType::Int, 2) });
        let folded = fold_expr(&mut arena, &vars, swizzle);
        match arena.get(folded) {
            Expr::Literal { value: LiteralValue::Int(v), .. } => assert_eq!(&v[..2], &[20, 10]),
            other => panic!("unexpected {other:?}"),
        }
    }
}
