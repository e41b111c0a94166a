//! Intrinsic catalog
//!
//! A fixed table of built-in function overloads, built once and shared
//! across compiles (spec.md §4.E "Intrinsic catalog", §5 "the intrinsic
//! catalog is immutable and may be statically shared"). Design note §9
//! asks for "a static table of `IntrinsicEntry { name, op, return_shape,
//! arg_shapes }`" in place of the original's constructor-overload pile;
//! [`catalog`] builds exactly that, generating the per-shape overloads
//! programmatically rather than listing each by hand.

use crate::ast::IntrinsicOp;
use crate::types::{BaseType, Type};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub struct IntrinsicEntry {
    pub name: &'static str,
    pub op: IntrinsicOp,
    pub return_type: Type,
    pub arg_types: Vec<Type>,
}

fn shape(base: BaseType, rows: u8) -> Type {
    if rows <= 1 {
        Type::scalar(base)
    } else {
        Type::vector(base, rows)
    }
}

/// Intrinsics whose element type may be bool/int/uint/float and which
/// preserve shape (`abs`, `clamp`, `max`, `min`, `sign`, `mad`) get one
/// overload per base type per arity 1..=4.
fn push_broad_numeric(out: &mut Vec<IntrinsicEntry>, name: &'static str, op: IntrinsicOp, arity: usize) {
    for base in [BaseType::Int, BaseType::Uint, BaseType::Float] {
        for rows in 1..=4u8 {
            let ty = shape(base, rows);
            out.push(IntrinsicEntry {
                name,
                op,
                return_type: ty,
                arg_types: vec![ty; arity],
            });
        }
    }
}

/// Float-only intrinsics that preserve shape (`sin`, `cos`, `sqrt`, ...).
fn push_float_unary(out: &mut Vec<IntrinsicEntry>, name: &'static str, op: IntrinsicOp) {
    for rows in 1..=4u8 {
        let ty = shape(BaseType::Float, rows);
        out.push(IntrinsicEntry {
            name,
            op,
            return_type: ty,
            arg_types: vec![ty],
        });
    }
}

fn push_float_binary_same_shape(out: &mut Vec<IntrinsicEntry>, name: &'static str, op: IntrinsicOp) {
    for rows in 1..=4u8 {
        let ty = shape(BaseType::Float, rows);
        out.push(IntrinsicEntry {
            name,
            op,
            return_type: ty,
            arg_types: vec![ty, ty],
        });
    }
}

fn push_float_reduce(out: &mut Vec<IntrinsicEntry>, name: &'static str, op: IntrinsicOp, arity: usize) {
    for rows in 1..=4u8 {
        let ty = shape(BaseType::Float, rows);
        out.push(IntrinsicEntry {
            name,
            op,
            return_type: Type::FLOAT,
            arg_types: vec![ty; arity],
        });
    }
}

fn build_catalog() -> Vec<IntrinsicEntry> {
    let mut out = Vec::new();

    push_broad_numeric(&mut out, "abs", IntrinsicOp::Abs, 1);
    push_broad_numeric(&mut out, "clamp", IntrinsicOp::Clamp, 3);
    push_broad_numeric(&mut out, "max", IntrinsicOp::Max, 2);
    push_broad_numeric(&mut out, "min", IntrinsicOp::Min, 2);
    push_broad_numeric(&mut out, "sign", IntrinsicOp::Sign, 1);
    push_broad_numeric(&mut out, "mad", IntrinsicOp::Mad, 3);

    for name_op in [
        ("sin", IntrinsicOp::Sin),
        ("cos", IntrinsicOp::Cos),
        ("tan", IntrinsicOp::Tan),
        ("sinh", IntrinsicOp::Sinh),
        ("cosh", IntrinsicOp::Cosh),
        ("tanh", IntrinsicOp::Tanh),
        ("asin", IntrinsicOp::Asin),
        ("acos", IntrinsicOp::Acos),
        ("atan", IntrinsicOp::Atan),
        ("exp", IntrinsicOp::Exp),
        ("exp2", IntrinsicOp::Exp2),
        ("log", IntrinsicOp::Log),
        ("log10", IntrinsicOp::Log10),
        ("log2", IntrinsicOp::Log2),
        ("sqrt", IntrinsicOp::Sqrt),
        ("rsqrt", IntrinsicOp::Rsqrt),
        ("ceil", IntrinsicOp::Ceil),
        ("floor", IntrinsicOp::Floor),
        ("round", IntrinsicOp::Round),
        ("trunc", IntrinsicOp::Trunc),
        ("frac", IntrinsicOp::Frac),
        ("radians", IntrinsicOp::Radians),
        ("degrees", IntrinsicOp::Degrees),
        ("rcp", IntrinsicOp::Rcp),
        ("saturate", IntrinsicOp::Saturate),
        ("ddx", IntrinsicOp::Ddx),
        ("ddy", IntrinsicOp::Ddy),
        ("fwidth", IntrinsicOp::Fwidth),
    ] {
        push_float_unary(&mut out, name_op.0, name_op.1);
    }

    push_float_binary_same_shape(&mut out, "atan2", IntrinsicOp::Atan2);
    push_float_binary_same_shape(&mut out, "pow", IntrinsicOp::Pow);
    push_float_binary_same_shape(&mut out, "step", IntrinsicOp::Step);
    push_float_binary_same_shape(&mut out, "reflect", IntrinsicOp::Reflect);

    for rows in 1..=4u8 {
        let ty = shape(BaseType::Float, rows);
        out.push(IntrinsicEntry {
            name: "lerp",
            op: IntrinsicOp::Lerp,
            return_type: ty,
            arg_types: vec![ty, ty, ty],
        });
        out.push(IntrinsicEntry {
            name: "smoothstep",
            op: IntrinsicOp::Smoothstep,
            return_type: ty,
            arg_types: vec![ty, ty, ty],
        });
        out.push(IntrinsicEntry {
            name: "faceforward",
            op: IntrinsicOp::Faceforward,
            return_type: ty,
            arg_types: vec![ty, ty, ty],
        });
    }
    for rows in 2..=4u8 {
        let ty = shape(BaseType::Float, rows);
        out.push(IntrinsicEntry {
            name: "refract",
            op: IntrinsicOp::Refract,
            return_type: ty,
            arg_types: vec![ty, ty, Type::FLOAT],
        });
    }

    push_float_reduce(&mut out, "length", IntrinsicOp::Length, 1);
    push_float_reduce(&mut out, "distance", IntrinsicOp::Distance, 2);
    push_float_reduce(&mut out, "dot", IntrinsicOp::Dot, 2);

    for rows in 1..=4u8 {
        let ty = shape(BaseType::Float, rows);
        out.push(IntrinsicEntry {
            name: "normalize",
            op: IntrinsicOp::Normalize,
            return_type: ty,
            arg_types: vec![ty],
        });
    }

    out.push(IntrinsicEntry {
        name: "cross",
        op: IntrinsicOp::Cross,
        return_type: Type::vector(BaseType::Float, 3),
        arg_types: vec![Type::vector(BaseType::Float, 3), Type::vector(BaseType::Float, 3)],
    });

    for n in 2..=4u8 {
        out.push(IntrinsicEntry {
            name: "determinant",
            op: IntrinsicOp::Determinant,
            return_type: Type::FLOAT,
            arg_types: vec![Type::matrix(BaseType::Float, n, n)],
        });
        for m in 2..=4u8 {
            out.push(IntrinsicEntry {
                name: "transpose",
                op: IntrinsicOp::Transpose,
                return_type: Type::matrix(BaseType::Float, m, n),
                arg_types: vec![Type::matrix(BaseType::Float, n, m)],
            });
        }
    }

    // mul: scalar*scalar, matrix*vector, vector*matrix, matrix*matrix.
    out.push(IntrinsicEntry {
        name: "mul",
        op: IntrinsicOp::Mul,
        return_type: Type::FLOAT,
        arg_types: vec![Type::FLOAT, Type::FLOAT],
    });
    for rows in 2..=4u8 {
        for cols in 2..=4u8 {
            out.push(IntrinsicEntry {
                name: "mul",
                op: IntrinsicOp::Mul,
                return_type: Type::vector(BaseType::Float, rows),
                arg_types: vec![
                    Type::matrix(BaseType::Float, rows, cols),
                    Type::vector(BaseType::Float, cols),
                ],
            });
            out.push(IntrinsicEntry {
                name: "mul",
                op: IntrinsicOp::Mul,
                return_type: Type::vector(BaseType::Float, cols),
                arg_types: vec![
                    Type::vector(BaseType::Float, rows),
                    Type::matrix(BaseType::Float, rows, cols),
                ],
            });
            for inner in 2..=4u8 {
                out.push(IntrinsicEntry {
                    name: "mul",
                    op: IntrinsicOp::Mul,
                    return_type: Type::matrix(BaseType::Float, rows, cols),
                    arg_types: vec![
                        Type::matrix(BaseType::Float, rows, inner),
                        Type::matrix(BaseType::Float, inner, cols),
                    ],
                });
            }
        }
    }

    for base in [BaseType::Int, BaseType::Uint, BaseType::Float] {
        for rows in 1..=4u8 {
            let ty = shape(base, rows);
            out.push(IntrinsicEntry {
                name: "all",
                op: IntrinsicOp::All,
                return_type: Type::BOOL,
                arg_types: vec![ty],
            });
            out.push(IntrinsicEntry {
                name: "any",
                op: IntrinsicOp::Any,
                return_type: Type::BOOL,
                arg_types: vec![ty],
            });
        }
    }

    for rows in 1..=4u8 {
        out.push(IntrinsicEntry {
            name: "asfloat",
            op: IntrinsicOp::Asfloat,
            return_type: shape(BaseType::Float, rows),
            arg_types: vec![shape(BaseType::Int, rows)],
        });
        out.push(IntrinsicEntry {
            name: "asfloat",
            op: IntrinsicOp::Asfloat,
            return_type: shape(BaseType::Float, rows),
            arg_types: vec![shape(BaseType::Uint, rows)],
        });
        out.push(IntrinsicEntry {
            name: "asint",
            op: IntrinsicOp::Asint,
            return_type: shape(BaseType::Int, rows),
            arg_types: vec![shape(BaseType::Float, rows)],
        });
        out.push(IntrinsicEntry {
            name: "asuint",
            op: IntrinsicOp::Asuint,
            return_type: shape(BaseType::Uint, rows),
            arg_types: vec![shape(BaseType::Float, rows)],
        });
    }

    out.push(IntrinsicEntry {
        name: "frexp",
        op: IntrinsicOp::Frexp,
        return_type: Type::FLOAT,
        arg_types: vec![Type::FLOAT, Type::FLOAT],
    });
    out.push(IntrinsicEntry {
        name: "ldexp",
        op: IntrinsicOp::Ldexp,
        return_type: Type::FLOAT,
        arg_types: vec![Type::FLOAT, Type::FLOAT],
    });
    out.push(IntrinsicEntry {
        name: "modf",
        op: IntrinsicOp::Modf,
        return_type: Type::FLOAT,
        arg_types: vec![Type::FLOAT, Type::FLOAT],
    });
    out.push(IntrinsicEntry {
        name: "sincos",
        op: IntrinsicOp::Sincos,
        return_type: Type::VOID,
        arg_types: vec![Type::FLOAT, Type::FLOAT, Type::FLOAT],
    });

    let sampler = Type::sampler();
    out.push(IntrinsicEntry {
        name: "tex2D",
        op: IntrinsicOp::Tex2D,
        return_type: Type::vector(BaseType::Float, 4),
        arg_types: vec![sampler, Type::vector(BaseType::Float, 2)],
    });
    out.push(IntrinsicEntry {
        name: "tex2Dfetch",
        op: IntrinsicOp::Tex2Dfetch,
        return_type: Type::vector(BaseType::Float, 4),
        arg_types: vec![sampler, Type::vector(BaseType::Int, 4)],
    });
    out.push(IntrinsicEntry {
        name: "tex2Dgather",
        op: IntrinsicOp::Tex2Dgather,
        return_type: Type::vector(BaseType::Float, 4),
        arg_types: vec![sampler, Type::vector(BaseType::Float, 2), Type::INT],
    });
    out.push(IntrinsicEntry {
        name: "tex2Dgatheroffset",
        op: IntrinsicOp::Tex2Dgatheroffset,
        return_type: Type::vector(BaseType::Float, 4),
        arg_types: vec![
            sampler,
            Type::vector(BaseType::Float, 2),
            Type::vector(BaseType::Int, 2),
            Type::INT,
        ],
    });
    out.push(IntrinsicEntry {
        name: "tex2Dgrad",
        op: IntrinsicOp::Tex2Dgrad,
        return_type: Type::vector(BaseType::Float, 4),
        arg_types: vec![
            sampler,
            Type::vector(BaseType::Float, 2),
            Type::vector(BaseType::Float, 2),
            Type::vector(BaseType::Float, 2),
        ],
    });
    out.push(IntrinsicEntry {
        name: "tex2Dlod",
        op: IntrinsicOp::Tex2Dlod,
        return_type: Type::vector(BaseType::Float, 4),
        arg_types: vec![sampler, Type::vector(BaseType::Float, 4)],
    });
    out.push(IntrinsicEntry {
        name: "tex2Dlodoffset",
        op: IntrinsicOp::Tex2Dlodoffset,
        return_type: Type::vector(BaseType::Float, 4),
        arg_types: vec![
            sampler,
            Type::vector(BaseType::Float, 4),
            Type::vector(BaseType::Int, 2),
        ],
    });
    out.push(IntrinsicEntry {
        name: "tex2Doffset",
        op: IntrinsicOp::Tex2Doffset,
        return_type: Type::vector(BaseType::Float, 4),
        arg_types: vec![
            sampler,
            Type::vector(BaseType::Float, 2),
            Type::vector(BaseType::Int, 2),
        ],
    });
    out.push(IntrinsicEntry {
        name: "tex2Dproj",
        op: IntrinsicOp::Tex2Dproj,
        return_type: Type::vector(BaseType::Float, 4),
        arg_types: vec![sampler, Type::vector(BaseType::Float, 4)],
    });
    out.push(IntrinsicEntry {
        name: "tex2Dsize",
        op: IntrinsicOp::Tex2Dsize,
        return_type: Type::vector(BaseType::Int, 2),
        arg_types: vec![sampler, Type::INT],
    });

    out
}

static CATALOG: OnceLock<Vec<IntrinsicEntry>> = OnceLock::new();

/// The full intrinsic overload table, built once and shared across
/// compiles on this process (spec.md §5).
pub fn catalog() -> &'static [IntrinsicEntry] {
    CATALOG.get_or_init(build_catalog)
}

pub fn by_name(name: &str) -> impl Iterator<Item = &'static IntrinsicEntry> {
    catalog().iter().filter(move |e| e.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abs_has_overloads_for_every_numeric_base_and_arity() {
        let count = by_name("abs").count();
        assert_eq!(count, 3 * 4);
    }

    #[test]
    fn tex2d_takes_a_sampler_and_a_float2() {
        let entry = by_name("tex2D").next().unwrap();
        assert_eq!(entry.arg_types.len(), 2);
        assert!(entry.arg_types[0].is_sampler());
        assert!(entry.arg_types[1].is_vector());
    }

    #[test]
    fn mul_has_matrix_vector_and_matrix_matrix_shapes() {
        let count = by_name("mul").count();
        assert!(count > 10);
    }
}
