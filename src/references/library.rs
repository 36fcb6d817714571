//! Built-in libraries and their native implementations

use once_cell::sync::Lazy;

use super::humanize;
use super::{CallContext, Library, LibraryType, Member, MemberKind};
use crate::frontend::semantic::Type;
use crate::runtime::{RuntimeError, Value, MAX_STRING_LENGTH};

type Native = Result<Value, RuntimeError>;

fn method(
    name: &'static str,
    params: &'static [Type],
    ret: Type,
    invoke: super::Builtin,
) -> Member {
    Member {
        name,
        kind: MemberKind::Method,
        params,
        ret,
        invoke,
    }
}

fn property(
    name: &'static str,
    ret: Type,
    invoke: super::Builtin,
) -> Member {
    Member {
        name,
        kind: MemberKind::Property,
        params: &[],
        ret,
        invoke,
    }
}

fn field(
    name: &'static str,
    ret: Type,
    invoke: super::Builtin,
) -> Member {
    Member {
        name,
        kind: MemberKind::Field,
        params: &[],
        ret,
        invoke,
    }
}

pub(super) fn builtin_libraries() -> Vec<Library> {
    vec![
        Library {
            name: "System.Runtime",
            namespace: "System",
            types: vec![math(), convert()],
        },
        Library {
            name: "System.Console",
            namespace: "System",
            types: vec![console()],
        },
        Library {
            name: "System.Text",
            namespace: "System.Text",
            types: vec![strings()],
        },
        Library {
            name: "Humanizer",
            namespace: "Humanizer",
            types: vec![numbers()],
        },
    ]
}

// ---------------------------------------------------------------------------
// System.Math
// ---------------------------------------------------------------------------

fn math() -> LibraryType {
    use Type::{Double as D, Int as I};
    LibraryType {
        name: "Math",
        namespace: "System",
        members: vec![
            method("Abs", &[I], I, math_abs),
            method("Abs", &[D], D, math_abs),
            method("Max", &[I, I], I, math_max),
            method("Max", &[D, D], D, math_max),
            method("Min", &[I, I], I, math_min),
            method("Min", &[D, D], D, math_min),
            method("Pow", &[D, D], D, |_, a| Ok(Value::Double(dbl(a, 0).powf(dbl(a, 1))))),
            method("Sqrt", &[D], D, |_, a| Ok(Value::Double(dbl(a, 0).sqrt()))),
            method("Floor", &[D], D, |_, a| Ok(Value::Double(dbl(a, 0).floor()))),
            method("Ceiling", &[D], D, |_, a| Ok(Value::Double(dbl(a, 0).ceil()))),
            method("Round", &[D], D, |_, a| {
                Ok(Value::Double(dbl(a, 0).round_ties_even()))
            }),
            field("PI", D, |_, _| Ok(Value::Double(std::f64::consts::PI))),
            field("E", D, |_, _| Ok(Value::Double(std::f64::consts::E))),
        ],
    }
}

fn math_abs(
    _: &CallContext<'_>,
    args: &[Value],
) -> Native {
    match args.first() {
        Some(Value::Int(n)) => n.checked_abs().map(Value::Int).ok_or(RuntimeError::Overflow),
        _ => Ok(Value::Double(dbl(args, 0).abs())),
    }
}

fn math_max(
    _: &CallContext<'_>,
    args: &[Value],
) -> Native {
    match (args.first(), args.get(1)) {
        (Some(Value::Int(a)), Some(Value::Int(b))) => Ok(Value::Int(*a.max(b))),
        _ => Ok(Value::Double(dbl(args, 0).max(dbl(args, 1)))),
    }
}

fn math_min(
    _: &CallContext<'_>,
    args: &[Value],
) -> Native {
    match (args.first(), args.get(1)) {
        (Some(Value::Int(a)), Some(Value::Int(b))) => Ok(Value::Int(*a.min(b))),
        _ => Ok(Value::Double(dbl(args, 0).min(dbl(args, 1)))),
    }
}

// ---------------------------------------------------------------------------
// System.Convert
// ---------------------------------------------------------------------------

fn convert() -> LibraryType {
    use Type::Object as O;
    LibraryType {
        name: "Convert",
        namespace: "System",
        members: vec![
            method("ToInt32", &[O], Type::Int, convert_to_int),
            method("ToDouble", &[O], Type::Double, convert_to_double),
            method("ToString", &[O], Type::String, |_, a| Ok(Value::string(arg(a, 0).to_string()))),
            method("ToBoolean", &[O], Type::Bool, convert_to_bool),
        ],
    }
}

fn convert_to_int(
    _: &CallContext<'_>,
    args: &[Value],
) -> Native {
    match arg(args, 0) {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Double(d) => {
            let rounded = d.round_ties_even();
            if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
                Ok(Value::Int(rounded as i64))
            } else {
                Err(RuntimeError::Overflow)
            }
        }
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| RuntimeError::format()),
        Value::Void => Err(RuntimeError::format()),
    }
}

fn convert_to_double(
    _: &CallContext<'_>,
    args: &[Value],
) -> Native {
    match arg(args, 0) {
        Value::Int(n) => Ok(Value::Double(*n as f64)),
        Value::Double(d) => Ok(Value::Double(*d)),
        Value::Bool(b) => Ok(Value::Double(if *b { 1.0 } else { 0.0 })),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| RuntimeError::format()),
        Value::Void => Err(RuntimeError::format()),
    }
}

fn convert_to_bool(
    _: &CallContext<'_>,
    args: &[Value],
) -> Native {
    match arg(args, 0) {
        Value::Int(n) => Ok(Value::Bool(*n != 0)),
        Value::Double(d) => Ok(Value::Bool(*d != 0.0)),
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(s) => match s.trim() {
            t if t.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            t if t.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            _ => Err(RuntimeError::Format(
                "String was not recognized as a valid Boolean.".to_string(),
            )),
        },
        Value::Void => Err(RuntimeError::format()),
    }
}

// ---------------------------------------------------------------------------
// System.Console
// ---------------------------------------------------------------------------

fn console() -> LibraryType {
    LibraryType {
        name: "Console",
        namespace: "System",
        members: vec![
            method("WriteLine", &[], Type::Void, |ctx, _| {
                ctx.logger.write_output("\n");
                Ok(Value::Void)
            }),
            method("WriteLine", &[Type::Object], Type::Void, |ctx, a| {
                ctx.logger.write_output(&format!("{}\n", arg(a, 0)));
                Ok(Value::Void)
            }),
            method("Write", &[Type::Object], Type::Void, |ctx, a| {
                ctx.logger.write_output(&arg(a, 0).to_string());
                Ok(Value::Void)
            }),
        ],
    }
}

// ---------------------------------------------------------------------------
// System.Text
// ---------------------------------------------------------------------------

fn strings() -> LibraryType {
    use Type::{Int as I, String as S};
    LibraryType {
        name: "Strings",
        namespace: "System.Text",
        members: vec![
            method("Repeat", &[S, I], S, |_, a| {
                let source = text(a, 0);
                let count = usize::try_from(int(a, 1))
                    .ok()
                    .filter(|&count| {
                        source
                            .len()
                            .checked_mul(count)
                            .is_some_and(|len| len <= MAX_STRING_LENGTH)
                    })
                    .ok_or(RuntimeError::ArgumentOutOfRange("count"))?;
                Ok(Value::string(source.repeat(count)))
            }),
            method("Reverse", &[S], S, |_, a| {
                Ok(Value::string(text(a, 0).chars().rev().collect::<String>()))
            }),
            method("Join", &[S, S, S], S, |_, a| {
                Ok(Value::string(format!("{}{}{}", text(a, 1), text(a, 0), text(a, 2))))
            }),
        ],
    }
}

// ---------------------------------------------------------------------------
// Humanizer
// ---------------------------------------------------------------------------

fn numbers() -> LibraryType {
    LibraryType {
        name: "Numbers",
        namespace: "Humanizer",
        members: vec![
            method("ToOrdinal", &[Type::Int], Type::String, |_, a| {
                Ok(Value::string(humanize::ordinal(int(a, 0))))
            }),
            method("ToWords", &[Type::Int], Type::String, |_, a| {
                Ok(Value::string(humanize::words(int(a, 0))))
            }),
        ],
    }
}

// ---------------------------------------------------------------------------
// Instance members
// ---------------------------------------------------------------------------

pub(super) static STRING_MEMBERS: Lazy<Vec<Member>> = Lazy::new(|| {
    use Type::{Bool as B, Int as I, String as S};
    vec![
        property("Length", I, |_, a| {
            Ok(Value::Int(text(a, 0).chars().count() as i64))
        }),
        method("ToUpper", &[], S, |_, a| Ok(Value::string(text(a, 0).to_uppercase()))),
        method("ToLower", &[], S, |_, a| Ok(Value::string(text(a, 0).to_lowercase()))),
        method("Trim", &[], S, |_, a| Ok(Value::string(text(a, 0).trim()))),
        method("Contains", &[S], B, |_, a| Ok(Value::Bool(text(a, 0).contains(text(a, 1))))),
        method("StartsWith", &[S], B, |_, a| {
            Ok(Value::Bool(text(a, 0).starts_with(text(a, 1))))
        }),
        method("EndsWith", &[S], B, |_, a| Ok(Value::Bool(text(a, 0).ends_with(text(a, 1))))),
        method("IndexOf", &[S], I, |_, a| {
            let haystack = text(a, 0);
            let index = haystack
                .find(text(a, 1))
                .map(|byte| haystack[..byte].chars().count() as i64)
                .unwrap_or(-1);
            Ok(Value::Int(index))
        }),
        method("Replace", &[S, S], S, |_, a| {
            if text(a, 1).is_empty() {
                return Err(RuntimeError::InvalidOperation(
                    "String cannot be of zero length. (Parameter 'oldValue')".to_string(),
                ));
            }
            Ok(Value::string(text(a, 0).replace(text(a, 1), text(a, 2))))
        }),
        method("Substring", &[I, I], S, string_substring),
        method("ToString", &[], S, |_, a| Ok(Value::string(arg(a, 0).to_string()))),
    ]
});

pub(super) static VALUE_MEMBERS: Lazy<Vec<Member>> = Lazy::new(|| {
    vec![method("ToString", &[], Type::String, |_, a| {
        Ok(Value::string(arg(a, 0).to_string()))
    })]
});

fn string_substring(
    _: &CallContext<'_>,
    args: &[Value],
) -> Native {
    let s = text(args, 0);
    let len = s.chars().count() as i64;
    let start = int(args, 1);
    let count = int(args, 2);
    if start < 0 || start > len {
        return Err(RuntimeError::ArgumentOutOfRange("startIndex"));
    }
    // start <= len here
    if count < 0 || count > len - start {
        return Err(RuntimeError::ArgumentOutOfRange("length"));
    }
    Ok(Value::string(
        s.chars()
            .skip(start as usize)
            .take(count as usize)
            .collect::<String>(),
    ))
}

// ---------------------------------------------------------------------------
// Argument access; the binder guarantees arity and types
// ---------------------------------------------------------------------------

fn arg(
    args: &[Value],
    i: usize,
) -> &Value {
    args.get(i).unwrap_or(&Value::Void)
}

fn dbl(
    args: &[Value],
    i: usize,
) -> f64 {
    arg(args, i).as_double().unwrap_or(f64::NAN)
}

fn int(
    args: &[Value],
    i: usize,
) -> i64 {
    arg(args, i).as_int().unwrap_or_default()
}

fn text(
    args: &[Value],
    i: usize,
) -> &str {
    arg(args, i).as_str().unwrap_or_default()
}
