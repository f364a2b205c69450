//! `%`-verb rendering for the formatted call shape.
//!
//! Supports `%v %s %q %d %b %o %x %X %c %t %e %E %f %F %g %G %%` with the
//! `- + space 0 #` flags, a width and a `.precision`. Operand problems are
//! written into the output instead of failing:
//!
//! | problem            | rendering                 |
//! |--------------------|---------------------------|
//! | missing operand    | `%!d(MISSING)`            |
//! | wrong operand kind | `%!d(string=abc)`         |
//! | unused operands    | `%!(EXTRA int=1, bool=true)` |
//! | trailing `%`       | `%!(NOVERB)`              |
//! | width over 10^6    | `%!(BADWIDTH)`, then the verb unpadded |
//! | precision over 10^6 | `%!(BADPREC)`, then the verb at its default precision |

use std::iter::Peekable;
use std::str::Chars;

use serde_json::{Number, Value};

/// Widths and precisions above this are rejected as `%!(BADWIDTH)` / `%!(BADPREC)`.
const MAX_WIDTH: usize = 1_000_000;

#[derive(Debug, Default, Clone, Copy)]
struct Spec {
    minus: bool,
    plus: bool,
    space: bool,
    zero: bool,
    sharp: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// Substitute `args` into `template`.
pub fn sprintf(template: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut chars = template.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.minus = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '0' => spec.zero = true,
                '#' => spec.sharp = true,
                _ => break,
            }
            chars.next();
        }
        spec.width = read_number(&mut chars);
        if spec.width.is_some_and(|width| width > MAX_WIDTH) {
            out.push_str("%!(BADWIDTH)");
            spec.width = None;
        }
        if chars.peek() == Some(&'.') {
            chars.next();
            let precision = read_number(&mut chars).unwrap_or(0);
            if precision > MAX_WIDTH {
                out.push_str("%!(BADPREC)");
            } else {
                spec.precision = Some(precision);
            }
        }

        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }

        match args.get(next_arg) {
            Some(value) => {
                next_arg += 1;
                out.push_str(&format_verb(verb, spec, value));
            }
            None => {
                out.push_str("%!");
                out.push(verb);
                out.push_str("(MISSING)");
            }
        }
    }

    if next_arg < args.len() {
        let extra: Vec<String> = args[next_arg..].iter().map(describe).collect();
        out.push_str("%!(EXTRA ");
        out.push_str(&extra.join(", "));
        out.push(')');
    }

    out
}

fn read_number(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut number: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        number = Some(number.unwrap_or(0).saturating_mul(10).saturating_add(digit as usize));
        chars.next();
    }
    number
}

fn format_verb(verb: char, spec: Spec, value: &Value) -> String {
    let formatted = match verb {
        'v' => Some(pad(&plain(value), spec)),
        's' => match value {
            Value::String(s) => Some(pad(&truncate(s, spec.precision), spec)),
            Value::Array(_) | Value::Object(_) => Some(pad(&value.to_string(), spec)),
            _ => None,
        },
        'q' => match value {
            Value::String(s) => Some(pad(&Value::String(s.clone()).to_string(), spec)),
            _ => integer(value)
                .and_then(|n| u32::try_from(n).ok())
                .and_then(char::from_u32)
                .map(|c| pad(&format!("'{c}'"), spec)),
        },
        'd' => integer(value).map(|n| format_int(n, 10, false, spec)),
        'b' => integer(value).map(|n| format_int(n, 2, false, spec)),
        'o' => integer(value).map(|n| format_int(n, 8, false, spec)),
        'x' | 'X' => {
            let upper = verb == 'X';
            match value {
                Value::String(s) => Some(pad(&hex_bytes(s, upper), spec)),
                _ => integer(value).map(|n| format_int(n, 16, upper, spec)),
            }
        }
        'c' => integer(value)
            .and_then(|n| u32::try_from(n).ok())
            .map(|n| pad(&char::from_u32(n).unwrap_or('\u{FFFD}').to_string(), spec)),
        't' => value.as_bool().map(|b| pad(&b.to_string(), spec)),
        'e' | 'E' | 'f' | 'F' | 'g' | 'G' => float(value).map(|f| format_float(f, verb, spec)),
        _ => None,
    };

    formatted.unwrap_or_else(|| bad_verb(verb, value))
}

/// Default rendering used by `%v`, keys and diagnostics.
pub(crate) fn plain(value: &Value) -> String {
    match value {
        Value::Null => "<nil>".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => plain_number(n),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn plain_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => {
            let body = format_g(f.abs(), None, false);
            if f.is_sign_negative() {
                format!("-{body}")
            } else {
                body
            }
        }
        _ => n.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float64",
        Value::Number(n) if n.is_u64() && !n.is_i64() => "uint",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "slice",
        Value::Object(_) => "map",
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "<nil>".to_string(),
        _ => format!("{}={}", kind(value), plain(value)),
    }
}

fn bad_verb(verb: char, value: &Value) -> String {
    format!("%!{verb}({})", describe(value))
}

fn integer(value: &Value) -> Option<i128> {
    let n = value.as_number()?;
    if let Some(i) = n.as_i64() {
        Some(i128::from(i))
    } else if !n.is_f64() {
        n.as_u64().map(i128::from)
    } else {
        None
    }
}

fn float(value: &Value) -> Option<f64> {
    value.as_number().filter(|n| n.is_f64()).and_then(Number::as_f64)
}

fn truncate(s: &str, precision: Option<usize>) -> String {
    match precision {
        Some(p) => s.chars().take(p).collect(),
        None => s.to_string(),
    }
}

fn hex_bytes(s: &str, upper: bool) -> String {
    s.bytes()
        .map(|b| {
            if upper {
                format!("{b:02X}")
            } else {
                format!("{b:02x}")
            }
        })
        .collect()
}

fn format_int(n: i128, radix: u32, upper: bool, spec: Spec) -> String {
    let magnitude = n.unsigned_abs();
    let mut digits = match radix {
        2 => format!("{magnitude:b}"),
        8 => format!("{magnitude:o}"),
        16 if upper => format!("{magnitude:X}"),
        16 => format!("{magnitude:x}"),
        _ => magnitude.to_string(),
    };
    if let Some(min_digits) = spec.precision {
        digits = format!("{digits:0>min_digits$}");
    }

    let prefix = match (spec.sharp, radix) {
        (true, 2) => "0b",
        (true, 8) => "0",
        (true, 16) if upper => "0X",
        (true, 16) => "0x",
        _ => "",
    };

    // Zero padding is ignored when a precision is given.
    let zero_ok = spec.precision.is_none();
    pad_number(sign(n < 0, spec), &format!("{prefix}{digits}"), spec, zero_ok)
}

fn format_float(f: f64, verb: char, spec: Spec) -> String {
    let magnitude = f.abs();
    let body = match verb {
        'f' | 'F' => format!("{:.*}", spec.precision.unwrap_or(6), magnitude),
        'e' | 'E' => format_exp(magnitude, spec.precision.unwrap_or(6), verb == 'E'),
        _ => format_g(magnitude, spec.precision, verb == 'G'),
    };
    pad_number(sign(f.is_sign_negative(), spec), &body, spec, true)
}

/// Scientific notation with a signed, at least two-digit exponent: `1.500000e+00`.
fn format_exp(magnitude: f64, precision: usize, upper: bool) -> String {
    let rendered = format!("{:.*e}", precision, magnitude);
    rewrite_exponent(&rendered, upper)
}

fn rewrite_exponent(rendered: &str, upper: bool) -> String {
    let (mantissa, exponent) = rendered.split_once('e').unwrap_or((rendered, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let marker = if upper { 'E' } else { 'e' };
    let exp_sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}{marker}{exp_sign}{:02}", exponent.abs())
}

/// `%g`: the shorter of `%e` and `%f`, without trailing zeros.
fn format_g(magnitude: f64, precision: Option<usize>, upper: bool) -> String {
    match precision {
        None => {
            let shortest = format!("{magnitude:e}");
            let exponent = exponent_of(&shortest);
            if exponent < -4 || exponent >= 6 {
                rewrite_exponent(&shortest, upper)
            } else {
                format!("{magnitude}")
            }
        }
        Some(precision) => {
            let significant = precision.max(1);
            let scientific = format!("{:.*e}", significant - 1, magnitude);
            let exponent = exponent_of(&scientific);
            if exponent < -4 || exponent >= significant as i32 {
                let (mantissa, _) = scientific.split_once('e').unwrap_or((scientific.as_str(), ""));
                let trimmed = trim_fraction(mantissa);
                rewrite_exponent(&format!("{trimmed}e{exponent}"), upper)
            } else {
                let decimals = (significant as i32 - 1 - exponent).max(0) as usize;
                trim_fraction(&format!("{:.*}", decimals, magnitude)).to_string()
            }
        }
    }
}

fn exponent_of(scientific: &str) -> i32 {
    scientific
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0)
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

fn sign(negative: bool, spec: Spec) -> &'static str {
    if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    }
}

fn pad_number(sign: &str, body: &str, spec: Spec, zero_ok: bool) -> String {
    let len = sign.chars().count() + body.chars().count();
    let width = spec.width.unwrap_or(0);
    if len >= width {
        return format!("{sign}{body}");
    }
    let fill = width - len;
    if spec.minus {
        format!("{sign}{body}{}", " ".repeat(fill))
    } else if spec.zero && zero_ok {
        format!("{sign}{}{body}", "0".repeat(fill))
    } else {
        format!("{}{sign}{body}", " ".repeat(fill))
    }
}

fn pad(body: &str, spec: Spec) -> String {
    pad_number("", body, Spec { zero: false, ..spec }, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fmt(template: &str, args: &[Value]) -> String {
        sprintf(template, args)
    }

    #[test]
    fn test_basic_substitution() {
        assert_eq!(fmt("got %d items", &[json!(5)]), "got 5 items");
        assert_eq!(fmt("hello %s", &[json!("alice")]), "hello alice");
        assert_eq!(fmt("%v and %v", &[json!("a"), json!(true)]), "a and true");
        assert_eq!(fmt("100%%", &[json!(1)]), "100%%!(EXTRA int=1)");
        assert_eq!(fmt("%d%%", &[json!(42)]), "42%");
    }

    #[test]
    fn test_integer_flags() {
        assert_eq!(fmt("%5d|", &[json!(42)]), "   42|");
        assert_eq!(fmt("%-5d|", &[json!(42)]), "42   |");
        assert_eq!(fmt("%05d", &[json!(-42)]), "-0042");
        assert_eq!(fmt("%+d", &[json!(7)]), "+7");
        assert_eq!(fmt("%x %X %#x", &[json!(255), json!(255), json!(255)]), "ff FF 0xff");
        assert_eq!(fmt("%b %o", &[json!(5), json!(8)]), "101 10");
        assert_eq!(fmt("%.3d", &[json!(7)]), "007");
        assert_eq!(fmt("%d", &[json!(u64::MAX)]), "18446744073709551615");
    }

    #[test]
    fn test_floats() {
        assert_eq!(fmt("%f", &[json!(1.5)]), "1.500000");
        assert_eq!(fmt("%.2f", &[json!(3.14159)]), "3.14");
        assert_eq!(fmt("%8.2f|", &[json!(-3.14159)]), "   -3.14|");
        assert_eq!(fmt("%e", &[json!(1234.5678)]), "1.234568e+03");
        assert_eq!(fmt("%E", &[json!(0.00012)]), "1.200000E-04");
        assert_eq!(fmt("%g", &[json!(0.5)]), "0.5");
        assert_eq!(fmt("%g", &[json!(1234567.0)]), "1.234567e+06");
        assert_eq!(fmt("%.3g", &[json!(3.14159)]), "3.14");
        assert_eq!(fmt("%.3g", &[json!(1234567.0)]), "1.23e+06");
        assert_eq!(fmt("%v", &[json!(3.0)]), "3");
        assert_eq!(fmt("%v", &[json!(-2.25)]), "-2.25");
    }

    #[test]
    fn test_strings() {
        assert_eq!(fmt("%q", &[json!("say \"hi\"")]), r#""say \"hi\"""#);
        assert_eq!(fmt("%.3s", &[json!("abcdef")]), "abc");
        assert_eq!(fmt("%-4s|", &[json!("ab")]), "ab  |");
        assert_eq!(fmt("%x", &[json!("hi")]), "6869");
        assert_eq!(fmt("%c", &[json!(65)]), "A");
        assert_eq!(fmt("%t", &[json!(false)]), "false");
        assert_eq!(fmt("%v", &[json!(["a", 1])]), r#"["a",1]"#);
        assert_eq!(fmt("%v", &[Value::Null]), "<nil>");
    }

    #[test]
    fn test_operand_diagnostics() {
        assert_eq!(fmt("%d and %d", &[json!(1)]), "1 and %!d(MISSING)");
        assert_eq!(fmt("%d", &[json!("abc")]), "%!d(string=abc)");
        assert_eq!(fmt("%s", &[json!(5)]), "%!s(int=5)");
        assert_eq!(fmt("%f", &[json!(5)]), "%!f(int=5)");
        assert_eq!(fmt("%t", &[Value::Null]), "%!t(<nil>)");
        assert_eq!(fmt("%z", &[json!(1.5)]), "%!z(float64=1.5)");
        assert_eq!(fmt("done %", &[json!(1)]), "done %!(NOVERB)%!(EXTRA int=1)");
        assert_eq!(
            fmt("only %s", &[json!("one"), json!(2), json!(true)]),
            "only one%!(EXTRA int=2, bool=true)"
        );
    }

    #[test]
    fn test_oversized_width_is_rejected() {
        assert_eq!(
            fmt("%99999999999999999999999d", &[json!(1)]),
            "%!(BADWIDTH)1"
        );
        assert_eq!(fmt("[%1000001s]", &[json!("x")]), "[%!(BADWIDTH)x]");
        assert_eq!(fmt("%1000000d", &[json!(1)]).len(), 1_000_000);
    }

    #[test]
    fn test_oversized_precision_is_rejected() {
        assert_eq!(fmt("%.99999999999f", &[json!(1.5)]), "%!(BADPREC)1.500000");
        assert_eq!(fmt("%.1000001d", &[json!(7)]), "%!(BADPREC)7");
        let padded = fmt("%.1000000d", &[json!(7)]);
        assert_eq!(padded.len(), 1_000_000);
        assert!(padded.ends_with("07"));
    }

    #[test]
    fn test_multibyte_template() {
        assert_eq!(fmt("héllo %s ✓", &[json!("wörld")]), "héllo wörld ✓");
    }
}
