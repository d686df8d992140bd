use num_bigint::BigInt;
use serde_eson::{
    parse, parse_with_options, Boxed, Callable, Error, ErrorKind, ErrorName, ErrorValue, Map,
    ParseOptions, Pattern, Value,
};

fn eval(input: &str) -> Value {
    match parse(input) {
        Ok(value) => value,
        Err(err) => panic!("failed to parse {input:?}: {err}"),
    }
}

fn fails(input: &str) -> Error {
    match parse(input) {
        Ok(value) => panic!("expected {input:?} to fail, got {value:?}"),
        Err(err) => err,
    }
}

fn list(values: Vec<Value>) -> Value {
    Value::from(values)
}

fn object(entries: &[(&str, Value)]) -> Value {
    let mut map = Map::new();
    for (key, value) in entries {
        map.insert((*key).to_string(), value.clone());
    }
    Value::Object(map)
}

#[test]
fn test_decimal_numbers() {
    assert_eq!(eval("0"), Value::from(0));
    assert_eq!(eval("123"), Value::from(123));
    assert_eq!(eval("0.123"), Value::from(0.123));
    assert_eq!(eval(".123"), Value::from(0.123));
    assert_eq!(eval("0."), Value::from(0));
    assert_eq!(eval("12.5e-1"), Value::from(1.25));
    assert_eq!(eval("6E+2"), Value::from(600));
    assert_eq!(eval("1_000_000"), Value::from(1_000_000));
    assert_eq!(eval("6e1_2"), Value::from(6e12));
    assert_eq!(eval("5_4_3e1_2_3"), Value::from(543e123));

    assert!(parse("05").is_err());
    assert!(parse(".").is_err());
    assert!(parse("1__0").is_err());
    assert!(parse("1_").is_err());
    assert!(parse("1e").is_err());
}

#[test]
fn test_prefixed_numbers() {
    assert_eq!(eval("0x123abc"), Value::from(0x0012_3abc));
    assert_eq!(eval("0XFF"), Value::from(255));
    assert_eq!(eval("0o0644"), Value::from(0o644));
    assert_eq!(eval("0b0111"), Value::from(7));
    assert_eq!(eval("0xd_e"), Value::from(0xde));
    assert_eq!(
        eval("0B0111111111111111111111111111111111111111111111111111111111111111"),
        Value::from(9_223_372_036_854_775_807_f64)
    );

    assert!(parse("0xd_.").is_err());
    assert!(parse("0x123abc.").is_err());
    assert!(parse("0o0648").is_err());
    assert!(parse("0b012").is_err());
    assert!(parse("0x").is_err());
}

#[test]
fn test_keyword_numbers() {
    assert_eq!(eval("Infinity"), Value::from(f64::INFINITY));
    assert_eq!(eval("-Infinity"), Value::from(f64::NEG_INFINITY));
    assert_eq!(eval("NaN"), Value::from(f64::NAN));
}

#[test]
fn test_bigints() {
    assert_eq!(eval("37n"), Value::BigInt(BigInt::from(37)));
    assert_eq!(eval("0n"), Value::BigInt(BigInt::from(0)));
    assert_eq!(eval("-12n"), Value::BigInt(BigInt::from(-12)));
    assert_eq!(
        eval("123456789012345678901234567890n").to_string(),
        "123456789012345678901234567890n"
    );

    assert!(parse("1.5n").is_err());
    assert!(parse("0x10n").is_err());
    assert_eq!(fails("+1n").kind(), ErrorKind::Type);
}

#[test]
fn test_quoted_strings() {
    assert_eq!(eval("'foo'"), Value::from("foo"));
    assert_eq!(eval("\"foo\""), Value::from("foo"));
    assert_eq!(eval("''"), Value::from(""));
    assert_eq!(eval(r#""it's""#), Value::from("it's"));
    assert_eq!(eval(r"'it\'s'"), Value::from("it's"));
    assert_eq!(eval(r"'\0\n\r\v\t\b\f\\'"), Value::from("\0\n\r\u{b}\t\u{8}\u{c}\\"));
    assert_eq!(eval(r"'\x41B\u{43}'"), Value::from("ABC"));
    assert_eq!(eval(r"'\q'"), Value::from("q"));
    assert_eq!(eval("'a\\\nb'"), Value::from("ab"));
    assert_eq!(eval("'a\\\r\nb'"), Value::from("ab"));
    assert_eq!(eval(r"'\u{1F601}'"), Value::from("😁"));

    assert!(parse("'foo").is_err());
    assert!(parse("'a\nb'").is_err());
    assert!(parse(r"'\x4'").is_err());
    assert_eq!(
        fails(r"'\u{FFFFFF}'"),
        Error::InvalidCodePoint { index: 1 }
    );
}

#[test]
fn test_template_strings() {
    assert_eq!(eval("`foo`"), Value::from("foo"));
    assert_eq!(eval("`a\nb`"), Value::from("a\nb"));
    assert_eq!(eval("`${1}+${ 2 }`"), Value::from("1+2"));
    assert_eq!(eval("`x${[1, [2, 3]]}y`"), Value::from("x1,2,3y"));
    assert_eq!(eval("`${null}-${undefined}`"), Value::from("null-undefined"));
    assert_eq!(eval("`${`in${'ner'}`}`"), Value::from("inner"));
    assert_eq!(eval("`$x{y}`"), Value::from("$x{y}"));

    assert!(parse("`${1`").is_err());
    assert!(parse("`${}`").is_err());
}

#[test]
fn test_arrays_and_holes() {
    assert_eq!(eval("[]"), Value::Array(vec![]));
    assert_eq!(eval("[ ]"), Value::Array(vec![]));
    assert_eq!(eval("[1, 2]"), list(vec![Value::from(1), Value::from(2)]));
    assert_eq!(eval("[1, 2,]"), list(vec![Value::from(1), Value::from(2)]));
    assert_eq!(eval("[,]"), Value::Array(vec![None]));
    assert_eq!(eval("[,,]"), Value::Array(vec![None, None]));
    assert_eq!(
        eval("[,3]"),
        Value::Array(vec![None, Some(Value::from(3))])
    );
    assert_eq!(
        eval("[1,,3]"),
        Value::Array(vec![Some(Value::from(1)), None, Some(Value::from(3))])
    );
    assert_eq!(
        eval("[1,,]"),
        Value::Array(vec![Some(Value::from(1)), None])
    );

    assert!(parse("[").is_err());
    assert!(parse("[1 2]").is_err());
    assert!(parse("[1,").is_err());
}

#[test]
fn test_array_spread() {
    assert_eq!(
        eval("[0, ...[1, 2], ...'ab']"),
        list(vec![
            Value::from(0),
            Value::from(1),
            Value::from(2),
            Value::from("a"),
            Value::from("b"),
        ])
    );
    assert_eq!(
        eval("[...[1, , 3]]"),
        list(vec![Value::from(1), Value::Undefined, Value::from(3)])
    );
    assert_eq!(
        eval("[...new Set([1, 1, 2])]"),
        list(vec![Value::from(1), Value::from(1), Value::from(2)])
    );
    assert_eq!(
        eval("[...new Map([['k', 1]])]"),
        list(vec![list(vec![Value::from("k"), Value::from(1)])])
    );

    let err = fails("[...{}]");
    assert_eq!(err.kind(), ErrorKind::Type);
    assert!(fails("[...1]").to_string().contains("is not iterable"));
}

#[test]
fn test_objects() {
    assert_eq!(eval("({})"), Value::Object(Map::new()));
    assert_eq!(
        eval("({foo: 'bar', 'a b': 1, \"c\": 2, 3: 4, 1.5: 5,})"),
        object(&[
            ("foo", Value::from("bar")),
            ("a b", Value::from(1)),
            ("c", Value::from(2)),
            ("3", Value::from(4)),
            ("1.5", Value::from(5)),
        ])
    );
    assert_eq!(
        eval("({a: 1, a: 2})"),
        object(&[("a", Value::from(2))])
    );

    assert!(parse("({foo})").is_err());
    assert!(parse("({'foo'})").is_err());
    assert!(parse("({foo: })").is_err());
    assert!(parse("({foo: 1").is_err());
}

#[test]
fn test_computed_keys() {
    assert_eq!(
        eval("({['a']: 1, [null]: 2, [`t${1}`]: 3})"),
        object(&[
            ("a", Value::from(1)),
            ("null", Value::from(2)),
            ("t1", Value::from(3)),
        ])
    );
}

#[test]
fn test_object_spread() {
    assert_eq!(
        eval("({a: 1, ...{b: 2, a: 3}, c: 4})"),
        object(&[
            ("a", Value::from(3)),
            ("b", Value::from(2)),
            ("c", Value::from(4)),
        ])
    );
    assert_eq!(
        eval("({...null, ...undefined, ...1, ...true})"),
        Value::Object(Map::new())
    );
    assert_eq!(
        eval("({...new Map([['k', 'v']])})"),
        object(&[("k", Value::from("v"))])
    );
}

#[test]
fn test_strict_mode_rejects_leading_brace() {
    let strict = ParseOptions::new().with_strict(true);
    assert!(parse_with_options("{}", &strict).is_err());
    assert!(parse_with_options("  {a: 1}", &strict).is_err());
    assert!(parse_with_options("/* c */ {a: 1}", &strict).is_err());
    assert!(parse_with_options("({a: 1})", &strict).is_ok());
    assert!(parse_with_options("[{a: 1}]", &strict).is_ok());

    assert_eq!(eval("{a: 1}"), object(&[("a", Value::from(1))]));
}

#[test]
fn test_unary_expressions() {
    assert_eq!(eval("-1"), Value::from(-1));
    assert_eq!(eval("+1"), Value::from(1));
    assert_eq!(eval("- 1"), Value::from(-1));
    assert_eq!(eval("-+1"), Value::from(-1));
    assert_eq!(eval("+-+1"), Value::from(-1));
    assert_eq!(eval("-'12'"), Value::from(-12));
    assert_eq!(eval("+''"), Value::from(0));
    assert_eq!(eval("+true"), Value::from(1));
    assert_eq!(eval("+null"), Value::from(0));
    assert_eq!(eval("+[]"), Value::from(0));
    assert_eq!(eval("+[5]"), Value::from(5));
    assert_eq!(eval("+'0x10'"), Value::from(16));
    assert!(matches!(eval("+undefined"), Value::Number(n) if n.is_nan()));
    assert!(matches!(eval("+{}"), Value::Number(n) if n.is_nan()));
    assert!(matches!(eval("-0"), Value::Number(n) if n == 0.0 && n.is_sign_negative()));

    assert!(parse("++1").is_err());
    assert!(parse("--1").is_err());
    assert!(parse("-").is_err());
}

#[test]
fn test_groups_and_sequences() {
    assert_eq!(eval("(1)"), Value::from(1));
    assert_eq!(eval("( ( 'a' ) )"), Value::from("a"));
    assert_eq!(eval("1, 2, 3"), Value::from(3));
    assert_eq!(eval("(1, 2)"), Value::from(2));
    assert_eq!(eval("[(1, 2)]"), list(vec![Value::from(2)]));

    assert!(parse("()").is_err());
    assert!(parse("(1").is_err());
    assert!(parse("1,").is_err());
}

#[test]
fn test_member_access() {
    assert_eq!(eval("'abc'.length"), Value::from(3));
    assert_eq!(eval("'abc'[1]"), Value::from("b"));
    assert_eq!(eval("[1, 2, 3].length"), Value::from(3));
    assert_eq!(eval("({a: [1, {b: 'c'}]}).a[1].b"), Value::from("c"));
    assert_eq!(eval("({a: 1})['a']"), Value::from(1));
    assert_eq!(eval("({a: 1}) . a"), Value::from(1));
    assert_eq!(eval("({}).missing"), Value::Undefined);
    assert_eq!(eval("new Map([[1, 'x']]).size"), Value::from(1));
    assert_eq!(eval("/ab/gi.flags"), Value::from("gi"));
    assert_eq!(eval("new TypeError('m').message"), Value::from("m"));

    assert_eq!(eval("null?.a"), Value::Undefined);
    assert_eq!(eval("undefined?.a.b.c"), Value::Undefined);
    assert_eq!(eval("({a: null})?.a?.[0]"), Value::Undefined);

    let err = fails("undefined.a");
    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(
        err.to_string(),
        "Cannot read properties of undefined (reading 'a')"
    );
}

#[test]
fn test_new_expressions() {
    assert_eq!(
        eval("new Date(2012, 1, 5, 23, 37)"),
        Value::Timestamp(1_328_485_020_000.0)
    );
    assert_eq!(
        eval("new Date('2021-04-14')"),
        Value::Timestamp(1_618_358_400_000.0)
    );
    assert_eq!(eval("new Date(0)"), Value::Timestamp(0.0));
    assert!(matches!(eval("new Date('nope')"), Value::Timestamp(ms) if ms.is_nan()));

    assert_eq!(
        eval("new Error('Some error')"),
        Value::Error(ErrorValue::new(ErrorName::Error, "Some error"))
    );
    assert_eq!(
        eval("new RangeError"),
        Value::Error(ErrorValue::new(ErrorName::RangeError, ""))
    );
    assert_eq!(
        eval("new Map([['foo', 37], [true, null]])"),
        Value::OrderedMap(vec![
            (Value::from("foo"), Value::from(37)),
            (Value::Bool(true), Value::Null),
        ])
    );
    assert_eq!(
        eval("new Set('aba')"),
        Value::OrderedSet(vec![Value::from("a"), Value::from("b"), Value::from("a")])
    );
    assert_eq!(
        eval("new RegExp('^fo.*bar?$', 'g')"),
        Value::Pattern(Pattern::new("^fo.*bar?$", "g").unwrap())
    );
    assert_eq!(eval("new String('s')"), Value::Boxed(Boxed::String("s".to_string())));
    assert_eq!(eval("new Number"), Value::Boxed(Boxed::Number(0.0)));
    assert_eq!(eval("new Boolean(1)"), Value::Boxed(Boxed::Boolean(true)));
    assert_eq!(eval("new Object({foo: 3})"), object(&[("foo", Value::from(3))]));
    assert_eq!(eval("new Array(3)"), Value::Array(vec![None, None, None]));
    assert_eq!(eval("new Array('foo')"), list(vec![Value::from("foo")]));
    assert_eq!(
        eval("new Array([, , ,])"),
        list(vec![Value::Array(vec![None, None, None])])
    );
    assert_eq!(
        eval("new Function('a', 'b', 'return a + b')"),
        Value::Callable(Callable::new("a,b", "return a + b"))
    );
}

#[test]
fn test_new_expression_errors() {
    assert_eq!(fails("new Foo()"), Error::reference("Foo"));
    // The unknown callee wins over errors inside its arguments.
    assert_eq!(fails("new Foo(bar)"), Error::reference("Foo"));
    assert_eq!(fails("new Foo(new Bar())"), Error::reference("Foo"));
    assert_eq!(fails("new Date(bar)"), Error::reference("bar"));
    assert_eq!(fails("new Array(-1)").kind(), ErrorKind::Range);
    assert_eq!(fails("new Map([1])").kind(), ErrorKind::Type);
    assert_eq!(fails("new RegExp('a', 'gg')").kind(), ErrorKind::Syntax);

    assert!(fails("new {}").is_syntax());
    assert!(fails("new").is_syntax());
    assert!(fails("new Date(").is_syntax());
}

#[test]
fn test_new_on_variable() {
    let options = ParseOptions::new().with_variable("x", Value::from(1));
    let err = parse_with_options("new x()", &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(err.to_string(), "x is not a constructor");

    let options = ParseOptions::new().with_assignment(true);
    let err = parse_with_options("[y = 1, new y]", &options).unwrap_err();
    assert_eq!(err.to_string(), "y is not a constructor");
}

#[test]
fn test_patterns() {
    assert_eq!(
        eval("/^fo.*bar?$/g"),
        Value::Pattern(Pattern::new("^fo.*bar?$", "g").unwrap())
    );
    assert_eq!(eval("/a\\/b/").get(&Value::from("source")), Value::from("a\\/b"));
    assert_eq!(eval("/[/]/").get(&Value::from("source")), Value::from("[/]"));
    assert_eq!(eval("/a/yg").get(&Value::from("flags")), Value::from("gy"));

    assert_eq!(eval("//"), Value::Undefined);
    assert!(parse("/a").is_err());
    assert!(parse("/a\nb/").is_err());
    assert!(parse("/[a/").is_err());
    assert_eq!(
        fails("/a/gg"),
        Error::InvalidFlags {
            flags: "gg".to_string()
        }
    );
}

#[test]
fn test_comments_and_whitespace() {
    assert_eq!(eval("// lead\n1"), Value::from(1));
    assert_eq!(eval("/* a */ [ /* b */ 1 /* c */ , 2 ] // d"), list(vec![Value::from(1), Value::from(2)]));
    assert_eq!(eval("\t\r\n 'x' \n"), Value::from("x"));
    assert!(parse("/* unterminated").is_err());
}

#[test]
fn test_identifiers() {
    assert_eq!(eval("undefined"), Value::Undefined);
    assert_eq!(eval("null"), Value::Null);
    assert_eq!(eval("true"), Value::Bool(true));
    assert_eq!(eval("false"), Value::Bool(false));

    assert_eq!(fails("foo"), Error::reference("foo"));
    assert_eq!(fails("foo").to_string(), "foo is not defined");
    assert_eq!(fails("Date").kind(), ErrorKind::Type);
}

#[test]
fn test_deferred_errors_yield_to_syntax_errors() {
    assert_eq!(fails("[foo, bar]"), Error::reference("foo"));
    assert!(fails("[foo, ]]").is_syntax());
    assert!(fails("[new Foo(), 1").is_syntax());
    assert!(fails("[/a/gg, {]").is_syntax());
}

#[test]
fn test_variables() {
    let options = ParseOptions::new().with_variable("answer", Value::from(42));
    assert_eq!(
        parse_with_options("[answer, {answer}]", &options).unwrap(),
        list(vec![
            Value::from(42),
            object(&[("answer", Value::from(42))]),
        ])
    );

    let options = ParseOptions::new().with_assignment(true);
    assert_eq!(
        parse_with_options("x = [1, 2], [...x, x.length]", &options).unwrap(),
        list(vec![Value::from(1), Value::from(2), Value::from(2)])
    );
    assert!(parse("x = 1").is_err());
}

#[test]
fn test_depth_limit() {
    let options = ParseOptions::new().with_max_depth(4);
    assert!(parse_with_options("[[[[1]]]]", &options).is_ok());
    assert_eq!(
        parse_with_options("[[[[[1]]]]]", &options).unwrap_err(),
        Error::DepthLimitExceeded { limit: 4 }
    );
    assert_eq!(
        parse_with_options("({a: {b: {c: {d: {}}}}})", &options).unwrap_err().kind(),
        ErrorKind::Limit
    );

    let deep = format!("{}{}", "[".repeat(200), "]".repeat(200));
    assert_eq!(parse(&deep).unwrap_err().kind(), ErrorKind::Limit);

    let assigning = ParseOptions::new().with_assignment(true);
    let chain = format!("{}1", "a=".repeat(200_000));
    assert_eq!(
        parse_with_options(&chain, &assigning).unwrap_err().kind(),
        ErrorKind::Limit
    );
    let short = format!("{}1", "a=".repeat(8));
    assert_eq!(parse_with_options(&short, &assigning).unwrap(), Value::from(1));
}

#[test]
fn test_document() {
    let input = r#"
        // release manifest
        {
            name: 'serde_eson',
            version: [0, 1, 0],
            released: new Date('2021-04-14'),
            tags: new Set(['parser', 'notation']),
            checksum: 0xff_ff,
            downloads: 12_345n,
            pattern: /^v\d+$/i,
            'quoted key': `built ${2}x`,
            extra: undefined,
        }
    "#;
    let value = eval(input);
    println!("Parsed document: {value:?}");

    let obj = value.as_object().unwrap();
    assert_eq!(obj.len(), 9);
    assert_eq!(obj.get("name"), Some(&Value::from("serde_eson")));
    assert_eq!(
        obj.get("released"),
        Some(&Value::Timestamp(1_618_358_400_000.0))
    );
    assert_eq!(obj.get("checksum"), Some(&Value::from(65535)));
    assert_eq!(obj.get("downloads"), Some(&Value::BigInt(BigInt::from(12345))));
    assert_eq!(obj.get("quoted key"), Some(&Value::from("built 2x")));
    assert_eq!(obj.get("extra"), Some(&Value::Undefined));
    assert_eq!(
        value.get(&Value::from("tags")).get(&Value::from("size")),
        Value::from(2)
    );
}
