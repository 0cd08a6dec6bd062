// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information
use super::*;
use std::any::Any;
use std::fmt;
use std::result::Result;

trait TestCaseArgument: Any {
    fn parse_into(&mut self, text: &str) -> Result<(), String>;
    fn same(&self, other: &dyn TestCaseArgument) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn debug(&self) -> String;
}

fn test_case_argument_same<T: TestCaseArgument + Sized, SameFn: FnOnce(&T, &T) -> bool>(
    self_: &T,
    other: &dyn TestCaseArgument,
    same_fn: SameFn,
) -> bool {
    if let Some(other) = other.as_any().downcast_ref::<T>() {
        same_fn(self_, other)
    } else {
        false
    }
}

macro_rules! impl_test_case_argument_for_int {
    ($t:ident) => {
        impl TestCaseArgument for $t {
            fn parse_into(&mut self, text: &str) -> Result<(), String> {
                let mut bytes = text.bytes();
                let mut peek = bytes.next();
                let sign = if $t::min_value() != 0 && peek == Some(b'-') {
                    peek = bytes.next();
                    Sign::Negative
                } else {
                    Sign::Positive
                };
                let radix;
                if peek == Some(b'0') {
                    peek = bytes.next();
                    match peek {
                        Some(b'x') | Some(b'X') => {
                            peek = bytes.next();
                            radix = 16;
                        }
                        Some(b'o') | Some(b'O') => {
                            peek = bytes.next();
                            radix = 8;
                        }
                        Some(b'b') | Some(b'B') => {
                            peek = bytes.next();
                            radix = 2;
                        }
                        None => {
                            *self = 0;
                            return Ok(());
                        }
                        _ => return Err("octal numbers must start with 0o".into()),
                    }
                } else {
                    radix = 10;
                };
                if peek == None {
                    return Err("number has no digits".into());
                }
                let mut retval: $t = 0;
                while let Some(digit_char) = peek.take().or_else(|| bytes.next()) {
                    let mut digit = (digit_char as char)
                        .to_digit(radix)
                        .ok_or_else(|| "invalid digit")? as $t;
                    if sign == Sign::Negative {
                        // don't use neg operator since it doesn't exist for unsigned types
                        digit = 0 - digit;
                    }
                    retval = retval
                        .checked_mul(radix as $t)
                        .ok_or_else(|| "number too big")?
                        .checked_add(digit)
                        .ok_or_else(|| "number too big")?;
                }
                *self = retval;
                Ok(())
            }
            fn same(&self, other: &dyn TestCaseArgument) -> bool {
                test_case_argument_same(self, other, PartialEq::eq)
            }
            fn debug(&self) -> String {
                format!("{:#X}", self)
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

impl_test_case_argument_for_int!(u64);
impl_test_case_argument_for_int!(i32);

enum SpecialValue {
    Infinity,
    NaN { signaling: bool, payload: BigInt },
}

fn parse_bigint(text: &str) -> Result<BigInt, String> {
    text.parse::<BigInt>()
        .map_err(|err| format!("invalid integer {:?}: {}", text, err))
}

/// splits off a leading `-`
fn parse_negative(text: &str) -> (bool, &str) {
    match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    }
}

fn parse_special_value(text: &str) -> Result<Option<SpecialValue>, String> {
    if text == "Infinity" {
        return Ok(Some(SpecialValue::Infinity));
    }
    let (signaling, payload) = if let Some(payload) = text.strip_prefix("sNaN") {
        (true, payload)
    } else if let Some(payload) = text.strip_prefix("NaN") {
        (false, payload)
    } else {
        return Ok(None);
    };
    let payload = if payload.is_empty() {
        BigInt::zero()
    } else {
        parse_bigint(payload)?
    };
    Ok(Some(SpecialValue::NaN { signaling, payload }))
}

impl TestCaseArgument for ERational {
    fn parse_into(&mut self, text: &str) -> Result<(), String> {
        let (negative, text) = parse_negative(text);
        *self = match parse_special_value(text)? {
            Some(SpecialValue::Infinity) => {
                ERational::signed_infinity(Sign::from_negative(negative))
            }
            Some(SpecialValue::NaN { signaling, payload }) => {
                ERational::create_nan(payload, signaling, negative).map_err(|e| e.to_string())?
            }
            None => {
                let (numerator, denominator) = match text.find('/') {
                    Some(index) => (&text[..index], &text[index + 1..]),
                    None => (text, "1"),
                };
                let value = ERational::new(parse_bigint(numerator)?, parse_bigint(denominator)?)
                    .map_err(|e| e.to_string())?;
                if negative {
                    value.negate()
                } else {
                    value
                }
            }
        };
        Ok(())
    }
    fn same(&self, other: &dyn TestCaseArgument) -> bool {
        test_case_argument_same(self, other, PartialEq::eq)
    }
    fn debug(&self) -> String {
        format!("{:?}", self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<R: Radix> TestCaseArgument for Extended<R> {
    fn parse_into(&mut self, text: &str) -> Result<(), String> {
        let (negative, text) = parse_negative(text);
        *self = match parse_special_value(text)? {
            Some(SpecialValue::Infinity) => Extended::signed_infinity(Sign::from_negative(negative)),
            Some(SpecialValue::NaN { signaling, payload }) => {
                Extended::create_nan(payload, signaling, negative).map_err(|e| e.to_string())?
            }
            None => {
                let index = text
                    .find(R::EXPONENT_MARKER)
                    .ok_or("missing exponent marker")?;
                let value = Extended::new(
                    parse_bigint(&text[..index])?,
                    parse_bigint(&text[index + 1..])?,
                );
                if negative {
                    value.negate()
                } else {
                    value
                }
            }
        };
        Ok(())
    }
    fn same(&self, other: &dyn TestCaseArgument) -> bool {
        test_case_argument_same(self, other, PartialEq::eq)
    }
    fn debug(&self) -> String {
        self.to_string()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

macro_rules! impl_test_case_argument_for_enum {
    (enum $type:ident { $($name:ident,)* }) => {
        impl TestCaseArgument for $type {
            fn parse_into(&mut self, text: &str) -> Result<(), String> {
                *self = match text {
                    $(stringify!($name) => $type::$name,)*
                    _ => return Err(concat!("invalid ", stringify!($type)).into()),
                };
                Ok(())
            }
            fn same(&self, other: &dyn TestCaseArgument) -> bool {
                test_case_argument_same(self, other, PartialEq::eq)
            }
            fn debug(&self) -> String {
                format!("{:?}", self)
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

impl_test_case_argument_for_enum! {
    enum RoundingMode {
        TiesToEven,
        TowardZero,
        TowardNegative,
        TowardPositive,
        TiesToAway,
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl Default for Operation {
    fn default() -> Self {
        Operation::Add
    }
}

impl_test_case_argument_for_enum! {
    enum Operation {
        Add,
        Subtract,
        Multiply,
        Divide,
        Remainder,
    }
}

impl TestCaseArgument for StatusFlags {
    fn parse_into(&mut self, text: &str) -> Result<(), String> {
        if text == "(empty)" {
            *self = StatusFlags::empty();
            return Ok(());
        }
        let mut retval = StatusFlags::empty();
        for word in text.split('|') {
            retval |= match word {
                "INVALID_OPERATION" => StatusFlags::INVALID_OPERATION,
                "OVERFLOW" => StatusFlags::OVERFLOW,
                "UNDERFLOW" => StatusFlags::UNDERFLOW,
                "INEXACT" => StatusFlags::INEXACT,
                _ => return Err("invalid status flags".into()),
            };
        }
        *self = retval;
        Ok(())
    }
    fn same(&self, other: &dyn TestCaseArgument) -> bool {
        test_case_argument_same(self, other, PartialEq::eq)
    }
    fn debug(&self) -> String {
        format!("{:?}", self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct TestCaseInput<'a> {
    name: &'static str,
    argument: &'a mut dyn TestCaseArgument,
}

struct TestCaseOutput<'a> {
    name: &'static str,
    expected_argument: &'a mut dyn TestCaseArgument,
    output_argument: &'a dyn TestCaseArgument,
}

struct TestCaseIO<'a> {
    inputs: Vec<TestCaseInput<'a>>,
    outputs: Vec<TestCaseOutput<'a>>,
}

#[derive(Copy, Clone)]
struct FileLocation<'a> {
    line: usize,
    file_name: &'a str,
}

impl fmt::Display for FileLocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.file_name, self.line)
    }
}

trait TestCase {
    fn io(&mut self) -> TestCaseIO<'_>;
    fn calculate(&mut self, location: FileLocation);
    fn parse_and_run(&mut self, test_case: &str, location: FileLocation) {
        let mut arguments_text = test_case.split(' ');
        let io = self.io();
        for argument in io.inputs {
            if let Some(argument_text) = arguments_text.next() {
                if let Err(err) = argument.argument.parse_into(argument_text) {
                    panic!("{}: invalid value for {}: {}", location, argument.name, err);
                } else {
                    println!(
                        "{}: {} = {}",
                        location,
                        argument.name,
                        argument.argument.debug()
                    );
                }
            } else {
                panic!("{}: missing argument: {}", location, argument.name);
            }
        }
        for argument in io.outputs {
            if let Some(argument_text) = arguments_text.next() {
                if let Err(err) = argument.expected_argument.parse_into(argument_text) {
                    panic!("{}: invalid value for {}: {}", location, argument.name, err);
                } else {
                    println!(
                        "{}: expected_{} = {}",
                        location,
                        argument.name,
                        argument.expected_argument.debug()
                    );
                }
            } else {
                panic!("{}: missing argument: {}", location, argument.name);
            }
        }
        if arguments_text.next().is_some() {
            panic!("{}: too many arguments", location);
        }
        self.calculate(location);
        let io = self.io();
        for argument in io.outputs.iter() {
            println!(
                "{}: {} = {}",
                location,
                argument.name,
                argument.output_argument.debug()
            );
        }
        for argument in io.outputs {
            if !argument.expected_argument.same(argument.output_argument) {
                panic!("{}: test case failed", location);
            }
        }
    }
}

fn execute_test_cases<T: TestCase + Default>(test_cases: &str, file_name: &str) {
    for (i, test_case) in test_cases.lines().enumerate() {
        if test_case.starts_with('#') || test_case.is_empty() {
            continue;
        }
        T::default().parse_and_run(
            test_case,
            FileLocation {
                file_name,
                line: i + 1,
            },
        );
    }
}

macro_rules! test_case {
    (
        #[test_case_file_name = $test_case_file_name:expr]
        $(#[$meta:meta])*
        fn $test_name:ident($($input:ident: $input_type:ty,)+ $(#[output] $output:ident: $output_type:ty,)+) {
            $($body:tt)*
        }
    ) => {
        test_case!{
            #[test_case_file_path = concat!(env!("CARGO_MANIFEST_DIR"), "/test_data/", $test_case_file_name)]
            $(#[$meta])*
            fn $test_name($($input: $input_type,)+ $(#[output] $output: $output_type,)+) {
                $($body)*
            }
        }
    };
    (
        #[test_case_file_path = $test_case_file_path:expr]
        $(#[$meta:meta])*
        fn $test_name:ident($($input:ident: $input_type:ty,)+ $(#[output] $output:ident: $output_type:ty,)+) {
            $($body:tt)*
        }
    ) => {
        #[test]
        fn $test_name() {
            #[derive(Default)]
            struct TestCaseImpl {
                $($input: $input_type,)+
                $($output: ($output_type, $output_type),)+
            }

            impl TestCase for TestCaseImpl {
                fn io(&mut self) -> TestCaseIO {
                    let inputs = vec![
                        $(TestCaseInput {
                            name: stringify!($input),
                            argument: &mut self.$input,
                        }),+
                    ];
                    let outputs = vec![
                        $(TestCaseOutput {
                            name: stringify!($output),
                            expected_argument: &mut self.$output.0,
                            output_argument: &mut self.$output.1,
                        }),+
                    ];
                    TestCaseIO {
                        inputs,
                        outputs,
                    }
                }
                fn calculate(&mut self, location: FileLocation) {
                    $(#[$meta])*
                    fn $test_name($($input: $input_type,)+ $($output: &mut $output_type,)+ location: FileLocation) {
                        let _ = &location;
                        $($body)*
                    }
                    $test_name($(self.$input.clone(),)+ $(&mut self.$output.1,)+ location);
                }
            }
            execute_test_cases::<TestCaseImpl>(include_str!($test_case_file_path), $test_case_file_path);
        }
    };
}

test_case! {
    #[test_case_file_name = "arithmetic.txt"]
    fn test_arithmetic(
        operation: Operation,
        a: ERational,
        b: ERational,
        #[output] result: ERational,
    ) {
        *result = match operation {
            Operation::Add => a.add(&b),
            Operation::Subtract => a.subtract(&b),
            Operation::Multiply => a.multiply(&b),
            Operation::Divide => a.divide(&b),
            Operation::Remainder => a.remainder(&b),
        };
    }
}

test_case! {
    #[test_case_file_name = "compare.txt"]
    fn test_compare(
        a: ERational,
        b: ERational,
        #[output] result: i32,
    ) {
        *result = a.compare_to(&b) as i32;
        assert_eq!(b.compare_to(&a) as i32, -*result, "not antisymmetric");
    }
}

test_case! {
    #[test_case_file_name = "compare_decimal.txt"]
    fn test_compare_decimal(
        rational: ERational,
        decimal: EDecimal,
        #[output] result: i32,
    ) {
        *result = rational.compare_to_decimal(&decimal) as i32;
    }
}

test_case! {
    #[test_case_file_name = "compare_float.txt"]
    fn test_compare_float(
        rational: ERational,
        binary_float: EFloat,
        #[output] result: i32,
    ) {
        *result = rational.compare_to_float(&binary_float) as i32;
    }
}

test_case! {
    #[test_case_file_name = "to_f64.txt"]
    fn test_to_f64(
        value: ERational,
        rounding_mode: RoundingMode,
        #[output] result_bits: u64,
        #[output] status_flags: StatusFlags,
    ) {
        let mut ctx = Context::new(0, rounding_mode);
        *result_bits = value.to_f64_with_context(Some(&mut ctx)).to_bits();
        *status_flags = ctx.status_flags;
    }
}

test_case! {
    #[test_case_file_name = "to_decimal.txt"]
    fn test_to_decimal(
        value: ERational,
        precision: u64,
        rounding_mode: RoundingMode,
        #[output] result: EDecimal,
        #[output] status_flags: StatusFlags,
    ) {
        let mut ctx = Context::new(precision, rounding_mode);
        *result = value.to_decimal(Some(&mut ctx));
        *status_flags = ctx.status_flags;
    }
}

test_case! {
    #[test_case_file_name = "fixed_decimal.txt"]
    fn test_fixed_decimal(
        value: ERational,
        #[output] packed_value_as_decimal: EDecimal,
    ) {
        let packed = value.to_fixed_decimal().expect("value fits");
        assert_eq!(FixedDecimal::from_bits(packed.bits()), Ok(packed));
        assert_eq!(
            ERational::from_fixed_decimal(packed).compare_to_decimal(&packed.to_decimal()),
            std::cmp::Ordering::Equal
        );
        *packed_value_as_decimal = packed.to_decimal();
    }
}
