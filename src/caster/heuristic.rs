// String heuristics for environment values
//
// Environment variables are always strings. The heuristic guesses the most
// probable value: a number, then a none-like word, then a boolean-like word.
// The first interpretation that succeeds wins.

use crate::value::Value;

const NONE_WORDS: [&str; 3] = ["none", "null", "nil"];
const TRUE_WORDS: [&str; 6] = ["true", "t", "yes", "y", "on", "1"];
const FALSE_WORDS: [&str; 7] = ["false", "f", "no", "n", "off", "0", ""];

/// Interprets `text` as the most probable value, or returns it unchanged.
pub fn interpret(text: &str) -> Value {
    parse_number(text)
        .or_else(|| parse_none(text))
        .or_else(|| parse_bool(text))
        .unwrap_or_else(|| Value::String(text.to_string()))
}

fn parse_number(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::Int(i));
    }
    trimmed.parse::<f64>().ok().map(Value::Float)
}

/// `Some(Value::Null)` for none-like words, case-insensitive.
pub fn parse_none(text: &str) -> Option<Value> {
    let word = text.trim().to_lowercase();
    NONE_WORDS.contains(&word.as_str()).then_some(Value::Null)
}

/// `Some(Value::Bool(_))` for boolean-like words, case-insensitive. The empty
/// string counts as false.
pub fn parse_bool(text: &str) -> Option<Value> {
    let word = text.trim().to_lowercase();
    if TRUE_WORDS.contains(&word.as_str()) {
        Some(Value::Bool(true))
    } else if FALSE_WORDS.contains(&word.as_str()) {
        Some(Value::Bool(false))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_numbers_win_first() {
        assert_eq!(interpret("1"), Value::Int(1));
        assert_eq!(interpret(" -7 "), Value::Int(-7));
        assert_eq!(interpret("2.5"), Value::Float(2.5));
    }

    #[test]
    fn test_none_words() {
        assert_eq!(interpret("null"), Value::Null);
        assert_eq!(interpret("NONE"), Value::Null);
        assert_eq!(interpret("Nil"), Value::Null);
    }

    #[test]
    fn test_bool_words() {
        assert_eq!(interpret("t"), Value::Bool(true));
        assert_eq!(interpret("YES"), Value::Bool(true));
        assert_eq!(interpret("off"), Value::Bool(false));
        assert_eq!(interpret(""), Value::Bool(false));
    }

    #[test]
    fn test_other_strings_pass_through() {
        assert_eq!(interpret("TestString"), Value::from("TestString"));
        assert_eq!(interpret("yes please"), Value::from("yes please"));
    }

    proptest! {
        #[test]
        fn integers_round_trip(i in any::<i64>()) {
            prop_assert_eq!(interpret(&i.to_string()), Value::Int(i));
        }

        #[test]
        fn lowercase_words_never_panic(s in "[a-z ]{0,12}") {
            let _ = interpret(&s);
        }
    }
}
