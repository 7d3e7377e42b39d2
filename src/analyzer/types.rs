use std::fmt;

use crate::parser::TypeSpec;

/// Closed set of Chimera types. `Void` is the return type of procedures
/// with no result and the synthesized type of the empty list literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Type {
    Void,
    Boolean,
    Integer,
    String,
    ListOfBoolean,
    ListOfInteger,
    ListOfString,
}

impl Type {
    pub fn from_spec(spec: &TypeSpec) -> Self {
        use crate::lexer::TokenCategory;

        match spec {
            TypeSpec::Simple(token) => match token.category {
                TokenCategory::Boolean => Type::Boolean,
                TokenCategory::Integer => Type::Integer,
                TokenCategory::String => Type::String,
                _ => unreachable!("scalar type token expected, got {}", token),
            },
            TypeSpec::ListOf(token) => match token.category {
                TokenCategory::Boolean => Type::ListOfBoolean,
                TokenCategory::Integer => Type::ListOfInteger,
                TokenCategory::String => Type::ListOfString,
                _ => unreachable!("scalar type token expected, got {}", token),
            },
        }
    }

    pub fn is_list(self) -> bool {
        matches!(
            self,
            Type::ListOfBoolean | Type::ListOfInteger | Type::ListOfString
        )
    }

    /// The list type whose elements are `self`. Only defined for scalars.
    pub fn list_of(self) -> Self {
        match self {
            Type::Boolean => Type::ListOfBoolean,
            Type::Integer => Type::ListOfInteger,
            Type::String => Type::ListOfString,
            _ => unreachable!("no list type over {self}"),
        }
    }

    /// The element type of a list. Only defined for list types.
    pub fn element_type(self) -> Self {
        match self {
            Type::ListOfBoolean => Type::Boolean,
            Type::ListOfInteger => Type::Integer,
            Type::ListOfString => Type::String,
            _ => unreachable!("{self} is not a list type"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Type::Void => "VOID",
            Type::Boolean => "BOOLEAN",
            Type::Integer => "INTEGER",
            Type::String => "STRING",
            Type::ListOfBoolean => "LIST_OF_BOOLEAN",
            Type::ListOfInteger => "LIST_OF_INTEGER",
            Type::ListOfString => "LIST_OF_STRING",
        })
    }
}

/// Compile-time value of a constant, or the default a variable starts
/// with. Strings and list elements keep their source form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Str(String),
    BoolList(Vec<bool>),
    IntList(Vec<i32>),
    StrList(Vec<String>),
}

impl Value {
    pub fn default_for(symbol_type: Type) -> Self {
        match symbol_type {
            Type::Boolean => Value::Bool(false),
            Type::Integer => Value::Int(0),
            Type::String => Value::Str(String::new()),
            Type::ListOfBoolean => Value::BoolList(vec![]),
            Type::ListOfInteger => Value::IntList(vec![]),
            Type::ListOfString => Value::StrList(vec![]),
            Type::Void => unreachable!("no default value for VOID"),
        }
    }

    /// Packs scalar values of `element_type` into the matching list value.
    pub fn collect_list(element_type: Type, values: Vec<Value>) -> Self {
        match element_type {
            Type::Boolean => Value::BoolList(
                values
                    .into_iter()
                    .map(|value| match value {
                        Value::Bool(b) => b,
                        _ => unreachable!("element type checked as BOOLEAN"),
                    })
                    .collect(),
            ),
            Type::Integer => Value::IntList(
                values
                    .into_iter()
                    .map(|value| match value {
                        Value::Int(i) => i,
                        _ => unreachable!("element type checked as INTEGER"),
                    })
                    .collect(),
            ),
            Type::String => Value::StrList(
                values
                    .into_iter()
                    .map(|value| match value {
                        Value::Str(s) => s,
                        _ => unreachable!("element type checked as STRING"),
                    })
                    .collect(),
            ),
            _ => unreachable!("list elements are scalars"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn list<T: fmt::Display>(f: &mut fmt::Formatter, items: &[T]) -> fmt::Result {
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
            write!(f, "]")
        }

        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::BoolList(items) => list(f, items),
            Value::IntList(items) => list(f, items),
            Value::StrList(items) => list(f, items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Token, TokenCategory};

    #[test]
    fn test_from_spec() {
        let integer = Token::new(TokenCategory::Integer, "integer", 1, 1);
        assert_eq!(Type::from_spec(&TypeSpec::Simple(integer.clone())), Type::Integer);
        assert_eq!(Type::from_spec(&TypeSpec::ListOf(integer)), Type::ListOfInteger);
    }

    #[test]
    fn test_list_element_round_trip() {
        for scalar in [Type::Boolean, Type::Integer, Type::String] {
            assert_eq!(scalar.list_of().element_type(), scalar);
        }
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Str("hi".into()).to_string(), "\"hi\"");
        assert_eq!(Value::IntList(vec![1, 2, 3]).to_string(), "[1, 2, 3]");
        assert_eq!(Value::BoolList(vec![]).to_string(), "[]");
    }
}
