use std::fmt;

/// Runtime values in Pisscript
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    /// Text, called Words in the language
    Words(String),
}

/// The dynamic type tag of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Words,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Number => write!(f, "number"),
            ValueKind::Words => write!(f, "words"),
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Words(_) => ValueKind::Words,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Words(_) => None,
        }
    }

    pub fn as_words(&self) -> Option<&str> {
        match self {
            Value::Words(s) => Some(s),
            Value::Number(_) => None,
        }
    }

    /// Glue some words onto the end. A number is rendered first, so the
    /// result is always Words.
    pub fn append(&self, words: &str) -> Value {
        let mut text = self.to_string();
        text.push_str(words);
        Value::Words(text)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Words(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Words(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Words(s)
    }
}

/// A number went below zero. Tubs can't hold negative amounts, and the
/// interpreter treats this as a crash rather than an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryFault {
    pub value: f64,
}

impl fmt::Display for MemoryFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Segmentation fault (Tub went to {})", self.value)
    }
}

/// A named cell. The kind always follows the value since it's read straight
/// off the variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Tub {
    value: Value,
}

impl Tub {
    /// A fresh, empty Tub holds the number 0
    pub fn new() -> Self {
        Tub {
            value: Value::Number(0.0),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// Overwrite the contents, refusing to hold a negative number
    pub fn set(&mut self, value: Value) -> Result<(), MemoryFault> {
        if let Value::Number(n) = value {
            if n < 0.0 {
                return Err(MemoryFault { value: n });
            }
        }
        self.value = value;
        Ok(())
    }

    /// Empty the Tub back to 0, handing back what was in it
    pub fn drain(&mut self) -> Value {
        std::mem::replace(&mut self.value, Value::Number(0.0))
    }
}

impl Default for Tub {
    fn default() -> Self {
        Self::new()
    }
}
