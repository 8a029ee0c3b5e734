use std::fmt;

use crate::{args::ArgumentList, cmd::Cmd, error::Error, opts::Options};

/// A parsed option value, or a bound positional argument.
///
/// Untransformed captures are `Str`; forbidden-argument options resolve to
/// `Bool(true)`; `multiple` options accumulate into `List`. Transforms may
/// produce any variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Str(String),
    Int(i64),
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Int(n)
    }
}

/// Whether an option takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentMode {
    Forbidden,
    Required,
    Optional,
}

pub type Transform = Box<dyn Fn(&str) -> Result<Value, String>>;
pub type OptionHook = Box<dyn Fn(&Value, &Cmd<'_>) -> Result<(), Error>>;
pub type Action = Box<dyn Fn(&Options, &ArgumentList, &Cmd<'_>) -> Result<(), Error>>;

/// Immutable description of one flag/option.
///
/// Identity is the `long` name when present, the `short` name otherwise;
/// that key is how the option appears in the parsed options map. Built once
/// at definition time, never mutated by parsing.
pub struct OptionDefinition {
    short: Option<char>,
    long: Option<String>,
    desc: String,
    argument: ArgumentMode,
    multiple: bool,
    hidden: bool,
    default: Option<Value>,
    transform: Option<Transform>,
    on_parsed: Option<OptionHook>,
    key: String,
}

impl OptionDefinition {
    /// An option whose presence is the value (`argument: forbidden`).
    ///
    /// # Panics
    ///
    /// Panics when both `short` and `long` are absent.
    pub fn flag<'a>(short: impl Into<Option<char>>, long: impl Into<Option<&'a str>>, desc: &str) -> OptionDefinition {
        OptionDefinition::with_mode(short.into(), long.into(), desc, ArgumentMode::Forbidden)
    }

    /// An option that must be given a value.
    pub fn required<'a>(short: impl Into<Option<char>>, long: impl Into<Option<&'a str>>, desc: &str) -> OptionDefinition {
        OptionDefinition::with_mode(short.into(), long.into(), desc, ArgumentMode::Required)
    }

    /// An option that may be given a value.
    pub fn optional<'a>(short: impl Into<Option<char>>, long: impl Into<Option<&'a str>>, desc: &str) -> OptionDefinition {
        OptionDefinition::with_mode(short.into(), long.into(), desc, ArgumentMode::Optional)
    }

    fn with_mode(short: Option<char>, long: Option<&str>, desc: &str, argument: ArgumentMode) -> OptionDefinition {
        let key = match (&long, short) {
            (Some(long), _) => long.to_string(),
            (None, Some(short)) => short.to_string(),
            (None, None) => panic!("option needs a short or a long name"),
        };
        OptionDefinition {
            short,
            long: long.map(str::to_string),
            desc: desc.to_string(),
            argument,
            multiple: false,
            hidden: false,
            default: None,
            transform: None,
            on_parsed: None,
            key,
        }
    }

    /// Accumulate repeated occurrences into a [`Value::List`] instead of
    /// overwriting.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Suppress from the default help listing.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// The value used when the option never occurs (back-filled after
    /// parsing), or when an optional-argument occurrence is given no value.
    /// Defaults are final values and are never passed through `transform`.
    ///
    /// # Panics
    ///
    /// Panics for forbidden-argument options, which always resolve to
    /// boolean presence.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        assert!(
            self.argument != ArgumentMode::Forbidden,
            "a default value cannot be specified for flag options"
        );
        self.default = Some(value.into());
        self
    }

    /// Pure conversion applied to each captured raw value before storage.
    /// A failure aborts parsing with an "invalid value" error naming this
    /// option and the offending raw string.
    pub fn transform(mut self, f: impl Fn(&str) -> Result<Value, String> + 'static) -> Self {
        self.transform = Some(Box::new(f));
        self
    }

    /// Side-effecting hook invoked once per successful parse occurrence,
    /// with the stored value and the command being parsed for.
    pub fn on_parsed(mut self, f: impl Fn(&Value, &Cmd<'_>) -> Result<(), Error> + 'static) -> Self {
        self.on_parsed = Some(Box::new(f));
        self
    }

    pub fn short(&self) -> Option<char> {
        self.short
    }

    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn argument(&self) -> ArgumentMode {
        self.argument
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// The option's identity in the parsed options map: `long` when
    /// present, `short` otherwise. Case-sensitive.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// `--long` when a long name exists, `-s` otherwise. Used in
    /// diagnostics.
    pub fn formatted_name(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => unreachable!("validated at construction"),
        }
    }

    pub(crate) fn transform_fn(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    pub(crate) fn hook(&self) -> Option<&OptionHook> {
        self.on_parsed.as_ref()
    }
}

impl fmt::Debug for OptionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDefinition")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("argument", &self.argument)
            .field("multiple", &self.multiple)
            .field("hidden", &self.hidden)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// A named positional parameter. The order of parameter definitions on a
/// command determines positional binding.
pub struct ParamDefinition {
    name: String,
    transform: Option<Transform>,
}

impl ParamDefinition {
    pub fn new(name: &str) -> ParamDefinition {
        ParamDefinition { name: name.to_string(), transform: None }
    }

    pub fn transform(mut self, f: impl Fn(&str) -> Result<Value, String> + 'static) -> Self {
        self.transform = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn transform_fn(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }
}

impl fmt::Debug for ParamDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamDefinition").field("name", &self.name).finish_non_exhaustive()
    }
}
