use std::collections::VecDeque;

use tracing::trace;

use crate::{
    args::ArgumentList,
    cmd::Cmd,
    def::{ArgumentMode, OptionDefinition, ParamDefinition, Value},
    error::{Error, Result},
    opts::Options,
};

/// What the scan should do after a positional token was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    Continue,
    Stop,
}

/// Observer attached to a parse run.
///
/// `argument_added` may stop the scan, leaving the rest of the token
/// sequence unprocessed; this is how a router command parses only far
/// enough to discover the subcommand name.
pub trait ParseDelegate {
    fn option_added(&mut self, _key: &str, _value: &Value) {}

    fn argument_added(&mut self, _argument: &str) -> ScanControl {
        ScanControl::Continue
    }
}

struct NoDelegate;

impl ParseDelegate for NoDelegate {}

/// One entry of the raw token record: the end-of-options marker is kept in
/// the record but excluded from the final positional sequence. A literal
/// `--` seen *after* the marker is an ordinary positional token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawToken {
    Separator,
    Positional(String),
}

/// A captured option occurrence, before storage.
enum Captured {
    /// Raw string still subject to the option's transform.
    Str(String),
    /// Boolean presence.
    Flag,
    /// An already-final value (the definition's default); skips transform.
    Final(Value),
}

/// Single left-to-right scan over a token sequence, splitting it into an
/// options map and a positional-token record. No backtracking; the only
/// lookahead is the value consumption of a value-bearing option.
///
/// State is local to one run; allocate a fresh parser per invocation.
pub struct Parser<'a> {
    remaining: VecDeque<String>,
    defns: Vec<&'a OptionDefinition>,
    params: &'a [ParamDefinition],
    explicitly_no_params: bool,
    options: Options,
    raw: Vec<RawToken>,
    no_more_options: bool,
    cmd: Option<&'a Cmd<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(
        tokens: &[String],
        defns: Vec<&'a OptionDefinition>,
        params: &'a [ParamDefinition],
        explicitly_no_params: bool,
    ) -> Parser<'a> {
        Parser {
            remaining: tokens.iter().cloned().collect(),
            defns,
            params,
            explicitly_no_params,
            options: Options::new(),
            raw: Vec::new(),
            no_more_options: false,
            cmd: None,
        }
    }

    /// Attaches the command on whose behalf this parse runs. With a
    /// command attached, each stored option fires its `on_parsed` hook.
    pub(crate) fn with_command(mut self, cmd: &'a Cmd<'a>) -> Parser<'a> {
        self.cmd = Some(cmd);
        self
    }

    pub fn run(&mut self) -> Result<()> {
        self.run_with(&mut NoDelegate)
    }

    pub fn run_with(&mut self, delegate: &mut dyn ParseDelegate) -> Result<()> {
        while let Some(token) = self.remaining.pop_front() {
            if token == "--" && !self.no_more_options {
                trace!("end-of-options marker");
                self.raw.push(RawToken::Separator);
                self.no_more_options = true;
            } else if self.no_more_options || !token.starts_with('-') || token == "-" {
                if self.add_argument(token, delegate) == ScanControl::Stop {
                    break;
                }
            } else if let Some(body) = token.strip_prefix("--") {
                self.long_option(body, delegate)?;
            } else {
                self.short_cluster(&token[1..], delegate)?;
            }
        }
        Ok(())
    }

    /// The parsed options. Does not include back-filled defaults; see
    /// [`Parser::apply_defaults`].
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Back-fills every definition with an unset key and a default value
    /// into the options map. Defaults are final values: no transform runs
    /// and no `on_parsed` hook fires.
    pub fn apply_defaults(&mut self) {
        fill_defaults(&mut self.options, &self.defns);
    }

    /// The raw positional record, end-of-options marker included.
    pub fn raw_tokens(&self) -> &[RawToken] {
        &self.raw
    }

    /// The positional tokens in order, marker excluded.
    pub fn positional_tokens(&self) -> Vec<String> {
        self.raw
            .iter()
            .filter_map(|t| match t {
                RawToken::Positional(s) => Some(s.clone()),
                RawToken::Separator => None,
            })
            .collect()
    }

    /// Tokens not yet consumed. Empty unless a delegate stopped the scan.
    pub fn unprocessed(&self) -> Vec<String> {
        self.remaining.iter().cloned().collect()
    }

    /// Binds the recorded positional tokens against the parameter
    /// definitions this parser was constructed with.
    pub fn argument_list(&self) -> Result<ArgumentList> {
        ArgumentList::bind(self.positional_tokens(), self.explicitly_no_params, self.params)
    }

    fn add_argument(&mut self, token: String, delegate: &mut dyn ParseDelegate) -> ScanControl {
        trace!(argument = %token, "positional token");
        let control = delegate.argument_added(&token);
        self.raw.push(RawToken::Positional(token));
        control
    }

    fn long_option(&mut self, body: &str, delegate: &mut dyn ParseDelegate) -> Result<()> {
        let (key, inline) = match body.split_once('=') {
            Some((key, value)) if !key.is_empty() && !value.is_empty() => {
                (key.to_string(), Some(value.to_string()))
            }
            _ => (body.to_string(), None),
        };

        let defn = self
            .defns
            .iter()
            .copied()
            .find(|d| d.long() == Some(key.as_str()))
            .ok_or_else(|| Error::IllegalOption(key.clone()))?;

        match defn.argument() {
            ArgumentMode::Required | ArgumentMode::Optional => {
                let captured = match inline {
                    Some(value) => Captured::Str(value),
                    None => self.find_value(defn, &key)?,
                };
                self.add_option(defn, captured, delegate)
            }
            ArgumentMode::Forbidden => self.add_option(defn, Captured::Flag, delegate),
        }
    }

    fn short_cluster(&mut self, cluster: &str, delegate: &mut dyn ParseDelegate) -> Result<()> {
        let len = cluster.chars().count();
        for (i, key) in cluster.chars().enumerate() {
            let defn = self
                .defns
                .iter()
                .copied()
                .find(|d| d.short() == Some(key))
                .ok_or_else(|| Error::IllegalOption(key.to_string()))?;

            match defn.argument() {
                ArgumentMode::Forbidden => self.add_option(defn, Captured::Flag, delegate)?,
                // A required-argument option buried in a cluster is
                // ambiguous; it must be last in the cluster or standalone.
                ArgumentMode::Required if i + 1 < len => {
                    return Err(Error::OptionRequiresAnArgument(key.to_string()));
                }
                ArgumentMode::Required | ArgumentMode::Optional => {
                    let captured = self.find_value(defn, &key.to_string())?;
                    self.add_option(defn, captured, delegate)?;
                }
            }
        }
        Ok(())
    }

    /// Looks ahead one token for an option's value. An option-shaped (or
    /// absent) lookahead is never consumed as a value; the fallback then
    /// depends on the argument mode.
    fn find_value(&mut self, defn: &OptionDefinition, key: &str) -> Result<Captured> {
        let lookahead = self.remaining.pop_front();
        match lookahead {
            Some(token) if !token.starts_with('-') => Ok(Captured::Str(token)),
            lookahead => match (defn.argument(), defn.default_value()) {
                (ArgumentMode::Optional, Some(default)) => Ok(Captured::Final(default.clone())),
                (ArgumentMode::Required, _) => Err(Error::OptionRequiresAnArgument(key.to_string())),
                _ => {
                    if let Some(token) = lookahead {
                        self.remaining.push_front(token);
                    }
                    Ok(Captured::Flag)
                }
            },
        }
    }

    fn add_option(&mut self, defn: &'a OptionDefinition, captured: Captured, delegate: &mut dyn ParseDelegate) -> Result<()> {
        let value = match captured {
            Captured::Str(raw) => match defn.transform_fn() {
                Some(f) => f(&raw).map_err(|_| Error::IllegalOptionValue {
                    option: defn.formatted_name(),
                    value: raw,
                })?,
                None => Value::Str(raw),
            },
            Captured::Flag => Value::Bool(true),
            Captured::Final(value) => value,
        };

        let key = defn.key();
        trace!(key, value = %value, "parsed option");
        if defn.is_multiple() {
            self.options.append(key, value.clone());
        } else {
            self.options.insert(key, value.clone());
        }
        delegate.option_added(key, &value);

        if let (Some(hook), Some(cmd)) = (defn.hook(), self.cmd) {
            hook(&value, cmd)?;
        }
        Ok(())
    }
}

/// Writes every definition's default under its key, unless the key is
/// already set. Used for the ancestor-inclusive back-fill after merging
/// parent options.
pub(crate) fn fill_defaults(options: &mut Options, defns: &[&OptionDefinition]) {
    for defn in defns {
        if let Some(default) = defn.default_value() {
            if !options.contains(defn.key()) {
                options.insert(defn.key(), default.clone());
            }
        }
    }
}
