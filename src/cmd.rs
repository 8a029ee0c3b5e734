use std::fmt;
use std::process;

use tracing::debug;

use crate::{
    args::ArgumentList,
    def::{Action, OptionDefinition, ParamDefinition},
    error::{Error, Exit, Result},
    help,
    opts::Options,
    parse::{fill_defaults, ParseDelegate, Parser, ScanControl},
};

/// A node in the command tree: option and parameter definitions, child
/// commands, and optionally an action.
///
/// A command with an action is a *leaf* (executed directly); a command with
/// subcommands is a *router* (delegates to a chosen child). A command may
/// be both: when no subcommand token is supplied it runs its own action.
///
/// Trees are built once, with the consuming setters below, and are
/// read-only during execution; the only permitted later mutation is
/// appending subcommands via [`Command::add_command`].
pub struct Command {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) summary: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) usage: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) opt_defns: Vec<OptionDefinition>,
    pub(crate) param_defns: Vec<ParamDefinition>,
    pub(crate) explicitly_no_params: bool,
    pub(crate) default_subcommand: Option<String>,
    pub(crate) all_opts_as_args: bool,
    pub(crate) action: Option<Action>,
    pub(crate) subcommands: Vec<Command>,
}

impl Command {
    pub fn new(name: &str) -> Command {
        Command {
            name: name.to_string(),
            aliases: Vec::new(),
            summary: None,
            description: None,
            usage: None,
            hidden: false,
            opt_defns: Vec::new(),
            param_defns: Vec::new(),
            explicitly_no_params: false,
            default_subcommand: None,
            all_opts_as_args: false,
            action: None,
            subcommands: Vec::new(),
        }
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// The usage line, without the "usage:" prefix and without the
    /// supercommands' names.
    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    /// An alternative name this command can be invoked under.
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Suppress from the default help listing.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Attaches an option definition.
    ///
    /// # Panics
    ///
    /// Panics when another attached definition has the same identity key.
    pub fn option(mut self, defn: OptionDefinition) -> Self {
        assert!(
            self.opt_defns.iter().all(|d| d.key() != defn.key()),
            "duplicate option key `{}` on command `{}`",
            defn.key(),
            self.name
        );
        self.opt_defns.push(defn);
        self
    }

    /// Declares a positional parameter. Parameter order is binding order.
    ///
    /// # Panics
    ///
    /// Panics when the command was declared to take no parameters.
    pub fn param(self, name: &str) -> Self {
        self.param_def(ParamDefinition::new(name))
    }

    pub fn param_def(mut self, defn: ParamDefinition) -> Self {
        assert!(
            !self.explicitly_no_params,
            "command `{}` takes no parameters but `{}` was declared",
            self.name,
            defn.name()
        );
        self.param_defns.push(defn);
        self
    }

    /// Declares that the command takes no positional arguments at all;
    /// any positional token then fails with an argument-count mismatch.
    ///
    /// # Panics
    ///
    /// Panics when parameters were already declared.
    pub fn no_params(mut self) -> Self {
        assert!(
            self.param_defns.is_empty(),
            "command `{}` has parameters and cannot also take none",
            self.name
        );
        self.explicitly_no_params = true;
        self
    }

    /// The subcommand to dispatch to when no subcommand token is given.
    pub fn default_subcommand(mut self, name: &str) -> Self {
        self.default_subcommand = Some(name.to_string());
        self
    }

    /// Skip option parsing for this command entirely: every token,
    /// dash-prefixed or not, is handed to the action as positional data
    /// and parent options pass through unmodified.
    pub fn skip_option_parsing(mut self) -> Self {
        self.all_opts_as_args = true;
        self
    }

    /// The block executed when this command is invoked as a leaf.
    pub fn action(mut self, f: impl Fn(&Options, &ArgumentList, &Cmd<'_>) -> Result<(), Error> + 'static) -> Self {
        self.action = Some(Box::new(f));
        self
    }

    /// Attaches a subcommand (builder form of [`Command::add_command`]).
    pub fn subcommand(mut self, command: Command) -> Self {
        self.add_command(command);
        self
    }

    /// Appends a subcommand to an already-built command.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate subcommand name.
    pub fn add_command(&mut self, command: Command) {
        assert!(
            self.subcommands.iter().all(|c| c.name != command.name),
            "duplicate subcommand `{}` under `{}`",
            command.name,
            self.name
        );
        self.subcommands.push(command);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn get_summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn get_usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn option_definitions(&self) -> &[OptionDefinition] {
        &self.opt_defns
    }

    pub fn param_definitions(&self) -> &[ParamDefinition] {
        &self.param_defns
    }

    pub fn subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    /// Renders this command's help text, viewed as a root command. Help
    /// for a command at its place in a tree is available through
    /// [`Cmd::help`] inside actions and hooks, or through the stock
    /// `help` subcommand.
    pub fn help(&self, verbose: bool) -> String {
        Cmd::root(self).help(verbose)
    }

    /// Runs the command with the given tokens, returning the exit intent
    /// instead of terminating the process ("soft exit"). An
    /// `Err(Exit { error: false, .. })` is voluntary termination, e.g.
    /// after printing help.
    pub fn run<S: AsRef<str>>(&self, tokens: &[S]) -> Result<(), Exit> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        Cmd::root(self).run(&tokens, &Options::new())
    }

    /// Runs the command and terminates the process with the resulting
    /// status ("hard exit").
    pub fn run_or_exit<S: AsRef<str>>(&self, tokens: &[S]) -> ! {
        match self.run(tokens) {
            Ok(()) => process::exit(0),
            Err(exit) => exit.exit(),
        }
    }

    /// A root scaffold: carries an `-h`/`--help` flag that prints the
    /// current command's help and stops with a success exit, plus a
    /// `help` subcommand. Intended to be extended with subcommands.
    pub fn new_basic_root(name: &str) -> Command {
        Command::new(name)
            .option(OptionDefinition::flag('h', "help", "show help for this command").on_parsed(|_value, cmd| {
                println!("{}", cmd.help(false));
                Err(Error::exit_success())
            }))
            .subcommand(Command::new_basic_help())
    }

    /// The stock `help` command: resolves its arguments as a subcommand
    /// path relative to its supercommand and prints that command's help.
    pub fn new_basic_help() -> Command {
        Command::new("help")
            .usage("help [command_name]")
            .summary("show help")
            .description(
                "Show help for the given command, or show general help. When no command is \
                 given, a list of available commands is displayed, as well as a list of global \
                 commandline options. When a command is given, a command description as well as \
                 command-specific commandline options are shown.",
            )
            .option(OptionDefinition::flag('v', "verbose", "show more detailed help"))
            .action(|opts, args, cmd| {
                let Some(mut target) = cmd.supercommand() else {
                    return Err(Error::NoHelpAvailable);
                };
                for arg in args.iter() {
                    target = target.resolve(&arg.to_string())?;
                }
                println!("{}", target.help(opts.flag("verbose")));
                Ok(())
            })
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("options", &self.opt_defns)
            .field("params", &self.param_defns)
            .field("subcommands", &self.subcommands)
            .finish_non_exhaustive()
    }
}

/// Stops the partitioning parse at the first positional token, which is
/// the subcommand name (or absent).
#[derive(Default)]
struct Partitioner {
    last_argument: Option<String>,
}

impl ParseDelegate for Partitioner {
    fn argument_added(&mut self, argument: &str) -> ScanControl {
        self.last_argument = Some(argument.to_string());
        ScanControl::Stop
    }
}

/// A command viewed at its place in the tree during one invocation.
///
/// The node itself never stores a supercommand pointer (the parent-to-child
/// edge is the only ownership edge); this handle carries the ancestor chain
/// as non-owning borrows instead, which is what makes option inheritance
/// and full usage paths possible.
#[derive(Clone)]
pub struct Cmd<'a> {
    node: &'a Command,
    ancestors: Vec<&'a Command>,
}

impl<'a> Cmd<'a> {
    pub(crate) fn root(node: &'a Command) -> Cmd<'a> {
        Cmd { node, ancestors: Vec::new() }
    }

    pub fn command(&self) -> &'a Command {
        self.node
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Root-first chain of commands above this one.
    pub fn ancestors(&self) -> &[&'a Command] {
        &self.ancestors
    }

    pub fn supercommand(&self) -> Option<Cmd<'a>> {
        let (&node, ancestors) = self.ancestors.split_last()?;
        Some(Cmd { node, ancestors: ancestors.to_vec() })
    }

    /// This command's option definitions followed by every ancestor's,
    /// nearest first. Subcommands inherit all ancestor flags through this.
    pub fn global_option_definitions(&self) -> Vec<&'a OptionDefinition> {
        let mut res: Vec<&'a OptionDefinition> = self.node.opt_defns.iter().collect();
        for ancestor in self.ancestors.iter().rev() {
            res.extend(ancestor.opt_defns.iter());
        }
        res
    }

    /// Renders this command's help text.
    pub fn help(&self, verbose: bool) -> String {
        help::render(self, verbose)
    }

    /// Resolves `name` among the subcommands: an exact name or alias
    /// match wins outright; otherwise every subcommand whose name starts
    /// with `name` matches, and anything other than exactly one match is
    /// an error.
    pub fn resolve(&self, name: &str) -> Result<Cmd<'a>> {
        let found = self.commands_named(name);
        match found.as_slice() {
            [] => Err(Error::UnknownCommand(name.to_string())),
            [child] => Ok(self.child(*child)),
            _ => {
                let mut candidates: Vec<String> = found.iter().map(|c| c.name.clone()).collect();
                candidates.sort();
                Err(Error::AmbiguousCommand { input: name.to_string(), candidates })
            }
        }
    }

    fn commands_named(&self, name: &str) -> Vec<&'a Command> {
        for command in &self.node.subcommands {
            if command.name == name || command.aliases.iter().any(|a| a == name) {
                return vec![command];
            }
        }
        self.node.subcommands.iter().filter(|c| c.name.starts_with(name)).collect()
    }

    fn child(&self, node: &'a Command) -> Cmd<'a> {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(self.node);
        Cmd { node, ancestors }
    }

    /// Runs this command, reporting any error as a single diagnostic line
    /// on stderr before converting it into an exit intent.
    pub fn run(&self, tokens: &[String], parent_opts: &Options) -> Result<(), Exit> {
        self.run_this(tokens, parent_opts).map_err(|err| self.exit_for(err))
    }

    fn exit_for(&self, err: Error) -> Exit {
        match err {
            Error::Exit(exit) => exit,
            err => {
                let message = format!("{}: {err}", self.name());
                eprintln!("{message}");
                Exit::failure(message)
            }
        }
    }

    fn run_this(&self, tokens: &[String], parent_opts: &Options) -> Result<()> {
        debug!(command = self.name(), "dispatch");
        if self.node.subcommands.is_empty() {
            return self.run_own_action(tokens, parent_opts);
        }

        let (before, subcmd_name, rest) = self.partition(tokens)?;
        if subcmd_name.is_none() && self.node.action.is_some() {
            return self.run_own_action(tokens, parent_opts);
        }

        self.apply_hooks(&before)?;

        let name = subcmd_name
            .or_else(|| self.node.default_subcommand.clone())
            .ok_or(Error::NoCommandGiven)?;
        let child = self.resolve(&name)?;
        debug!(command = self.name(), subcommand = child.name(), "delegating");
        child.run(&rest, &parent_opts.merge(&before)).map_err(Error::Exit)
    }

    /// Splits the tokens into options before the subcommand name, the
    /// name itself (or absent), and everything after it. Skip-parsing
    /// commands take the first token as the provisional name and pass the
    /// rest through untouched.
    fn partition(&self, tokens: &[String]) -> Result<(Options, Option<String>, Vec<String>)> {
        if self.node.all_opts_as_args {
            let rest = tokens.get(1..).map(<[String]>::to_vec).unwrap_or_default();
            return Ok((Options::new(), tokens.first().cloned(), rest));
        }

        let mut delegate = Partitioner::default();
        let mut parser = Parser::new(tokens, self.global_option_definitions(), &[], false);
        parser.run_with(&mut delegate)?;
        Ok((parser.options().clone(), delegate.last_argument, parser.unprocessed()))
    }

    /// Fires the `on_parsed` hooks for options parsed ahead of the
    /// subcommand name, in map order.
    fn apply_hooks(&self, options: &Options) -> Result<()> {
        let defns = self.global_option_definitions();
        for (key, value) in options.iter() {
            let Some(defn) = defns.iter().find(|d| d.key() == key) else { continue };
            if let Some(hook) = defn.hook() {
                hook(value, self)?;
            }
        }
        Ok(())
    }

    fn run_own_action(&self, tokens: &[String], parent_opts: &Options) -> Result<()> {
        let (global_opts, args) = if self.node.all_opts_as_args {
            let args = ArgumentList::bind(tokens.to_vec(), self.node.explicitly_no_params, &self.node.param_defns)?;
            (parent_opts.clone(), args)
        } else {
            let defns = self.global_option_definitions();
            let mut parser =
                Parser::new(tokens, defns.clone(), &self.node.param_defns, self.node.explicitly_no_params)
                    .with_command(self);
            parser.run()?;
            let args = parser.argument_list()?;
            let mut global_opts = parent_opts.merge(parser.options());
            fill_defaults(&mut global_opts, &defns);
            (global_opts, args)
        };

        let action = self.node.action.as_ref().ok_or(Error::NotImplemented)?;
        action(&global_opts, &args, self)
    }
}

impl fmt::Debug for Cmd<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut path: Vec<&str> = self.ancestors.iter().map(|c| c.name.as_str()).collect();
        path.push(&self.node.name);
        f.debug_tuple("Cmd").field(&path.join(" ")).finish()
    }
}
