use std::{cell::RefCell, rc::Rc};

use cmdtree::{Command, OptionDefinition};
use expect_test::expect;
use pretty_assertions::assert_eq;

type Log = Rc<RefCell<Vec<String>>>;

fn sample_tree(log: &Log) -> Command {
    let hook_log = log.clone();
    let sub_log = log.clone();
    Command::new("super")
        .usage("super [options] [command]")
        .summary("does super stuff")
        .option(OptionDefinition::required('a', "aaa", "opt a").on_parsed(move |value, cmd| {
            hook_log.borrow_mut().push(format!("{}:{value}", cmd.name()));
            Ok(())
        }))
        .subcommand(Command::new("sub").alias("sup").summary("does sub stuff").action(
            move |opts, _args, _cmd| {
                sub_log.borrow_mut().push(format!("sub:aaa={}", opts.str("aaa").unwrap_or("-")));
                Ok(())
            },
        ))
        .subcommand(Command::new("sink").summary("does sink stuff"))
}

#[test]
fn dispatch_with_inherited_option() {
    let log = Log::default();
    let root = sample_tree(&log);
    root.run(&["-a", "666", "sub"]).unwrap();
    assert_eq!(*log.borrow(), ["super:666", "sub:aaa=666"]);
}

#[test]
fn inherited_option_after_subcommand_name() {
    let log = Log::default();
    let root = sample_tree(&log);
    root.run(&["sub", "-a", "666"]).unwrap();
    assert_eq!(*log.borrow(), ["sub:666", "sub:aaa=666"]);
}

#[test]
fn subcommand_resolution() {
    let log = Log::default();
    let root = sample_tree(&log);

    // Unique prefix.
    root.run(&["su"]).unwrap();
    // Exact alias.
    root.run(&["sup"]).unwrap();
    assert_eq!(*log.borrow(), ["sub:aaa=-", "sub:aaa=-"]);

    let exit = root.run(&["nope"]).unwrap_err();
    assert!(exit.is_error());
    assert_eq!(exit.message(), Some("super: unknown command 'nope'"));
}

#[test]
fn ambiguous_prefix() {
    let log = Log::default();
    let root = sample_tree(&log);
    let exit = root.run(&["s"]).unwrap_err();
    expect![[r#"
        super: 's' is ambiguous:
          sink sub"#]]
    .assert_eq(exit.message().unwrap());
}

#[test]
fn no_command_given() {
    let log = Log::default();
    let root = sample_tree(&log);
    let exit = root.run::<&str>(&[]).unwrap_err();
    assert_eq!(exit.message(), Some("super: no command given"));
}

#[test]
fn default_subcommand() {
    let log = Log::default();
    let root = sample_tree(&log).default_subcommand("sub");
    root.run::<&str>(&[]).unwrap();
    assert_eq!(*log.borrow(), ["sub:aaa=-"]);
}

#[test]
fn router_runs_own_action_without_subcommand_token() {
    let log = Log::default();
    let own_log = log.clone();
    let root = sample_tree(&log).action(move |opts, _args, _cmd| {
        own_log.borrow_mut().push(format!("own:aaa={}", opts.str("aaa").unwrap_or("-")));
        Ok(())
    });
    root.run(&["-a", "1"]).unwrap();
    assert_eq!(*log.borrow(), ["super:1", "own:aaa=1"]);
}

#[test]
fn action_missing() {
    let log = Log::default();
    let root = sample_tree(&log);
    let exit = root.run(&["sink"]).unwrap_err();
    assert_eq!(exit.message(), Some("sink: not implemented"));
}

#[test]
fn parse_errors_beat_missing_action() {
    let log = Log::default();
    let root = sample_tree(&log);
    let exit = root.run(&["sink", "--bogus"]).unwrap_err();
    assert_eq!(exit.message(), Some("sink: illegal option -- bogus"));
}

#[test]
fn ancestor_default_backfill() {
    let log = Log::default();
    let hook_log = log.clone();
    let child_log = log.clone();
    let root = Command::new("tool")
        .option(
            OptionDefinition::optional('m', "mode", "pick a mode").default("standard").on_parsed(
                move |value, _cmd| {
                    hook_log.borrow_mut().push(format!("hook:{value}"));
                    Ok(())
                },
            ),
        )
        .subcommand(Command::new("child").action(move |opts, _args, _cmd| {
            child_log.borrow_mut().push(format!("mode={}", opts.str("mode").unwrap_or("-")));
            Ok(())
        }));

    // A back-filled default fires no hook.
    root.run(&["child"]).unwrap();
    assert_eq!(*log.borrow(), ["mode=standard"]);

    log.borrow_mut().clear();
    root.run(&["--mode", "fast", "child"]).unwrap();
    assert_eq!(*log.borrow(), ["hook:fast", "mode=fast"]);
}

#[test]
fn skip_option_parsing_passes_tokens_through() {
    let log = Log::default();
    let action_log = log.clone();
    let root = Command::new("runner").skip_option_parsing().action(move |_opts, args, _cmd| {
        let rendered: Vec<String> = args.iter().map(|v| v.to_string()).collect();
        action_log.borrow_mut().push(format!("args={}", rendered.join(" ")));
        Ok(())
    });
    root.run(&["--wha", "-x", "foo"]).unwrap();
    assert_eq!(*log.borrow(), ["args=--wha -x foo"]);
}

#[test]
fn skip_option_parsing_router_takes_first_token_as_subcommand() {
    let log = Log::default();
    let action_log = log.clone();
    let root = Command::new("outer").skip_option_parsing().subcommand(
        Command::new("inner").skip_option_parsing().action(move |_opts, args, _cmd| {
            let rendered: Vec<String> = args.iter().map(|v| v.to_string()).collect();
            action_log.borrow_mut().push(format!("args={}", rendered.join(" ")));
            Ok(())
        }),
    );
    root.run(&["inner", "--wha", "x"]).unwrap();
    assert_eq!(*log.borrow(), ["args=--wha x"]);
}

#[test]
fn positional_params_bind_at_dispatch() {
    let log = Log::default();
    let action_log = log.clone();
    let root = Command::new("greet").param("name").action(move |_opts, args, _cmd| {
        action_log.borrow_mut().push(format!("hi {}", args["name"]));
        Ok(())
    });

    root.run(&["alice"]).unwrap();
    assert_eq!(*log.borrow(), ["hi alice"]);

    let exit = root.run::<&str>(&[]).unwrap_err();
    assert_eq!(
        exit.message(),
        Some("greet: incorrect number of arguments given: expected 1, but got 0")
    );
}

#[test]
fn basic_root_help_flag_is_a_success_exit() {
    let root = Command::new_basic_root("mytool");
    let exit = root.run(&["-h"]).unwrap_err();
    assert!(!exit.is_error());
    assert_eq!(exit.message(), None);
    assert_eq!(exit.status(), 0);
}

#[test]
fn basic_help_resolves_a_command_path() {
    let root = Command::new_basic_root("mytool");
    root.run(&["help"]).unwrap();
    root.run(&["help", "help"]).unwrap();

    let exit = root.run(&["help", "nope"]).unwrap_err();
    assert_eq!(exit.message(), Some("help: unknown command 'nope'"));
}

#[test]
#[should_panic = "duplicate option key"]
fn duplicate_option_key_panics() {
    let _ = Command::new("x")
        .option(OptionDefinition::flag('a', "aaa", "first"))
        .option(OptionDefinition::required('b', "aaa", "second"));
}

#[test]
#[should_panic = "duplicate subcommand"]
fn duplicate_subcommand_panics() {
    let _ = Command::new("x").subcommand(Command::new("sub")).subcommand(Command::new("sub"));
}

#[test]
#[should_panic = "takes no parameters"]
fn param_after_no_params_panics() {
    let _ = Command::new("x").no_params().param("name");
}

#[test]
#[should_panic = "cannot also take none"]
fn no_params_after_param_panics() {
    let _ = Command::new("x").param("name").no_params();
}

#[test]
#[should_panic = "short or a long name"]
fn nameless_option_panics() {
    let _ = OptionDefinition::flag(None::<char>, None::<&str>, "anonymous");
}

#[test]
#[should_panic = "cannot be specified for flag options"]
fn default_on_flag_panics() {
    let _ = OptionDefinition::flag('a', "aaa", "flag a").default("x");
}
