//! End-to-end scenarios: argv in, exit code and console output out.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use cadre_core::{
    ArgumentSeparatorStrategy, ArgumentValue, Command, CommandOption, CommandTree, Operand,
    TypeKind,
};
use cadre_framework::{
    Console, ConsoleCapture, MiddlewareStage, exit_code, handler_fn, middleware_fn,
};
use cadre_runtime::{AppRunner, AppSettingDefaults, AppSettings, StaticPipedInput};

fn echo_tree() -> CommandTree {
    let mut tree = CommandTree::with_root_name("app");
    let root = tree.root();
    tree.add_option(root, CommandOption::named("opt1").of_type(TypeKind::Int))
        .unwrap();
    tree.add_option(root, CommandOption::named("all").short('a').flag())
        .unwrap();
    tree.add_option(root, CommandOption::named("brief").short('b').flag())
        .unwrap();
    tree.add_operand(root, Operand::new("arg1")).unwrap();
    tree
}

/// A handler that prints every bound argument it can see.
fn reporting_runner(tree: CommandTree) -> (AppRunner, ConsoleCapture) {
    let (console, capture) = Console::in_memory();
    let root = tree.root();
    let runner = AppRunner::new(tree)
        .unwrap()
        .console(console)
        .handle(
            root,
            handler_fn(|ctx| {
                Box::pin(async move {
                    for name in ["opt1", "arg1"] {
                        if let Some(value) = ctx
                            .option_value(name)
                            .or_else(|| ctx.operand_value(name))
                        {
                            ctx.console().write_line(format!("{name}={value}"));
                        }
                    }
                    for flag in ["all", "brief"] {
                        if ctx.flag(flag) {
                            ctx.console().write_line(format!("{flag}=true"));
                        }
                    }
                    Ok(exit_code::SUCCESS)
                })
            }),
        );
    (runner, capture)
}

#[tokio::test]
async fn option_value_and_operand_bind() {
    // opt1 is string-typed in this scenario.
    let mut tree = CommandTree::with_root_name("app");
    tree.add_option(tree.root(), CommandOption::named("opt1"))
        .unwrap();
    tree.add_operand(tree.root(), Operand::new("arg1")).unwrap();
    let (runner, capture) = reporting_runner(tree);

    let code = runner.run(&["--opt1", "value", "arg1"]).await.unwrap();
    assert_eq!(code, exit_code::SUCCESS);
    assert_eq!(capture.stdout(), "opt1=value\narg1=arg1\n");
}

#[tokio::test]
async fn clubbed_flags_both_set() {
    let (runner, capture) = reporting_runner(echo_tree());
    let code = runner.run(&["-ab", "x"]).await.unwrap();
    assert_eq!(code, exit_code::SUCCESS);
    assert!(capture.stdout().contains("all=true"));
    assert!(capture.stdout().contains("brief=true"));
}

#[tokio::test]
async fn int_option_binds_typed_value() {
    let (runner, capture) = reporting_runner(echo_tree());
    let code = runner.run(&["--opt1=5", "x"]).await.unwrap();
    assert_eq!(code, exit_code::SUCCESS);
    assert!(capture.stdout().contains("opt1=5"));
}

#[tokio::test]
async fn invalid_int_yields_validation_exit() {
    let (runner, capture) = reporting_runner(echo_tree());
    let code = runner.run(&["--opt1=notanumber", "x"]).await.unwrap();
    assert_eq!(code, exit_code::VALIDATION);
    assert!(capture.stderr().contains("opt1"));
    assert!(capture.stderr().contains("notanumber"));
    assert!(capture.stdout().is_empty());
}

#[tokio::test]
async fn unrecognized_option_targets_deepest_command_without_crashing() {
    let mut tree = CommandTree::new(Command::new("app").executable(false));
    let sub = tree.add_subcommand(tree.root(), Command::new("do")).unwrap();
    tree.add_operand(sub, Operand::new("arg")).unwrap();

    // Observe the parse result from a wrapping middleware: its post-`next`
    // logic runs strictly after the downstream pipeline completed.
    let observed: Arc<Mutex<Option<(String, bool)>>> = Arc::new(Mutex::new(None));
    let observed_in = observed.clone();

    let (console, capture) = Console::in_memory();
    let runner = AppRunner::new(tree)
        .unwrap()
        .console(console)
        .use_middleware_ordered(
            MiddlewareStage::ParseInput,
            -10,
            middleware_fn("observe", move |ctx, next| {
                let observed = observed_in.clone();
                Box::pin(async move {
                    let result = next.run(ctx.clone()).await;
                    let report = ctx.parse_result().map(|r| {
                        let path = ctx.with_tree(|tree| tree.full_path(r.target_command()));
                        (path, r.error().is_some())
                    });
                    *observed.lock() = report;
                    result
                })
            }),
        );

    let code = runner.run(&["do", "--nope"]).await.unwrap();
    assert_eq!(code, exit_code::VALIDATION);
    assert!(capture.stderr().contains("unrecognized option '--nope'"));
    assert_eq!(*observed.lock(), Some(("app do".to_string(), true)));
}

async fn run_separator_scenario(strategy: ArgumentSeparatorStrategy) -> (i32, String) {
    let mut tree = CommandTree::new(Command::new("app").executable(false));
    let sub = tree
        .add_subcommand(tree.root(), Command::new("Do").separator_strategy(strategy))
        .unwrap();
    tree.add_operand(sub, Operand::new("args").list()).unwrap();

    let (console, capture) = Console::in_memory();
    let runner = AppRunner::new(tree)
        .unwrap()
        .console(console)
        .handle(
            sub,
            handler_fn(|ctx| {
                Box::pin(async move {
                    let bound = ctx
                        .operand_value("args")
                        .and_then(|v| v.to_string_vec())
                        .unwrap_or_default();
                    let separated: Vec<String> = ctx
                        .parse_result()
                        .map(|r| {
                            r.separated_arguments()
                                .iter()
                                .map(|t| t.raw_value().to_string())
                                .collect()
                        })
                        .unwrap_or_default();
                    ctx.console()
                        .write_line(format!("bound={bound:?} separated={separated:?}"));
                    Ok(exit_code::SUCCESS)
                })
            }),
        );

    let code = runner.run(&["Do", "--", "x", "y"]).await.unwrap();
    (code, capture.stdout())
}

#[tokio::test]
async fn separator_pass_thru_keeps_tokens_out_of_operands() {
    let (code, out) = run_separator_scenario(ArgumentSeparatorStrategy::PassThru).await;
    assert_eq!(code, exit_code::SUCCESS);
    assert_eq!(out, "bound=[] separated=[\"x\", \"y\"]\n");
}

#[tokio::test]
async fn separator_end_of_options_additionally_binds_operands() {
    let (code, out) = run_separator_scenario(ArgumentSeparatorStrategy::EndOfOptions).await;
    assert_eq!(code, exit_code::SUCCESS);
    assert_eq!(out, "bound=[\"x\", \"y\"] separated=[\"x\", \"y\"]\n");
}

#[tokio::test]
async fn response_files_expand_in_place() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "--opt1=7").unwrap();
    writeln!(file, "fromfile").unwrap();

    let (runner, capture) = reporting_runner(echo_tree());
    let runner = runner.use_response_files();

    let reference = format!("@{}", file.path().display());
    let code = runner.run(&[reference.as_str()]).await.unwrap();
    assert_eq!(code, exit_code::SUCCESS);
    assert!(capture.stdout().contains("opt1=7"));
    assert!(capture.stdout().contains("arg1=fromfile"));
}

#[tokio::test]
async fn missing_response_file_reports_the_filename() {
    let (runner, capture) = reporting_runner(echo_tree());
    let runner = runner.use_response_files();

    let code = runner.run(&["@definitely/missing"]).await.unwrap();
    assert_eq!(code, exit_code::VALIDATION);
    assert!(
        capture
            .stderr()
            .contains("response file not found: definitely/missing")
    );
}

#[tokio::test]
async fn piped_input_lands_on_the_list_operand() {
    let mut tree = CommandTree::with_root_name("app");
    let root = tree.root();
    tree.add_operand(root, Operand::new("items").list()).unwrap();

    let (console, capture) = Console::in_memory();
    let runner = AppRunner::new(tree)
        .unwrap()
        .console(console)
        .piped_input_source(Arc::new(StaticPipedInput::new([
            " one ", "", "two",
        ])))
        .handle(
            root,
            handler_fn(|ctx| {
                Box::pin(async move {
                    let items = ctx
                        .operand_value("items")
                        .and_then(|v| v.to_string_vec())
                        .unwrap_or_default();
                    ctx.console().write_line(format!("{items:?}"));
                    Ok(exit_code::SUCCESS)
                })
            }),
        );

    // Piped lines are trimmed, blanks dropped, and appended after argv input.
    let code = runner.run(&["zero"]).await.unwrap();
    assert_eq!(code, exit_code::SUCCESS);
    assert_eq!(capture.stdout(), "[\"zero\", \"one\", \"two\"]\n");
}

#[tokio::test]
async fn default_sources_apply_only_without_explicit_input() {
    let mut values = std::collections::HashMap::new();
    values.insert("opt1".to_string(), "11".to_string());

    let make = |values: std::collections::HashMap<String, String>| {
        let (runner, capture) = reporting_runner(echo_tree());
        (
            runner.add_default_source(Arc::new(AppSettingDefaults::new(values))),
            capture,
        )
    };

    let (runner, capture) = make(values.clone());
    let code = runner.run(&["x"]).await.unwrap();
    assert_eq!(code, exit_code::SUCCESS);
    assert!(capture.stdout().contains("opt1=11"));

    let (runner, capture) = make(values);
    let code = runner.run(&["--opt1=5", "x"]).await.unwrap();
    assert_eq!(code, exit_code::SUCCESS);
    assert!(capture.stdout().contains("opt1=5"));
}

#[tokio::test]
async fn parse_directive_reports_tokens_and_skips_invocation() {
    let (runner, capture) = reporting_runner(echo_tree());
    let runner = runner.use_parse_directive();

    let code = runner.run(&["[parse]", "-ab", "--opt1=5", "x"]).await.unwrap();
    assert_eq!(code, exit_code::SUCCESS);
    let out = capture.stdout();
    assert!(out.starts_with("token stream:"));
    // Transformation provenance is visible.
    assert!(out.contains("(from '-ab')"));
    assert!(out.contains("(from '--opt1=5')"));
    // The handler did not run.
    assert!(!out.lines().any(|line| line.starts_with("opt1=")));
}

#[tokio::test]
async fn cancellation_mid_pipeline_prevents_later_stages() {
    let (runner, capture) = reporting_runner(echo_tree());
    let runner = runner.use_middleware(
        MiddlewareStage::PostBindValuesPreInvoke,
        middleware_fn("cancel", |ctx, next| {
            Box::pin(async move {
                ctx.cancellation_token().cancel();
                next.run(ctx).await
            })
        }),
    );

    let code = runner.run(&["x"]).await.unwrap();
    assert_eq!(code, exit_code::ERROR);
    assert!(capture.stdout().is_empty());
}

#[tokio::test]
async fn ignore_unexpected_operands_setting_collects_extras() {
    let mut tree = CommandTree::with_root_name("app");
    let root = tree.root();
    tree.add_operand(root, Operand::new("arg1")).unwrap();

    let settings = AppSettings {
        parser: cadre_core::ParserSettings {
            ignore_unexpected_operands: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let (console, capture) = Console::in_memory();
    let runner = AppRunner::with_settings(tree, settings)
        .unwrap()
        .console(console)
        .handle(
            root,
            handler_fn(|ctx| {
                Box::pin(async move {
                    let remaining: Vec<String> = ctx
                        .parse_result()
                        .map(|r| {
                            r.remaining_operands()
                                .iter()
                                .map(|t| t.raw_value().to_string())
                                .collect()
                        })
                        .unwrap_or_default();
                    ctx.console().write_line(format!("{remaining:?}"));
                    Ok(exit_code::SUCCESS)
                })
            }),
        );

    let code = runner.run(&["first", "extra1", "--extra2"]).await.unwrap();
    assert_eq!(code, exit_code::SUCCESS);
    assert_eq!(capture.stdout(), "[\"extra1\", \"--extra2\"]\n");
}
