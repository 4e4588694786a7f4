//! A small multi-command demo CLI built on cadre.
//!
//! ```console
//! $ tasker add "write docs" --priority 2
//! $ tasker add -- --weird-task-name
//! $ tasker list --all
//! $ echo "from stdin" | tasker add
//! ```

use cadre::prelude::*;

fn build_tree() -> Result<(CommandTree, TaskerCommands), cadre::core::ConfigError> {
    let mut tree = CommandTree::new(
        Command::new("tasker")
            .describe("A tiny task list")
            .executable(false),
    );
    let root = tree.root();

    tree.add_option(
        root,
        CommandOption::named("verbose")
            .short('v')
            .flag()
            .describe("Chatty output")
            .interceptor(),
    )?;

    let add = tree.add_subcommand(
        root,
        Command::new("add").describe("Add one or more tasks"),
    )?;
    tree.add_operand(add, Operand::new("text").describe("Task text").list())?;
    tree.add_option(
        add,
        CommandOption::named("priority")
            .short('p')
            .of_type(TypeKind::Int)
            .default_value(DefaultValue::Raw("3".into()))
            .describe("Priority, 1 (high) to 5 (low)"),
    )?;

    let list = tree.add_subcommand(
        root,
        Command::new("list").alias("ls").describe("List tasks"),
    )?;
    tree.add_option(
        list,
        CommandOption::named("all").short('a').flag().describe("Include done tasks"),
    )?;

    Ok((tree, TaskerCommands { add, list }))
}

struct TaskerCommands {
    add: cadre::core::CommandId,
    list: cadre::core::CommandId,
}

async fn add_task(ctx: std::sync::Arc<CommandContext>) -> HandlerResult {
    let priority = ctx
        .option_value("priority")
        .and_then(|v| v.as_int())
        .unwrap_or(3);
    let texts = ctx
        .operand_value("text")
        .and_then(|v| v.to_string_vec())
        .unwrap_or_default();

    if texts.is_empty() {
        ctx.console().write_error_line("nothing to add");
        return Ok(exit_code::VALIDATION);
    }
    for text in texts {
        if ctx.flag("verbose") {
            ctx.console()
                .write_line(format!("added '{text}' with priority {priority}"));
        } else {
            ctx.console().write_line(format!("added '{text}'"));
        }
    }
    Ok(exit_code::SUCCESS)
}

async fn list_tasks(ctx: std::sync::Arc<CommandContext>) -> HandlerResult {
    if ctx.flag("all") {
        ctx.console().write_line("(no tasks, not even done ones)");
    } else {
        ctx.console().write_line("(no open tasks)");
    }
    Ok(exit_code::SUCCESS)
}

#[tokio::main]
async fn main() {
    let (tree, commands) = match build_tree() {
        Ok(built) => built,
        Err(e) => {
            eprintln!("broken command tree: {e}");
            std::process::exit(exit_code::ERROR);
        }
    };

    let runner = match AppRunner::new(tree) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("broken command tree: {e}");
            std::process::exit(exit_code::ERROR);
        }
    };
    let runner = runner
        .use_parse_directive()
        .use_response_files()
        .cancel_on_ctrl_c()
        .add_default_source(std::sync::Arc::new(EnvVarDefaults::with_prefix("TASKER")))
        .handle(commands.add, handler_fn(|ctx| Box::pin(add_task(ctx))))
        .handle(commands.list, handler_fn(|ctx| Box::pin(list_tasks(ctx))));

    std::process::exit(runner.run_to_exit(&std::env::args().skip(1).collect::<Vec<_>>()).await);
}
