//! Sample commands wired into the `linewise` binary.

use anyhow::Context as _;
use linewise::commands::{CommandOutput, CommandRegistration, OptionType};
use linewise::error::Result;
use linewise::flow::{ComponentFlow, FlowContext, FlowValue};

const GROUP: &str = "Samples";

/// All sample registrations.
pub fn sample_commands() -> Result<Vec<CommandRegistration>> {
    Ok(vec![hello()?, echo()?, sum()?, wizard()?])
}

fn hello() -> Result<CommandRegistration> {
    CommandRegistration::builder()
        .command("hello world")
        .description("Print a greeting")
        .group(GROUP)
        .option(|o| {
            o.long_names(["arg1"])
                .short_names(['a'])
                .description("Who to greet")
                .default_value("world")
        })
        .option(|o| {
            o.long_names(["shout"])
                .short_names(['s'])
                .description("Greet in capitals")
                .option_type(OptionType::Boolean)
        })
        .target(|ctx| {
            let name = ctx.arguments.get_str("arg1").unwrap_or("world");
            let greeting = format!("Hello {name}");
            if ctx.arguments.get_bool("shout") {
                Ok(CommandOutput::info(greeting.to_uppercase()))
            } else {
                Ok(CommandOutput::info(greeting))
            }
        })
        .build()
}

fn echo() -> Result<CommandRegistration> {
    CommandRegistration::builder()
        .command("echo")
        .description("Print the given words")
        .group(GROUP)
        .option(|o| {
            o.long_names(["words"])
                .description("Words to print")
                .option_type(OptionType::List)
                .position(0)
        })
        .target(|ctx| {
            let words = ctx.arguments.get_list("words").unwrap_or_default();
            Ok(CommandOutput::info(words.join(" ")))
        })
        .build()
}

fn sum() -> Result<CommandRegistration> {
    CommandRegistration::builder()
        .command("sum")
        .description("Add two integers")
        .group(GROUP)
        .option(|o| o.long_names(["left"]).option_type(OptionType::Integer).position(0).required())
        .option(|o| o.long_names(["right"]).option_type(OptionType::Integer).position(1).required())
        .target(|ctx| {
            let left = ctx.arguments.get_i64("left").context("missing left operand")?;
            let right = ctx.arguments.get_i64("right").context("missing right operand")?;
            let total = left.checked_add(right).context("sum overflows")?;
            Ok(CommandOutput::info(total.to_string()))
        })
        .build()
}

fn wizard() -> Result<CommandRegistration> {
    let flow = ComponentFlow::builder()
        .with_string_input("name", |s| s.name("Name").default_value("anonymous"))
        .with_path_input("home", |s| s.name("Home").default_value("."))
        .with_single_item_selector("color", |s| {
            s.name("Color")
                .select_items([("Red", "red"), ("Green", "green"), ("Blue", "blue")])
                .default_select("Green")
        })
        .with_multi_item_selector("toppings", |s| {
            s.name("Toppings")
                .select_items([("Cheese", "cheese"), ("Olives", "olives"), ("Basil", "basil")])
        })
        .with_confirmation("confirm", |s| s.name("Confirm").default_value("yes"))
        .build()?;

    CommandRegistration::builder()
        .command("wizard")
        .description("Run a sample component flow")
        .group(GROUP)
        .target(move |ctx| {
            let context = flow.run(&mut *ctx.terminal)?;
            Ok(summary(&context))
        })
        .build()
}

fn summary(context: &FlowContext) -> CommandOutput {
    if context.get("confirm") == Some(&FlowValue::Bool(false)) {
        return CommandOutput::info("Discarded");
    }
    let rows = context
        .iter()
        .map(|(id, value)| vec![id.to_string(), value.to_string()])
        .collect();
    CommandOutput::table(vec!["Step".to_string(), "Value".to_string()], rows)
}
