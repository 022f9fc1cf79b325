use std::path::Path;

use clap::{Args, Subcommand};
use serde_json::{Value, json};
use tracing::error;

use crate::{
    app::{Dashboard, settings_form::Settings, tasks::Task},
    config::Config,
    store::sqlite::SqliteStore,
    surface::MemorySurface,
};

const SCHEMA_VERSION: &str = "cli.v1";

#[derive(Debug, Clone, Subcommand)]
pub enum RootCommand {
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TaskCommand {
    List,
    Add(TaskAddArgs),
    Done(TaskIndexArgs),
    Undone(TaskIndexArgs),
    Rm(TaskIndexArgs),
    ClearDone,
    ClearAll(ClearAllArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum SettingsCommand {
    Show,
    Set(SettingsSetArgs),
}

#[derive(Debug, Clone, Args)]
pub struct TaskAddArgs {
    #[arg(long, value_name = "TEXT")]
    pub name: String,
}

#[derive(Debug, Clone, Args)]
pub struct TaskIndexArgs {
    #[arg(long, value_name = "N")]
    pub index: usize,
}

#[derive(Debug, Clone, Args)]
pub struct ClearAllArgs {
    /// Skip the confirmation prompt.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Clone, Args)]
pub struct SettingsSetArgs {
    #[arg(long, value_name = "TEXT")]
    pub display_name: Option<String>,

    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,

    #[arg(long, value_name = "BOOL")]
    pub email_opt_in: Option<bool>,
}

pub fn run(store_path: &Path, command: RootCommand, json_output: bool, quiet: bool) -> i32 {
    match execute(store_path, command) {
        Ok(output) => {
            print_success(output, json_output, quiet);
            0
        }
        Err(err) => {
            print_error(&err, json_output);
            err.exit_code
        }
    }
}

#[derive(Debug)]
struct CommandOutput {
    command: &'static str,
    data: Value,
    text: String,
}

#[derive(Debug)]
struct CliError {
    exit_code: i32,
    code: &'static str,
    message: String,
}

type CliResult<T> = Result<T, CliError>;

type CliDashboard = Dashboard<SqliteStore, MemorySurface>;

fn execute(store_path: &Path, command: RootCommand) -> CliResult<CommandOutput> {
    let store = SqliteStore::open(store_path).map_err(runtime_error)?;
    let confirm_answer = matches!(
        command,
        RootCommand::Task {
            command: TaskCommand::ClearAll(ClearAllArgs { yes: true }),
        }
    );
    let surface = MemorySurface::with_confirm_answer(confirm_answer);
    let mut dashboard = Dashboard::new(store, surface, &Config::default());

    match command {
        RootCommand::Task { command } => execute_task_command(&mut dashboard, command),
        RootCommand::Settings { command } => execute_settings_command(&mut dashboard, command),
    }
}

fn execute_task_command(
    dashboard: &mut CliDashboard,
    command: TaskCommand,
) -> CliResult<CommandOutput> {
    match command {
        TaskCommand::List => task_list(dashboard),
        TaskCommand::Add(args) => task_add(dashboard, args),
        TaskCommand::Done(args) => task_set_done(dashboard, args, true),
        TaskCommand::Undone(args) => task_set_done(dashboard, args, false),
        TaskCommand::Rm(args) => task_rm(dashboard, args),
        TaskCommand::ClearDone => task_clear_done(dashboard),
        TaskCommand::ClearAll(args) => task_clear_all(dashboard, args),
    }
}

fn execute_settings_command(
    dashboard: &mut CliDashboard,
    command: SettingsCommand,
) -> CliResult<CommandOutput> {
    match command {
        SettingsCommand::Show => settings_show(dashboard),
        SettingsCommand::Set(args) => settings_set(dashboard, args),
    }
}

fn task_list(dashboard: &CliDashboard) -> CliResult<CommandOutput> {
    let tasks = dashboard.tasks();
    let data = json!({
        "tasks": tasks
            .iter()
            .enumerate()
            .map(|(index, task)| task_json(index, task))
            .collect::<Vec<_>>()
    });
    let text = render_task_list_text(tasks);

    Ok(CommandOutput {
        command: "task list",
        data,
        text,
    })
}

fn task_add(dashboard: &mut CliDashboard, args: TaskAddArgs) -> CliResult<CommandOutput> {
    if !dashboard.add_task(&args.name) {
        return Err(usage_error(
            "TASK_NAME_REQUIRED",
            "task name must not be empty",
        ));
    }

    let index = dashboard.tasks().len() - 1;
    let task = &dashboard.tasks()[index];
    let text = format!("Added task {}: {}", index, task.name);
    let data = json!({ "task": task_json(index, task) });

    Ok(CommandOutput {
        command: "task add",
        data,
        text,
    })
}

fn task_set_done(
    dashboard: &mut CliDashboard,
    args: TaskIndexArgs,
    done: bool,
) -> CliResult<CommandOutput> {
    validate_index(dashboard, args.index)?;
    dashboard.toggle_task(args.index, done);

    let task = &dashboard.tasks()[args.index];
    let text = format!(
        "Marked task {} {}: {}",
        args.index,
        if done { "done" } else { "undone" },
        task.name
    );
    let data = json!({ "task": task_json(args.index, task) });

    Ok(CommandOutput {
        command: if done { "task done" } else { "task undone" },
        data,
        text,
    })
}

fn task_rm(dashboard: &mut CliDashboard, args: TaskIndexArgs) -> CliResult<CommandOutput> {
    validate_index(dashboard, args.index)?;
    let name = dashboard.tasks()[args.index].name.clone();
    dashboard.remove_task(args.index);

    let text = format!("Removed task {}: {}", args.index, name);
    let data = json!({ "removed": { "index": args.index, "name": name } });

    Ok(CommandOutput {
        command: "task rm",
        data,
        text,
    })
}

fn task_clear_done(dashboard: &mut CliDashboard) -> CliResult<CommandOutput> {
    let before = dashboard.tasks().len();
    dashboard.clear_done_tasks();
    let cleared = before - dashboard.tasks().len();

    let text = format!("Cleared {cleared} completed task(s).");
    let data = json!({ "cleared": cleared, "remaining": dashboard.tasks().len() });

    Ok(CommandOutput {
        command: "task clear-done",
        data,
        text,
    })
}

fn task_clear_all(dashboard: &mut CliDashboard, args: ClearAllArgs) -> CliResult<CommandOutput> {
    if !args.yes {
        return Err(usage_error(
            "CONFIRM_REQUIRED",
            "pass --yes to clear all tasks",
        ));
    }

    let before = dashboard.tasks().len();
    if !dashboard.clear_all_tasks() {
        return Err(runtime_error("clear-all confirmation was declined"));
    }

    let text = format!("Cleared all {before} task(s).");
    let data = json!({ "cleared": before });

    Ok(CommandOutput {
        command: "task clear-all",
        data,
        text,
    })
}

fn settings_show(dashboard: &CliDashboard) -> CliResult<CommandOutput> {
    let settings = dashboard.settings();
    let data = json!({ "settings": settings_json(settings) });
    let text = render_settings_text(settings);

    Ok(CommandOutput {
        command: "settings show",
        data,
        text,
    })
}

fn settings_set(dashboard: &mut CliDashboard, args: SettingsSetArgs) -> CliResult<CommandOutput> {
    if args.display_name.is_none() && args.email.is_none() && args.email_opt_in.is_none() {
        return Err(usage_error(
            "SETTINGS_FIELD_REQUIRED",
            "pass at least one of --display-name, --email, --email-opt-in",
        ));
    }

    let current = dashboard.settings().clone();
    let merged = Settings {
        display_name: args.display_name.unwrap_or(current.display_name),
        email: args.email.unwrap_or(current.email),
        email_opt_in: args.email_opt_in.unwrap_or(current.email_opt_in),
    };
    dashboard.save_settings(merged, std::time::Instant::now());

    let settings = dashboard.settings();
    let data = json!({ "settings": settings_json(settings) });

    Ok(CommandOutput {
        command: "settings set",
        data,
        text: "Settings saved.".to_string(),
    })
}

fn validate_index(dashboard: &CliDashboard, index: usize) -> CliResult<()> {
    let len = dashboard.tasks().len();
    if index >= len {
        return Err(not_found_error(
            "TASK_INDEX_OUT_OF_RANGE",
            format!("task index {index} out of range (have {len} task(s))"),
        ));
    }
    Ok(())
}

fn task_json(index: usize, task: &Task) -> Value {
    json!({
        "index": index,
        "name": task.name,
        "done": task.done,
    })
}

fn settings_json(settings: &Settings) -> Value {
    json!({
        "displayName": settings.display_name,
        "email": settings.email,
        "emailOptIn": settings.email_opt_in,
    })
}

fn render_task_list_text(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let headers = ["Index", "Done", "Name"];
    let rows = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            vec![
                index.to_string(),
                if task.done { "x" } else { " " }.to_string(),
                task.name.replace('\n', " "),
            ]
        })
        .collect::<Vec<_>>();

    render_text_table(&headers, &rows)
}

fn render_settings_text(settings: &Settings) -> String {
    let headers = ["Field", "Value"];
    let rows = vec![
        vec!["Display name".to_string(), settings.display_name.clone()],
        vec!["Email".to_string(), settings.email.clone()],
        vec![
            "Email opt-in".to_string(),
            settings.email_opt_in.to_string(),
        ],
    ];

    render_text_table(&headers, &rows)
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();

    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            let width = cell.chars().count();
            if width > widths[index] {
                widths[index] = width;
            }
        }
    }

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|width| "-".repeat(*width + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut lines = Vec::new();
    lines.push(border.clone());
    lines.push(format!(
        "| {} |",
        headers
            .iter()
            .enumerate()
            .map(|(index, header)| format!("{header:<width$}", width = widths[index]))
            .collect::<Vec<_>>()
            .join(" | ")
    ));
    lines.push(border.clone());
    for row in rows {
        lines.push(format!(
            "| {} |",
            row.iter()
                .enumerate()
                .map(|(index, cell)| format!("{cell:<width$}", width = widths[index]))
                .collect::<Vec<_>>()
                .join(" | ")
        ));
    }
    lines.push(border);

    lines.join("\n")
}

fn usage_error(code: &'static str, message: impl Into<String>) -> CliError {
    CliError {
        exit_code: 2,
        code,
        message: message.into(),
    }
}

fn not_found_error(code: &'static str, message: impl Into<String>) -> CliError {
    CliError {
        exit_code: 3,
        code,
        message: message.into(),
    }
}

fn runtime_error(err: impl std::fmt::Display) -> CliError {
    CliError {
        exit_code: 5,
        code: "RUNTIME_ERROR",
        message: err.to_string(),
    }
}

fn print_success(output: CommandOutput, json_output: bool, quiet: bool) {
    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "command": output.command,
            "data": output.data
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => println!("{value}"),
            Err(_) => println!("{}", payload),
        }
        return;
    }

    if quiet {
        return;
    }

    if output.text.is_empty() {
        println!("ok");
    } else {
        println!("{}", output.text);
    }
}

fn print_error(err: &CliError, json_output: bool) {
    error!(
        code = err.code,
        message = %err.message,
        "cli command failed"
    );

    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "error": {
                "code": err.code,
                "message": err.message
            }
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => eprintln!("{value}"),
            Err(_) => eprintln!("{}", payload),
        }
        return;
    }

    eprintln!("error[{}]: {}", err.code, err.message);
}
