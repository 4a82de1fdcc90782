use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use instill_component::{Component, SystemVariables};
use instill_component_registry::{RegistryError, Store, StoreConfig};
use instill_config::RuntimeConfig;
use instill_value::{Record, Value};

/// Instill components - list, describe and run pipeline components
#[derive(Parser)]
#[command(name = "instill-components")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the runtime config (JSON or YAML, default: ~/.config/instill/components.yaml)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Path to a JSON object of system variables passed to components
  #[arg(long, global = true)]
  system_variables: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Print every component definition
  List {
    /// Include tombstoned components
    #[arg(long)]
    tombstone: bool,
  },

  /// Print one component definition
  Describe {
    /// The component ID
    id: String,
  },

  /// Run a task over records read from stdin
  Execute {
    /// The component ID
    #[arg(long)]
    component: String,

    /// The task name, e.g. TASK_GET
    #[arg(long)]
    task: String,

    /// Path to the setup (JSON)
    #[arg(long)]
    setup: Option<PathBuf>,
  },

  /// Check that a setup can reach the component's service
  Test {
    /// The component ID
    #[arg(long)]
    component: String,

    /// Path to the setup (JSON)
    #[arg(long)]
    setup: Option<PathBuf>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let config = load_config(cli.config.as_deref())?;
  init_tracing(config.log_filter.as_deref());

  let Some(command) = cli.command else {
    println!("instill-components - use --help to see available commands");
    return Ok(());
  };

  let system_variables = match &cli.system_variables {
    Some(path) => SystemVariables::from(read_record(path)?),
    None => SystemVariables::new(),
  };

  let store = Store::builtin(StoreConfig {
    secrets: config.secrets,
    usage_handler: None,
  })
  .context("failed to build component store")?;
  debug!(components = store.len(), "component store ready");

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    match command {
      Commands::List { tombstone } => {
        let definitions = store.list_definitions(&system_variables, tombstone).await;
        println!("{}", serde_json::to_string_pretty(&definitions)?);
      }
      Commands::Describe { id } => {
        let definition = store
          .definition_by_id(&id, &system_variables, None)
          .await
          .map_err(report)?;
        println!("{}", serde_json::to_string_pretty(&definition)?);
      }
      Commands::Execute {
        component,
        task,
        setup,
      } => {
        let outputs = execute(&store, system_variables, &component, &task, setup).await?;
        println!("{}", serde_json::to_string_pretty(&outputs)?);
      }
      Commands::Test { component, setup } => {
        let uid = store.component_by_id(&component).map_err(report)?.uid();
        let setup = read_setup(setup.as_deref())?;
        store
          .test(&uid, &system_variables, setup)
          .await
          .map_err(report)?;
        eprintln!("Connection test passed: {component}");
      }
    }
    Ok::<(), anyhow::Error>(())
  })
}

async fn execute(
  store: &Store,
  system_variables: SystemVariables,
  component: &str,
  task: &str,
  setup: Option<PathBuf>,
) -> Result<Vec<Record>> {
  let uid = store.component_by_id(component).map_err(report)?.uid();
  let setup = read_setup(setup.as_deref())?;
  let inputs = read_inputs_from_stdin()?;

  let handle = store
    .create_execution(&uid, system_variables, setup, task)
    .map_err(report)?;

  let cancel = CancellationToken::new();
  let on_interrupt = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      on_interrupt.cancel();
    }
  });

  let ctx = instill_component::Context::with_cancellation(cancel);
  handle
    .execute(&ctx, inputs)
    .await
    .map_err(|e| report(RegistryError::from(e)))
}

/// Keep the developer message as the cause and lead with the end-user one.
fn report(e: RegistryError) -> anyhow::Error {
  let message = e.user_message();
  anyhow::Error::new(e).context(message)
}

fn init_tracing(config_filter: Option<&str>) {
  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(config_filter.unwrap_or("info")))
    .unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
  if let Some(path) = path {
    return RuntimeConfig::load(path)
      .with_context(|| format!("failed to load config: {}", path.display()));
  }

  let default = dirs::config_dir().map(|dir| dir.join("instill").join("components.yaml"));
  match default {
    Some(path) if path.exists() => RuntimeConfig::load(&path)
      .with_context(|| format!("failed to load config: {}", path.display())),
    _ => Ok(RuntimeConfig::default()),
  }
}

fn read_record(path: &Path) -> Result<Record> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read file: {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("expected a JSON object in {}", path.display()))
}

fn read_setup(path: Option<&Path>) -> Result<Record> {
  match path {
    Some(path) => read_record(path),
    None => Ok(Record::new()),
  }
}

/// A JSON array of records, or a single record. No piped input runs one
/// empty record.
fn read_inputs_from_stdin() -> Result<Vec<Record>> {
  if io::stdin().is_terminal() {
    return Ok(vec![Record::new()]);
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read inputs from stdin")?;
  if input.trim().is_empty() {
    return Ok(vec![Record::new()]);
  }

  let value: Value = serde_json::from_str(&input).context("failed to parse inputs JSON from stdin")?;
  match value {
    Value::Object(record) => Ok(vec![record]),
    Value::Array(items) => items
      .into_iter()
      .enumerate()
      .map(|(i, item)| match item {
        Value::Object(record) => Ok(record),
        other => Err(anyhow!("input {i} is not a JSON object: {other}")),
      })
      .collect(),
    other => bail!("expected a JSON object or array of objects, got: {other}"),
  }
}
