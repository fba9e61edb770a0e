use clap::{Parser, Subcommand};
use fhe_debugger::client::{ClientConfig, DebuggerClient};
use fhe_debugger::config::DebuggerConfig;
use fhe_debugger::graph::validate;
use fhe_debugger::server;
use fhe_debugger::session::{DebugSession, SessionStore};
use fhe_debugger::transform;
use fhe_debugger::ui::DebuggerTui;
use fhe_debugger::utils::random_graph::generate_random_program;
use fhe_debugger::utils::sample::{sample_envelope, sample_session};
use fhe_debugger::utils::serialization::{load_envelope, save_envelope, save_render_graph};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(author, version, about = "Interactive debugger for encrypted computation graphs", long_about = None)]
struct Cli {
    /// Configuration file (defaults to fhe-debugger.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a computation graph payload and report every structural error
    Validate {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
    /// Transform a payload into the renderable node/edge graph
    Transform {
        /// Payload file; the embedded sample when omitted
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Write the render graph here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Hide relinearize nodes by splicing their producer to each consumer
        #[arg(long)]
        fold_relinearize: bool,
    },
    /// Generate a random well-formed payload and write it to disk
    Generate {
        #[arg(long, default_value_t = 4)]
        inputs: u32,
        #[arg(long, default_value_t = 12)]
        operations: u32,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// List the sessions the debugger backend currently holds
    Sessions {
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },
    /// Download and validate a session's computation graph
    Fetch {
        #[arg(long)]
        session: String,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },
    /// Explore a session in the interactive terminal UI
    View {
        /// Payload file to view; otherwise a backend session or the sample
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Backend session name to view live
        #[arg(long)]
        session: Option<String>,
        #[arg(long, value_name = "URL")]
        url: Option<String>,
        /// Start with relinearize nodes folded away
        #[arg(long)]
        fold_relinearize: bool,
    },
    /// Serve sample and file-backed sessions over HTTP
    Serve {
        #[arg(long)]
        port: Option<u16>,
        /// Extra payload files to expose as sessions (named by file stem)
        #[arg(long, value_name = "FILE")]
        payload: Vec<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("FHE_DEBUGGER_LOG"))
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = DebuggerConfig::load_or_default(cli.config.as_deref())?;
    match cli.command {
        Commands::Validate { input } => run_validate(input)?,
        Commands::Transform {
            input,
            output,
            fold_relinearize,
        } => run_transform(input, output, fold_relinearize)?,
        Commands::Generate {
            inputs,
            operations,
            output,
        } => run_generate(inputs, operations, output)?,
        Commands::Sessions { url } => run_sessions(&config, url)?,
        Commands::Fetch {
            session,
            output,
            url,
        } => run_fetch(&config, session, output, url)?,
        Commands::View {
            input,
            session,
            url,
            fold_relinearize,
        } => run_view(&config, input, session, url, fold_relinearize)?,
        Commands::Serve { port, payload } => run_serve(&config, port, payload)?,
    }
    Ok(())
}

fn client_for(config: &DebuggerConfig, url: Option<String>) -> CliResult<DebuggerClient> {
    let client_config = ClientConfig {
        base_url: url.unwrap_or_else(|| config.backend_url.clone()),
        timeout: config.timeout(),
    };
    Ok(DebuggerClient::new(&client_config)?)
}

fn run_validate(input: PathBuf) -> CliResult<()> {
    let envelope = load_envelope(&input)?;
    let errors = validate::validation_errors(envelope.raw());
    if errors.is_empty() {
        println!(
            "{} is well-formed ({} nodes, {} edges, {} relinearize)",
            input.display(),
            envelope.raw().nodes.len(),
            envelope.raw().edges.len(),
            envelope.raw().relinearize_count()
        );
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  {error}");
        }
        Err(format!("{} structural error(s) in {}", errors.len(), input.display()).into())
    }
}

fn run_transform(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    fold_relinearize: bool,
) -> CliResult<()> {
    let envelope = match &input {
        Some(path) => load_envelope(path)?,
        None => sample_envelope(),
    };
    let rendered = transform::render_graph(envelope.raw(), !fold_relinearize)?;
    match output {
        Some(path) => {
            save_render_graph(&path, &rendered)?;
            println!(
                "Render graph with {} nodes and {} edges saved to {}",
                rendered.nodes.len(),
                rendered.edges.len(),
                path.display()
            );
        }
        None => println!("{}", rendered.to_json()?),
    }
    Ok(())
}

fn run_generate(inputs: u32, operations: u32, output: PathBuf) -> CliResult<()> {
    let (envelope, params) = generate_random_program(inputs, operations);
    println!(
        "Generated program with {} inputs, {} operations, {} relinearize, {} outputs",
        params.inputs, params.operations, params.relinearize_nodes, params.output_nodes
    );
    save_envelope(&output, &envelope)?;
    println!("Payload saved to {}", output.display());
    Ok(())
}

fn run_sessions(config: &DebuggerConfig, url: Option<String>) -> CliResult<()> {
    let client = client_for(config, url)?;
    let sessions = client.sessions()?;
    if sessions.is_empty() {
        println!("No sessions on {}", client.base_url());
    } else {
        for session in sessions {
            println!("{session}");
        }
    }
    Ok(())
}

fn run_fetch(
    config: &DebuggerConfig,
    session: String,
    output: Option<PathBuf>,
    url: Option<String>,
) -> CliResult<()> {
    let client = client_for(config, url)?;
    let envelope = client.session_graph(&session)?;
    println!(
        "Fetched session {session}: {} nodes, {} edges, {} relinearize",
        envelope.raw().nodes.len(),
        envelope.raw().edges.len(),
        envelope.raw().relinearize_count()
    );
    if let Some(path) = output {
        save_envelope(&path, &envelope)?;
        println!("Payload saved to {}", path.display());
    }
    Ok(())
}

fn run_view(
    config: &DebuggerConfig,
    input: Option<PathBuf>,
    session_name: Option<String>,
    url: Option<String>,
    fold_relinearize: bool,
) -> CliResult<()> {
    let include_relinearize = if fold_relinearize {
        false
    } else {
        config.include_relinearize
    };

    let (session, client) = match (input, session_name) {
        (Some(path), _) => {
            let envelope = load_envelope(&path)?;
            validate::validate(envelope.raw())?;
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "payload".to_string());
            (DebugSession::new(name, envelope, String::new()), None)
        }
        (None, Some(name)) => {
            let client = client_for(config, url)?;
            let envelope = client.session_graph(&name)?;
            let source = client.program_source(&name)?;
            (DebugSession::new(name, envelope, source), Some(client))
        }
        (None, None) => (sample_session(), None),
    };

    let mut tui = DebuggerTui::new(session, client, include_relinearize)?;
    tui.run()?;
    println!("View finished.");
    Ok(())
}

fn run_serve(config: &DebuggerConfig, port: Option<u16>, payloads: Vec<PathBuf>) -> CliResult<()> {
    let mut store = SessionStore::new();
    store.insert(sample_session());
    for path in payloads {
        let envelope = load_envelope(&path)?;
        validate::validate(envelope.raw())?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "payload".to_string());
        store.insert(DebugSession::new(name, envelope, String::new()));
    }
    println!("Serving {} session(s)", store.len());

    let store = Arc::new(RwLock::new(store));
    server::serve_blocking(store, port.unwrap_or(config.port))?;
    Ok(())
}
