use std::sync::Arc;

use {
    ainx_agents::{CriticAgent, EchoAgent, PlannerAgent, ResearcherAgent},
    ainx_bus::{BusConfig, MessageBus},
    ainx_config::{AgentKind, AinxConfig},
    ainx_protocol::{AinxMessage, Recipient},
    ainx_routing::{AgentHandle, DispatchResult, Router, RouterConfig},
    clap::{Parser, Subcommand},
    tokio::io::AsyncBufReadExt,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "ainx", about = "AINX — AI-to-AI message protocol")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). Overrides config.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file path (overrides discovery).
    #[arg(long, global = true, env = "AINX_CONFIG")]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a directed message and dispatch it to the configured agents.
    Send {
        /// Name of the sending party (e.g. "human").
        #[arg(long)]
        sender: String,
        /// Intent of the message (e.g. "QUERY", "plan").
        #[arg(long)]
        intent: String,
        /// Content of the message payload.
        #[arg(short, long)]
        message: String,
        /// Recipient identifier, or "broadcast".
        #[arg(long, default_value = "broadcast")]
        to: String,
        /// Role tag of the sending party.
        #[arg(long, default_value = "USER")]
        role: String,
    },
    /// Parse a raw message and print its canonical and JSON forms.
    Parse {
        /// Raw message text, e.g. "ANALYST::QUERY::SALES.region=EMEA".
        raw: String,
    },
    /// Message loop: read raw messages from stdin, dispatch each, print
    /// the results.
    Chat,
    /// List the agents the config registers.
    Agents,
}

/// Initialise tracing from the CLI flags, falling back to the config's
/// `[log]` section. `RUST_LOG` wins when set.
fn init_telemetry(cli: &Cli, config: &AinxConfig) {
    let level = cli.log_level.as_deref().unwrap_or(&config.log.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs || config.log.json {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Build a router and register every configured agent into it.
async fn build_router(config: &AinxConfig) -> anyhow::Result<Router> {
    let router = Router::with_config(RouterConfig {
        allow_overwrite: config.router.allow_overwrite,
        strict_unregister: config.router.strict_unregister,
    });

    for entry in &config.agents {
        let handle: Arc<dyn AgentHandle> = match entry.kind {
            AgentKind::Researcher => Arc::new(ResearcherAgent::default()),
            AgentKind::Planner => Arc::new(PlannerAgent::default()),
            AgentKind::Critic => Arc::new(CriticAgent::default()),
            AgentKind::Echo => Arc::new(EchoAgent::default()),
        };
        router
            .register_with_roles(entry.id.clone(), entry.roles.clone(), handle)
            .await?;
    }

    Ok(router)
}

fn print_result(result: &DispatchResult) {
    if result.is_empty() {
        println!("(no matching agents)");
        return;
    }
    for delivery in &result.deliveries {
        match &delivery.outcome {
            Ok(Some(reply)) => println!("  {} — {reply}", delivery.recipient),
            Ok(None) => println!("  {} — (no reply)", delivery.recipient),
            Err(error) => println!("  {} — FAILED: {}", delivery.recipient, error.source),
        }
    }
}

async fn handle_send(
    config: &AinxConfig,
    sender: String,
    to: String,
    role: String,
    intent: String,
    message: String,
) -> anyhow::Result<()> {
    let router = build_router(config).await?;
    let msg = AinxMessage::directed(sender, Recipient::from(to), role, intent, message)?;

    info!(message = %msg, "dispatching");
    let result = router.dispatch(&msg).await?;
    print_result(&result);

    let any_delivered = result.deliveries.iter().any(|d| d.outcome.is_ok());
    if !result.is_empty() && !any_delivered {
        anyhow::bail!("every delivery failed");
    }
    Ok(())
}

fn handle_parse(raw: &str) -> anyhow::Result<()> {
    let msg = AinxMessage::parse(raw)?;
    println!("{msg}");
    println!("{}", serde_json::to_string_pretty(&msg)?);
    Ok(())
}

/// The message loop: parse each stdin line, log it on the bus, dispatch
/// it, feed replies back through the bus, print the outcome. Malformed
/// lines report their parse error and the loop continues.
async fn handle_chat(config: &AinxConfig) -> anyhow::Result<()> {
    let router = build_router(config).await?;

    let bus = MessageBus::new(BusConfig {
        max_queue: config.bus.max_queue,
        history_limit: config.bus.history_limit,
    });
    bus.start();
    for entry in &config.agents {
        bus.attach(&entry.id).await;
    }

    println!("AINX message loop — one raw message per line (\"exit\" to quit).");
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") {
            break;
        }

        let msg = match AinxMessage::parse(line) {
            Ok(msg) => msg,
            Err(error) => {
                eprintln!("parse error: {error}");
                continue;
            },
        };

        bus.send(msg.clone()).await?;
        match router.dispatch(&msg).await {
            Ok(result) => {
                for reply in result.replies() {
                    bus.send(reply.clone()).await?;
                }
                print_result(&result);
            },
            Err(error) => eprintln!("dispatch error: {error}"),
        }
    }

    bus.stop();
    let stats = bus.stats().await;
    println!(
        "session: {} sent, {} delivered, {} failed",
        stats.messages_sent, stats.messages_delivered, stats.failed_deliveries
    );
    Ok(())
}

fn handle_agents(config: &AinxConfig) {
    if config.agents.is_empty() {
        println!("No agents configured.");
        return;
    }
    for entry in &config.agents {
        let roles = if entry.roles.is_empty() {
            "all roles".to_string()
        } else {
            entry.roles.join(", ")
        };
        println!("  {} — {:?} [{roles}]", entry.id, entry.kind);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ainx_config::load_config(path)?,
        None => ainx_config::discover_and_load(),
    };
    init_telemetry(&cli, &config);

    info!(version = env!("CARGO_PKG_VERSION"), "ainx starting");

    match cli.command {
        Commands::Send {
            sender,
            intent,
            message,
            to,
            role,
        } => handle_send(&config, sender, to, role, intent, message).await,
        Commands::Parse { raw } => handle_parse(&raw),
        Commands::Chat => handle_chat(&config).await,
        Commands::Agents => {
            handle_agents(&config);
            Ok(())
        },
    }
}
