use clap::{Parser, Subcommand};
use reminders_core::{Config, ErrorReport};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "reminders", version, about = "Recurring day-countdown reminders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a reminder
    Add {
        /// Reminder name (case and spacing are ignored when matching)
        name: String,
        /// Days between resets (1-365)
        #[arg(long, allow_negative_numbers = true)]
        interval: i64,
        /// Name shown instead of `name`
        #[arg(long)]
        display_name: Option<String>,
    },
    /// List reminders as JSON
    List {
        /// Only reminders that are due
        #[arg(long)]
        due: bool,
    },
    /// Show one reminder
    Show {
        /// Name, entity key or alias
        target: String,
    },
    /// Delete a reminder
    Remove { target: String },
    /// Restart a countdown at its interval
    Reset { target: String },
    /// Override the days remaining (0-365)
    SetDays {
        target: String,
        #[arg(allow_negative_numbers = true)]
        days: i64,
    },
    /// Change the reset interval (1-365)
    SetInterval {
        target: String,
        #[arg(allow_negative_numbers = true)]
        interval: i64,
    },
    /// Reconcile every reminder now and print the report
    Tick,
    /// Run the tick scheduler until Ctrl-C
    Watch,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("REMINDERS_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let config = Config::load();
    init_tracing(
        config
            .as_ref()
            .map(|c| c.log.level.as_str())
            .unwrap_or("info"),
    );

    let result = match cli.command {
        // Config commands must work even when the file does not parse.
        Commands::Config { action } => commands::config::run(action),
        command => match config {
            Ok(config) => run(command, config).await,
            Err(e) => Err(e.into()),
        },
    };

    if let Err(e) = result {
        let report = ErrorReport::from(&e);
        match serde_json::to_string(&report) {
            Ok(json) => eprintln!("{json}"),
            Err(_) => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: Config) -> reminders_core::error::Result<()> {
    use commands::reminder;

    match command {
        Commands::Add {
            name,
            interval,
            display_name,
        } => reminder::add(&config, &name, interval, display_name),
        Commands::List { due } => reminder::list(&config, due),
        Commands::Show { target } => reminder::show(&config, &target),
        Commands::Remove { target } => reminder::remove(&config, &target),
        Commands::Reset { target } => reminder::reset(&config, &target),
        Commands::SetDays { target, days } => reminder::set_days(&config, &target, days),
        Commands::SetInterval { target, interval } => {
            reminder::set_interval(&config, &target, interval)
        }
        Commands::Tick => reminder::tick(&config),
        Commands::Watch => commands::watch::run(config).await,
        Commands::Config { action } => commands::config::run(action),
    }
}
