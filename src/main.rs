use fitcoach::cli::commands::{self, Context};
use fitcoach::cli::output::Output;
use fitcoach::cli::{Cli, Commands};
use fitcoach::utils::logging;
use fitcoach::utils::toml_config::FitcoachConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Err(e) = run(cli, &output).await {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> anyhow::Result<()> {
    let config = FitcoachConfig::resolve(&cli.config)?;
    init_tracing(&config, &cli);

    match cli.command {
        None | Some(Commands::Serve) => commands::serve(config, output).await,
        Some(Commands::Config { full, validate }) => {
            commands::show_config(&config, &cli.config, full, validate, output)
        }
        Some(command) => {
            let ctx = Context::new(config, *output)?;
            commands::run(command, &ctx).await
        }
    }
}

fn init_tracing(config: &FitcoachConfig, cli: &Cli) {
    // Client subcommands stay quiet unless asked; the server logs at its configured level.
    let level = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (None | Some(Commands::Serve), false) => config.server.log_level.as_str(),
        _ => "warn",
    };
    logging::init(level, cli.log_json);
}
