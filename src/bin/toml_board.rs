use clap::Parser;
use vehicle_board::core::ConfigProvider;
use vehicle_board::utils::{logger, validation::Validate};
use vehicle_board::{BoardEngine, BoardPipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-board")]
#[command(about = "Vehicle board driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "vehicle-board.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Override bundling from config
    #[arg(long)]
    bundle: Option<bool>,

    /// Show what would be done without fetching or writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_logger(args.verbose, args.log_json);

    tracing::info!("🚀 Starting TOML-based vehicle board");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    // 命令列覆蓋設定
    if let Some(bundle) = args.bundle {
        config.output.bundle = Some(bundle);
        tracing::info!("🔧 Bundling overridden to: {}", bundle);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be fetched or written");
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = match BoardPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };
    let engine = BoardEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Vehicle board rendered");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    let view = config.map_view();

    tracing::info!("📋 Configuration Summary:");
    tracing::info!("   Endpoint: {}", config.api_endpoint());
    if let Some(timeout) = config.timeout_seconds() {
        tracing::info!("   Timeout: {}s", timeout);
    }
    tracing::info!("   Commands: {}", config.commands().len());
    for command in config.commands() {
        tracing::info!("     - {}", command);
    }
    tracing::info!(
        "   Map: center [{}, {}], zoom {}",
        view.center[0],
        view.center[1],
        view.zoom
    );
    tracing::info!("   Output: {}", config.output_path());
    tracing::info!(
        "   Formats: {}",
        config
            .output_formats()
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!("   Bundle: {}", config.bundle());
}
