use clap::Parser;
use rentroll_etl::config::toml_config::TomlConfig;
use rentroll_etl::utils::{logger, validation::Validate};
use rentroll_etl::{EtlEngine, LocalStorage, TomlReportPipeline};

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Rent-roll report tool with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "report-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the record limit from config
    #[arg(long)]
    max_records: Option<usize>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,

    /// Emit JSON-formatted logs (for scheduled runs piped into log collectors)
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based rent-roll report tool");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(max_records) = args.max_records {
        config.extract.max_records = Some(max_records);
        tracing::info!("🔧 Record limit overridden to: {}", max_records);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道
    let storage = LocalStorage::new(config.load.output_path.clone());
    let pipeline = TomlReportPipeline::new(storage, config);

    // 創建引擎並運行
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Rent-roll report completed successfully!");
            println!("✅ Rent-roll report completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Report run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                rentroll_etl::utils::error::ErrorSeverity::Low => 0,
                rentroll_etl::utils::error::ErrorSeverity::Medium => 2,
                rentroll_etl::utils::error::ErrorSeverity::High => 1,
                rentroll_etl::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    use rentroll_etl::core::ConfigProvider;

    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    println!("  Source: {}", config.source.endpoint);
    println!("  Output: {}", config.output_path());
    println!("  Rent fields: {}", config.rent_fields().join(", "));
    println!("  Formats: {}", config.load.output_formats.join(", "));

    if let Some(max_records) = config.max_records() {
        println!("  Max Records: {}", max_records);
    }

    if config.total_units() > 0 {
        println!("  Portfolio Units: {}", config.total_units());
    }
    if config.monthly_budget() > 0.0 {
        println!("  Monthly Budget: AED {:.2}", config.monthly_budget());
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
