use care_match::app::{intake, render, Interrupt};
use care_match::config::cli::{Command, FacilityCommand, IntakeArgs};
use care_match::config::LogFormat;
use care_match::utils::error::ErrorSeverity;
use care_match::utils::logger;
use care_match::{ApiClient, CareMatchError, CliConfig, ClientSettings, FacilityAdmin, IntakeRunner};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let settings = match ClientSettings::load(&cli.overrides()) {
        Ok(settings) => settings,
        Err(e) => {
            // 日誌尚未初始化，直接輸出
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    // 初始化日誌
    match settings.log_format {
        LogFormat::Json => logger::init_json_logger(settings.verbose),
        LogFormat::Compact => logger::init_cli_logger(settings.verbose),
    }

    tracing::info!("Starting care-match CLI");
    if settings.verbose {
        tracing::debug!("Client settings: {:?}", settings);
    }

    if let Err(e) = run(cli.command, &settings).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        // 輸出用戶友好的錯誤信息
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let code = exit_code(&e);
        if code > 0 {
            std::process::exit(code);
        }
    }
}

/// 根據錯誤嚴重程度決定退出碼
fn exit_code(e: &CareMatchError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

/// 攔截 Ctrl-C：有配對請求時取消該請求，其餘時候以 130 結束程式
fn watch_ctrl_c(interrupt: Interrupt) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupt.trigger() {
                tracing::debug!("Ctrl-C delivered to in-flight request");
                continue;
            }
            eprintln!();
            tracing::info!("👋 Interrupted");
            std::process::exit(130);
        }
    });
}

async fn run(command: Command, settings: &ClientSettings) -> care_match::Result<()> {
    let client = ApiClient::new(settings)?;
    tracing::debug!("Using API at {}", client.base_url());

    match command {
        Command::Intake(args) => run_intake(client, &args).await,
        Command::Facility { command } => run_facility(client, command).await,
    }
}

async fn run_intake(client: ApiClient, args: &IntakeArgs) -> care_match::Result<()> {
    let interrupt = Interrupt::new();
    watch_ctrl_c(interrupt.clone());

    if args.is_complete() {
        let cancelled = interrupt.cancelled();
        let (draft, result) = intake::submit_intake(client, args.to_draft(), cancelled).await?;
        print!("{}", render::render_match_result(&draft, &result));
        return Ok(());
    }

    let stdin = std::io::stdin();
    let mut runner = IntakeRunner::new(client, stdin.lock(), std::io::stdout());
    let result = runner.run_with_cancel(|| interrupt.cancelled()).await?;
    tracing::info!(
        "✅ Intake finished (matched: {})",
        result.map(|r| r.matched.to_string()).unwrap_or_else(|| "-".into())
    );
    Ok(())
}

async fn run_facility(client: ApiClient, command: FacilityCommand) -> care_match::Result<()> {
    let admin = FacilityAdmin::new(client);

    match &command {
        FacilityCommand::Create { .. } => {
            let form = command
                .to_form()
                .ok_or_else(|| CareMatchError::config("create arguments are missing"))?;
            let (facility, message) = admin.create(&form).await?;
            println!("✅ {}", message);
            print!("{}", render::render_facility(&facility));
        }
        FacilityCommand::List { .. } => {
            let query = command.to_query().unwrap_or_default();
            let facilities = admin.list(&query).await?;
            print!("{}", render::render_facility_list(&facilities));
        }
        FacilityCommand::Get { id } => {
            let facility = admin.get(id).await?;
            print!("{}", render::render_facility(&facility));
        }
        FacilityCommand::Update { id, .. } => {
            let update = command.to_update().unwrap_or_default();
            let facility = admin.update(id, &update).await?;
            println!("✅ Facility \"{}\" updated successfully!", facility.name);
            print!("{}", render::render_facility(&facility));
        }
        FacilityCommand::Delete { id } => {
            if admin.delete(id).await? {
                println!("🗑️ Facility {} deleted", id);
            } else {
                println!("⚠️  Facility {} was not deleted", id);
            }
        }
    }

    Ok(())
}
