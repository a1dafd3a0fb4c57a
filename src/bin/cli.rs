use anyhow::{bail, Result};
use cfb_ats::data::{save_arbitrage_to_csv, save_game_records_to_csv};
use cfb_ats::season::{Record, SeasonAggregator, SeasonReport};
use cfb_ats::{
    build_season_report, find_week_arbitrage, Credentials, EngineConfig, GameResultsApiClient,
    SeasonType, SpreadTiers,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// College football against-the-spread statistics and arbitrage scanner
#[derive(Parser, Debug)]
#[command(name = "cli", version, about)]
struct Cli {
    /// CollegeFootballData API key (falls back to CFBD_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Reuse cached API responses under cache/ when present
    #[arg(long, global = true, env = "USE_CACHE")]
    use_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Season ATS record and situational splits for one team
    Ats(AtsArgs),
    /// Cross-provider moneyline arbitrage for one week
    Arbitrage(ArbitrageArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Segment {
    Regular,
    Postseason,
    /// Regular season and postseason combined
    All,
}

impl Segment {
    fn season_type(self) -> Option<SeasonType> {
        match self {
            Segment::Regular => Some(SeasonType::Regular),
            Segment::Postseason => Some(SeasonType::Postseason),
            Segment::All => None,
        }
    }
}

#[derive(Args, Debug)]
struct AtsArgs {
    #[arg(long)]
    team: String,

    #[arg(long)]
    year: i32,

    #[arg(long, value_enum, default_value = "regular")]
    season_type: Segment,

    /// ATS margins closer to zero than this are pushes
    #[arg(long, env = "PUSH_THRESHOLD", default_value_t = cfb_ats::DEFAULT_PUSH_THRESHOLD)]
    push_threshold: f64,

    /// Largest absolute spread counted as small
    #[arg(long, default_value_t = SpreadTiers::default().small_max)]
    small_max: f64,

    /// Largest absolute spread counted as medium
    #[arg(long, default_value_t = SpreadTiers::default().medium_max)]
    medium_max: f64,

    /// Preferred line providers, most preferred first (repeatable)
    #[arg(long = "provider")]
    providers: Vec<String>,

    /// Write the per-game log to this CSV file
    #[arg(long)]
    csv: Option<String>,
}

#[derive(Args, Debug)]
struct ArbitrageArgs {
    #[arg(long)]
    year: i32,

    #[arg(long)]
    week: i32,

    #[arg(long, value_enum, default_value = "regular")]
    season_type: Segment,

    /// Write opportunities to this CSV file
    #[arg(long)]
    csv: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads the environment
    let credentials = Credentials::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let api_key = match cli.api_key {
        Some(key) => key,
        None => credentials.cfbd()?.to_string(),
    };
    let client = GameResultsApiClient::new(api_key);

    match cli.command {
        Command::Ats(args) => run_ats(&client, args, cli.use_cache).await,
        Command::Arbitrage(args) => run_arbitrage(&client, args, cli.use_cache).await,
    }
}

async fn run_ats(client: &GameResultsApiClient, args: AtsArgs, use_cache: bool) -> Result<()> {
    let mut config = EngineConfig {
        push_threshold: args.push_threshold,
        spread_tiers: SpreadTiers {
            small_max: args.small_max,
            medium_max: args.medium_max,
        },
        ..EngineConfig::default()
    };
    if !args.providers.is_empty() {
        config.provider_priority = args.providers;
    }
    let aggregator = SeasonAggregator::new(config)?;

    let report = build_season_report(
        client,
        &aggregator,
        &args.team,
        args.year,
        args.season_type.season_type(),
        use_cache,
    )
    .await?;

    print_report(&report, args.year);
    println!(
        "\nLine providers: {}",
        aggregator.config().provider_priority.join(", ")
    );

    if let Some(path) = args.csv {
        save_game_records_to_csv(&report.games, &path)?;
        println!("\nSaved game log to {}", path);
    }

    Ok(())
}

fn print_report(report: &SeasonReport, year: i32) {
    let segment = report
        .season_type
        .map(|s| s.to_string())
        .unwrap_or_else(|| "full season".to_string());
    println!("{} {} ATS ({})\n", year, report.team, segment);

    for game in &report.games {
        println!("{}", game.format());
    }

    println!("\nRECORD\n");
    println!("ATS:        {}", report.record.format());
    println!("Profit:     {:+.2}", report.total_profit);
    println!("ROI:        {:+.2}%", report.roi_percentage);
    println!("Totals:     {}", report.totals.format());

    println!("\nSITUATIONAL\n");
    let s = &report.situational;
    let rows: [(&str, &Record); 7] = [
        ("Home", &s.home),
        ("Away", &s.away),
        ("Favorite", &s.favorite),
        ("Underdog", &s.underdog),
        ("Small spread", &s.small_spread),
        ("Medium spread", &s.medium_spread),
        ("Large spread", &s.large_spread),
    ];
    for (label, record) in rows {
        println!("{:<14} {}", label, record.format());
    }

    println!("\nDATA QUALITY\n");
    println!("{}", report.data_quality.format());
}

async fn run_arbitrage(
    client: &GameResultsApiClient,
    args: ArbitrageArgs,
    use_cache: bool,
) -> Result<()> {
    let Some(season_type) = args.season_type.season_type() else {
        bail!("arbitrage scans one segment at a time; pass regular or postseason");
    };
    let arbs = find_week_arbitrage(client, args.year, args.week, season_type, use_cache).await?;

    println!("MONEYLINE ARBITRAGE\n");
    if arbs.is_empty() {
        println!("No moneyline arbitrage opportunities found.");
    } else {
        println!("Found {} Moneyline Arbitrage Opportunities:\n", arbs.len());
        for (i, arb) in arbs.iter().enumerate() {
            println!("{}. {}", i + 1, arb.format());
        }
    }

    if let Some(path) = args.csv {
        if !arbs.is_empty() {
            save_arbitrage_to_csv(&arbs, &path)?;
            println!("\nSaved moneyline arbitrage to {}", path);
        }
    }

    Ok(())
}
