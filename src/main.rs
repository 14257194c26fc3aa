use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use fleet_planner::external::{self, ExternalRequest};
use fleet_planner::ingest;
use fleet_planner::model::{Dataset, PlanRequest, PlannerOutput};
use fleet_planner::params::PlannerParams;
use fleet_planner::remote::{SimulationClient, SimulationServiceConfig};
use fleet_planner::solver;
use fleet_planner::subprocess::{ScriptRunner, ScriptRunnerConfig};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign vehicles to routes and write the plan as JSON
    Plan {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        params: ParamArgs,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare plans for several swap window lengths
    Sweep {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        params: ParamArgs,

        /// Swap window lengths (days) to compare
        #[arg(long = "window", required = true, num_args = 1..)]
        windows: Vec<u32>,
    },
    /// Run the external planner (HTTP service, then script fallback)
    External {
        /// Directory with the CSV inputs
        #[arg(long)]
        data: PathBuf,

        /// Planner script used when the service is unavailable
        #[arg(long)]
        script: PathBuf,

        /// Simulation service base URL (defaults to $FLEET_PLANNER_SERVICE_URL)
        #[arg(long)]
        service_url: Option<String>,

        /// Skip the HTTP service entirely
        #[arg(long)]
        no_service: bool,

        #[arg(long)]
        swap_days: Option<u32>,

        #[arg(long)]
        days: Option<u32>,

        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Directory with Vehicles/Locations/Locations_relations/Routes/Segments CSVs
    #[arg(long)]
    data: Option<PathBuf>,

    /// JSON request body with vehicles, locations, relations, routes, segments and params
    #[arg(long)]
    request: Option<PathBuf>,
}

#[derive(Args)]
struct ParamArgs {
    /// JSON file with planner parameters (missing keys take defaults)
    #[arg(long)]
    params: Option<PathBuf>,

    #[arg(long)]
    swap_days: Option<u32>,

    #[arg(long)]
    horizon_days: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Plan {
            input,
            params,
            output,
        } => {
            let (dataset, params) = load(&input, &params)?;
            let plan = solver::plan(&dataset, &params);
            write_json(&plan, output)?;
        }
        Commands::Sweep {
            input,
            params,
            windows,
        } => {
            let (dataset, base) = load(&input, &params)?;
            let scenarios: Vec<PlannerParams> = windows
                .iter()
                .map(|&window| PlannerParams {
                    max_swaps_per_vehicle_per_days: window,
                    ..base.clone()
                })
                .collect();
            let plans = solver::plan_scenarios(&dataset, &scenarios);
            for (window, plan) in windows.iter().zip(&plans) {
                log_summary(*window, plan);
            }
        }
        Commands::External {
            data,
            script,
            service_url,
            no_service,
            swap_days,
            days,
            timeout_secs,
        } => {
            let service = if no_service {
                None
            } else {
                let mut config = SimulationServiceConfig::from_env();
                if let Some(url) = service_url {
                    config.base_url = url;
                }
                Some(SimulationClient::new(config)?)
            };
            let runner = ScriptRunner::new(ScriptRunnerConfig {
                timeout_secs,
                ..ScriptRunnerConfig::new(script)
            });
            let request = ExternalRequest {
                data_dir: data,
                swap_days,
                days,
            };
            let plan = external::run_external(service.as_ref(), &runner, &request)?;
            write_json(&plan, None)?;
        }
    }

    Ok(())
}

fn load(input: &InputArgs, args: &ParamArgs) -> anyhow::Result<(Dataset, PlannerParams)> {
    let (dataset, mut params) = match (&input.data, &input.request) {
        (Some(dir), _) => {
            let dataset = ingest::load_dataset(dir)
                .with_context(|| format!("loading CSVs from {}", dir.display()))?;
            (dataset, PlannerParams::default())
        }
        (None, Some(path)) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            let request: PlanRequest = serde_json::from_reader(BufReader::new(file))?;
            (request.dataset, request.params)
        }
        (None, None) => anyhow::bail!("either --data or --request is required"),
    };

    if let Some(path) = &args.params {
        params = PlannerParams::from_json_file(path)
            .with_context(|| format!("reading parameters from {}", path.display()))?;
    }
    if let Some(days) = args.swap_days {
        params.max_swaps_per_vehicle_per_days = days;
    }
    if args.horizon_days.is_some() {
        params.horizon_days = args.horizon_days;
    }
    params.validate()?;

    Ok((dataset, params))
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
            info!("plan written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, value)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

fn log_summary(window: u32, plan: &PlannerOutput) {
    info!(
        "window {:>3}d: assigned {:>5}, unassigned {:>4}, swaps {:>4}, deadhead {:>12.2}, overage {:>12.2}, utilization {:>5.1}%",
        window,
        plan.assignments.len(),
        plan.alerts.len(),
        plan.num_swaps,
        plan.total_deadhead_cost,
        plan.total_overage_cost,
        plan.kpis.pct_contract_utilization,
    );
}
