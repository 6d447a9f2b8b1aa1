use clap::{value_parser, Arg, ArgMatches, Command};
use orgpulse_agent::params::parse_departments;
use orgpulse_agent::{GenerationParams, Pipeline, RunOptions, SynthRng};
use orgpulse_model::{ClimatePreset, ModuleCode};
use orgpulse_store::{JsonStore, MemoryStore, SurveyStore};
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_DEPARTMENTS: &str = "Engineering:40,Sales:30,Operations:30,Marketing:30,People:20";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn cli() -> Command {
    let seed_arg = Arg::new("seed")
        .long("seed")
        .default_value("42")
        .value_parser(value_parser!(u64))
        .help("Random seed for reproducibility");
    let preset_arg = Arg::new("preset")
        .long("preset")
        .default_value("good")
        .help("Climate preset: excellent|good|mixed|poor");
    let respondents_arg = Arg::new("respondents")
        .long("respondents")
        .default_value("150")
        .value_parser(value_parser!(u32))
        .help("Number of respondents to simulate");
    let fail_rate_arg = Arg::new("fail-rate")
        .long("fail-rate")
        .default_value("0.08")
        .value_parser(value_parser!(f64))
        .help("Probability of flunking the attention checks");
    let campaign_arg = Arg::new("campaign")
        .long("campaign")
        .required(true)
        .help("Campaign id");

    Command::new("orgpulse-agent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Synthetic survey-data generator and verification harness")
        .arg_required_else_help(true)
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .help("Path to a JSON snapshot store (stages compose across invocations)"),
        )
        .subcommand(
            Command::new("create-org")
                .about("Create an organization with a department mix")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .default_value("OrgPulse Demo Org")
                        .help("Organization name"),
                )
                .arg(
                    Arg::new("departments")
                        .long("departments")
                        .default_value(DEFAULT_DEPARTMENTS)
                        .help("Department mix as Name:headcount,Name:headcount"),
                )
                .arg(seed_arg.clone()),
        )
        .subcommand(
            Command::new("create-campaign")
                .about("Create a draft campaign for an organization")
                .arg(Arg::new("org").long("org").required(true).help("Organization id"))
                .arg(
                    Arg::new("name")
                        .long("name")
                        .default_value("Climate Survey")
                        .help("Campaign name"),
                )
                .arg(
                    Arg::new("modules")
                        .long("modules")
                        .default_value("")
                        .help("Comma-separated module codes: CAM,CLI,DIG"),
                )
                .arg(seed_arg.clone()),
        )
        .subcommand(
            Command::new("simulate-survey")
                .about("Activate a campaign and simulate its respondent population")
                .arg(campaign_arg.clone())
                .arg(respondents_arg.clone())
                .arg(preset_arg.clone())
                .arg(fail_rate_arg.clone())
                .arg(seed_arg.clone()),
        )
        .subcommand(
            Command::new("calculate")
                .about("Close a campaign and run the results engine")
                .arg(campaign_arg.clone()),
        )
        .subcommand(
            Command::new("verify")
                .about("Run the verification battery against calculated results")
                .arg(campaign_arg)
                .arg(respondents_arg.clone())
                .arg(preset_arg.clone())
                .arg(fail_rate_arg.clone()),
        )
        .subcommand(
            Command::new("cleanup")
                .about("Delete everything owned by an organization")
                .arg(Arg::new("org").long("org").required(true).help("Organization id")),
        )
        .subcommand(
            Command::new("run-full")
                .about("Full lifecycle: create, simulate, calculate, verify, cleanup")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .default_value("OrgPulse Demo Org")
                        .help("Organization name"),
                )
                .arg(
                    Arg::new("departments")
                        .long("departments")
                        .default_value(DEFAULT_DEPARTMENTS)
                        .help("Department mix as Name:headcount,Name:headcount"),
                )
                .arg(
                    Arg::new("modules")
                        .long("modules")
                        .default_value("")
                        .help("Comma-separated module codes: CAM,CLI,DIG"),
                )
                .arg(respondents_arg)
                .arg(preset_arg)
                .arg(fail_rate_arg)
                .arg(seed_arg)
                .arg(
                    Arg::new("skip-verify")
                        .long("skip-verify")
                        .action(clap::ArgAction::SetTrue)
                        .help("Skip the verification battery"),
                )
                .arg(
                    Arg::new("skip-cleanup")
                        .long("skip-cleanup")
                        .action(clap::ArgAction::SetTrue)
                        .help("Keep the generated data for inspection"),
                ),
        )
}

async fn run() -> anyhow::Result<i32> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("create-org", args)) => {
            let pipeline = Pipeline::new(snapshot_store(args)?);
            let mut params = base_params(args)?;
            params.organization_name = arg_string(args, "name");
            params.departments = parse_departments(&arg_string(args, "departments"))?;
            let mut rng = SynthRng::new(*args.get_one::<u64>("seed").unwrap_or(&42));
            let org = pipeline.create_organization(&mut rng, &params).await?;
            println!("organization {} ({} employees)", org.id, org.employee_count);
            Ok(0)
        }
        Some(("create-campaign", args)) => {
            let pipeline = Pipeline::new(snapshot_store(args)?);
            let org_id = parse_uuid(args, "org")?;
            let mut params = base_params(args)?;
            params.modules = parse_modules(&arg_string(args, "modules"))?;
            let mut rng = SynthRng::new(*args.get_one::<u64>("seed").unwrap_or(&42));
            let campaign =
                pipeline.create_campaign(&mut rng, org_id, &arg_string(args, "name"), &params).await?;
            println!("campaign {} (draft)", campaign.id);
            Ok(0)
        }
        Some(("simulate-survey", args)) => {
            let pipeline = Pipeline::new(snapshot_store(args)?);
            let campaign_id = parse_uuid(args, "campaign")?;
            let params = base_params(args)?;
            let mut rng = SynthRng::new(params.seed);
            pipeline.activate_campaign(campaign_id).await?;
            let totals = pipeline.simulate_survey(&mut rng, campaign_id, &params).await?;
            println!(
                "simulated {} respondents, {} responses, {} comments",
                totals.respondents, totals.responses, totals.open_responses
            );
            Ok(0)
        }
        Some(("calculate", args)) => {
            let pipeline = Pipeline::new(snapshot_store(args)?);
            let campaign_id = parse_uuid(args, "campaign")?;
            pipeline.close_campaign(campaign_id).await?;
            let totals = pipeline.calculate(campaign_id).await?;
            println!(
                "calculated: {} valid, {} disqualified, {} results, {} analytics",
                totals.valid_count,
                totals.disqualified_count,
                totals.total_results,
                totals.total_analytics
            );
            Ok(0)
        }
        Some(("verify", args)) => {
            let pipeline = Pipeline::new(snapshot_store(args)?);
            let campaign_id = parse_uuid(args, "campaign")?;
            let params = base_params(args)?;
            let report = pipeline.verify(campaign_id, &params).await?;
            println!("{}", report.render());
            Ok(if report.passed() { 0 } else { 1 })
        }
        Some(("cleanup", args)) => {
            let pipeline = Pipeline::new(snapshot_store(args)?);
            let org_id = parse_uuid(args, "org")?;
            pipeline.cleanup(org_id).await?;
            println!("organization {org_id} removed");
            Ok(0)
        }
        Some(("run-full", args)) => {
            // run-full tears everything down, so it defaults to memory when
            // no snapshot path is given.
            let store: Arc<dyn SurveyStore> = match args.get_one::<String>("store") {
                Some(path) => Arc::new(JsonStore::open(path)?),
                None => Arc::new(MemoryStore::new()),
            };
            let pipeline = Pipeline::new(store);
            let mut params = base_params(args)?;
            params.organization_name = arg_string(args, "name");
            params.departments = parse_departments(&arg_string(args, "departments"))?;
            params.modules = parse_modules(&arg_string(args, "modules"))?;
            let options = RunOptions {
                skip_verify: args.get_flag("skip-verify"),
                skip_cleanup: args.get_flag("skip-cleanup"),
            };
            let (totals, report) = pipeline.run_full(&params, options).await?;
            println!(
                "calculated: {} valid, {} disqualified, {} results, {} analytics",
                totals.valid_count,
                totals.disqualified_count,
                totals.total_results,
                totals.total_analytics
            );
            match report {
                Some(report) => {
                    println!();
                    println!("{}", report.render());
                    Ok(if report.passed() { 0 } else { 1 })
                }
                None => Ok(0),
            }
        }
        _ => Ok(2),
    }
}

/// Assemble generation parameters from the shared flags of a subcommand.
/// Flags a subcommand does not define fall back to the standard defaults.
fn base_params(args: &ArgMatches) -> anyhow::Result<GenerationParams> {
    let preset: ClimatePreset = args
        .try_get_one::<String>("preset")
        .ok()
        .flatten()
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(ClimatePreset::Good);
    let respondents =
        args.try_get_one::<u32>("respondents").ok().flatten().copied().unwrap_or(150);
    let seed = args.try_get_one::<u64>("seed").ok().flatten().copied().unwrap_or(42);
    let mut params = GenerationParams::new("OrgPulse Demo Org", preset, respondents, seed);
    if let Ok(Some(rate)) = args.try_get_one::<f64>("fail-rate") {
        params.fail_rate = *rate;
    }
    Ok(params)
}

fn parse_modules(raw: &str) -> anyhow::Result<Vec<ModuleCode>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ModuleCode>().map_err(Into::into))
        .collect()
}

fn arg_string(args: &ArgMatches, name: &str) -> String {
    args.get_one::<String>(name).cloned().unwrap_or_default()
}

fn parse_uuid(args: &ArgMatches, name: &str) -> anyhow::Result<Uuid> {
    let raw = args
        .get_one::<String>(name)
        .ok_or_else(|| anyhow::anyhow!("--{name} is required"))?;
    Ok(Uuid::parse_str(raw)?)
}

/// Stage subcommands need durable state between invocations, so they demand
/// a snapshot path.
fn snapshot_store(args: &ArgMatches) -> anyhow::Result<Arc<dyn SurveyStore>> {
    let path = args
        .get_one::<String>("store")
        .ok_or_else(|| anyhow::anyhow!("--store <path> is required for this subcommand"))?;
    Ok(Arc::new(JsonStore::open(path)?))
}
