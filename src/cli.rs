use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::api::{
    CalculatorMode, ProjectionArgs, build_inputs, build_projection_report, run_fire,
    run_http_server,
};
use crate::core::{GoalFundingRequest, assess_goal, solve_goal_funding};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliMode {
    Basic,
    Advanced,
}

impl From<CliMode> for CalculatorMode {
    fn from(value: CliMode) -> Self {
        match value {
            CliMode::Basic => CalculatorMode::Basic,
            CliMode::Advanced => CalculatorMode::Advanced,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "fire-projection",
    about = "Deterministic FIRE projections: savings goal, required contributions and a year-by-year trajectory"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the calculators as a JSON HTTP API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print the FIRE summary (and optionally the trajectory) as JSON.
    Project {
        #[command(flatten)]
        args: ProjectionArgs,
        #[arg(long, value_enum, default_value_t = CliMode::Advanced)]
        mode: CliMode,
        #[arg(long, help = "Include the year-by-year trajectory")]
        trajectory: bool,
    },
    /// Solve the constant per-period payment that reaches a future value.
    Goal {
        #[arg(long, default_value_t = 0.0)]
        present_value: f64,
        #[arg(long)]
        future_value: f64,
        #[arg(long)]
        periods: u32,
        #[arg(long, help = "Fractional rate per period, e.g. 0.005")]
        periodic_rate: f64,
    },
    /// Report progress towards a savings goal.
    GoalProgress {
        #[arg(long)]
        current_amount: f64,
        #[arg(long)]
        target_amount: f64,
        #[arg(long)]
        months_remaining: Option<u32>,
        #[arg(long, default_value_t = 0.0, help = "Expected annual return in percent")]
        annual_return: f64,
    },
}

#[derive(Debug, Serialize)]
struct PaymentOutput {
    payment: f64,
}

pub async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Serve { port } => run_http_server(port)
            .await
            .map_err(|e| format!("server error: {e}")),
        command => {
            let output = render(command)?;
            println!("{output}");
            Ok(())
        }
    }
}

/// Runs a one-shot command and returns its JSON output.
pub fn render(command: Command) -> Result<String, String> {
    match command {
        Command::Serve { .. } => Err("serve does not produce one-shot output".to_string()),
        Command::Project {
            args,
            mode,
            trajectory,
        } => {
            let inputs = build_inputs(args)?;
            if trajectory {
                let report =
                    build_projection_report(&inputs, mode.into()).map_err(|e| e.to_string())?;
                to_json(&report)
            } else {
                let result = run_fire(&inputs, mode.into()).map_err(|e| e.to_string())?;
                to_json(&result)
            }
        }
        Command::Goal {
            present_value,
            future_value,
            periods,
            periodic_rate,
        } => {
            let payment = solve_goal_funding(&GoalFundingRequest {
                present_value,
                future_value,
                periods,
                periodic_rate,
            })
            .map_err(|e| e.to_string())?;
            to_json(&PaymentOutput { payment })
        }
        Command::GoalProgress {
            current_amount,
            target_amount,
            months_remaining,
            annual_return,
        } => {
            let progress =
                assess_goal(current_amount, target_amount, months_remaining, annual_return)
                    .map_err(|e| e.to_string())?;
            to_json(&progress)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to serialize output: {e}"))
}
