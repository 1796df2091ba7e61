use std::process::ExitCode;

use clap::Parser;

use deckhand::matrix;
use deckhand::pipeline;
use deckhand::request::{Action, ActionRequest};
use deckhand::toolchain::CargoToolchain;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "deckhand")]
#[command(version = VERSION)]
#[command(about = "Release pipeline automation for a cargo package")]
struct Cli {
    /// Actions to run: check, test, build, run, backup, publish.
    /// Request order is irrelevant; execution order is fixed.
    #[arg(value_parser = Action::parse)]
    actions: Vec<Action>,

    /// Run the standalone test action against the release profile
    #[arg(long)]
    release: bool,

    /// Skip the backup confirmation prompt
    #[arg(long)]
    noconfirm: bool,

    /// Print a JSON run summary to stdout
    #[arg(long)]
    json: bool,

    /// Arguments after `--` are forwarded verbatim to the run action
    #[arg(last = true)]
    binary_args: Vec<String>,
}

impl Cli {
    fn into_request(self) -> ActionRequest {
        let mut request = ActionRequest::new(self.actions);
        request.release = self.release;
        request.no_confirm = self.noconfirm;
        request.binary_args = self.binary_args;
        request
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let emit_json = cli.json;
    let request = cli.into_request();

    let exit_code = match execute(&request, emit_json) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("deckhand: {} ({})", err, err.code());
            err.exit_code()
        }
    };

    ExitCode::from(exit_code_to_u8(exit_code))
}

fn execute(request: &ActionRequest, emit_json: bool) -> deckhand::Result<i32> {
    if request.is_empty() {
        deckhand::log_status!("deckhand", "No actions requested");
        return Ok(0);
    }

    // Toolchain discovery happens exactly once, before any step runs.
    let project_dir = std::env::current_dir()?;
    let toolchain = CargoToolchain::discover(project_dir)?;

    let report = pipeline::run(request, &matrix::default_matrix(), &toolchain)?;

    if emit_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_default()
        );
    }

    Ok(report.exit_code())
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
