use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use classroom_lite::config::{
    parse_grade_spec, parse_names, parse_students, EngineConfig, GradeSpec, OutputFormat,
    SimulationConfig,
};
use classroom_lite::notify::{ConsoleSink, OutputSink, SinkObserver, TracingSink};
use classroom_lite::roster::ClassReport;
use classroom_lite::shutdown::install_shutdown_handler;
use classroom_lite::simulation::Simulation;

#[derive(Parser, Debug)]
#[command(name = "classroom-lite")]
#[command(version)]
#[command(about = "Simulate a class working through its assignments")]
#[command(propagate_version = true)]
struct Args {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run a class through release, work, reminders and grading
    Simulate(SimulateArgs),
}

// =============================================================================
// Simulate Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Students to enrol (comma-separated, format: "Full Name:email")
    /// Example: "Ada Lovelace:ada@example.com,Alan Turing:alan@example.com"
    #[arg(long)]
    students: String,

    /// Assignments to release to everyone (comma-separated)
    #[arg(long, default_value = "")]
    assignments: String,

    /// Assignments every student starts working on (comma-separated)
    #[arg(long, default_value = "")]
    work: String,

    /// Manual grade, format "Full Name:assignment:grade" (repeatable).
    /// Non-numeric grades are ignored.
    #[arg(long = "grade")]
    grades: Vec<String>,

    /// Assignment to send a final reminder for
    #[arg(long)]
    remind: Option<String>,

    /// Seed for reproducible auto-grades
    #[arg(long)]
    seed: Option<u64>,

    /// Delay before a working assignment is submitted automatically
    #[arg(long, default_value = "500")]
    submit_delay_ms: u64,

    /// Delay before a submitted assignment is graded automatically
    #[arg(long, default_value = "500")]
    grade_delay_ms: u64,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value = "table")]
    output: OutputFormat,
}

impl SimulateArgs {
    fn into_config(self) -> classroom_lite::Result<SimulationConfig> {
        let grades = self
            .grades
            .iter()
            .map(|g| parse_grade_spec(g))
            .collect::<classroom_lite::Result<Vec<GradeSpec>>>()?;

        Ok(SimulationConfig {
            engine: EngineConfig::new(self.submit_delay_ms, self.grade_delay_ms),
            students: parse_students(&self.students)?,
            assignments: parse_names(&self.assignments),
            work: parse_names(&self.work),
            grades,
            remind: self.remind,
            seed: self.seed,
            output: self.output,
        })
    }
}

// =============================================================================
// Output
// =============================================================================

fn print_report(
    report: &ClassReport,
    assignments: &[String],
    output_format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Table => {
            if report.students.is_empty() {
                println!("No students enrolled.");
                return Ok(());
            }

            // Include assignments that were only touched through --work or --grade
            let mut columns: Vec<String> = assignments.to_vec();
            for student in &report.students {
                for assignment in &student.assignments {
                    if !columns.contains(&assignment.name) {
                        columns.push(assignment.name.clone());
                    }
                }
            }

            print!("{:<24} {:<8}", "STUDENT", "GRADE");
            for column in &columns {
                print!(" {:<16}", column);
            }
            println!();
            println!("{}", "-".repeat(33 + 17 * columns.len()));

            for student in &report.students {
                let grade = student
                    .overall_grade
                    .map(|g| format!("{:.1}", g))
                    .unwrap_or_else(|| "-".to_string());
                print!("{:<24} {:<8}", student.full_name, grade);
                for column in &columns {
                    print!(" {:<16}", student.cell(column));
                }
                println!();
            }

            println!();
            match report.class_average {
                Some(avg) => println!("Class average: {:.1}", avg),
                None => println!("Class average: -"),
            }
            if !report.outstanding.is_empty() {
                println!("Outstanding:   {}", report.outstanding.join(", "));
            }
        }
    }
    Ok(())
}

// =============================================================================
// Simulate Implementation
// =============================================================================

async fn run_simulate(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.into_config()?;
    let output_format = config.output;
    let assignments = config.assignments.clone();

    // Keep stdout clean for JSON; notifications then only go to the log
    let sink: Arc<dyn OutputSink> = match output_format {
        OutputFormat::Table => Arc::new(ConsoleSink),
        OutputFormat::Json => Arc::new(TracingSink),
    };

    tracing::info!(
        students = config.students.len(),
        assignments = ?config.assignments,
        work = ?config.work,
        remind = ?config.remind,
        seed = ?config.seed,
        submit_delay_ms = config.engine.auto_submit_delay_ms,
        grade_delay_ms = config.engine.auto_grade_delay_ms,
        "Starting simulation"
    );

    let observer = Arc::new(SinkObserver::new(sink.clone()));
    let simulation = Simulation::new(config, observer, sink)?;
    let shutdown = install_shutdown_handler();

    let report = simulation.run(shutdown).await?;
    print_report(&report, &assignments, output_format)
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Simulate(simulate_args) => {
            run_simulate(simulate_args).await?;
        }
    }

    Ok(())
}
