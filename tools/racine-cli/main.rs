use clap::Parser;
use racine::prelude::*;
use std::io::{self, Write};
use std::time::Instant;

/// A tree-structured business-rule evaluation and explanation CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the dataset JSON file (nodes, capacities, tables, templates, submissions)
    dataset_path: Option<String>,
    /// The submission whose values feed the evaluation
    submission_id: Option<String>,
    /// Capacity references to evaluate, e.g. `formula:f-1` or a bare node id
    refs: Vec<String>,

    /// Evaluate every capacity-bearing node under this subtree root instead
    #[arg(short, long)]
    subtree: Option<String>,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.human {
        run_interactive();
    } else {
        run_non_interactive(cli);
    }
}

fn run_evaluation(
    dataset_path: String,
    submission_id: String,
    refs: Vec<String>,
    subtree: Option<String>,
) {
    let total_start = Instant::now();

    // --- 1. Dataset Loading ---
    let load_start = Instant::now();
    let dataset = Dataset::from_file(&dataset_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load dataset from '{}': {}",
            &dataset_path, e
        ))
    });
    let load_duration = load_start.elapsed();

    let engine = Engine::over(&dataset);

    // --- 2. Evaluation ---
    println!("\nEvaluating submission '{}'...", submission_id);
    let eval_start = Instant::now();

    let outcomes: Vec<(String, Evaluation)> = if let Some(root) = subtree {
        engine.evaluate_subtree(&root, &submission_id)
    } else {
        refs.iter()
            .map(|r| (r.clone(), engine.evaluate_ref(r, &submission_id)))
            .collect()
    };
    let eval_duration = eval_start.elapsed();

    // --- 3. Results ---
    println!("\nEvaluation Finished!");
    let mut fault_total = 0;
    for (name, evaluation) in &outcomes {
        match evaluation.result {
            Some(n) => println!("  -> {}: {}", name, n),
            None => println!("  -> {}: (no result)", name),
        }
        println!("     {}", evaluation.rendered());
        fault_total += evaluation.faults.len();
        for fault in &evaluation.faults {
            println!("     fault: {}", fault);
        }
    }

    let total_duration = total_start.elapsed();
    println!("\n--- Dataset Summary ---");
    println!("Nodes:       {}", dataset.nodes.len());
    println!("Formulas:    {}", dataset.formulas.len());
    println!("Conditions:  {}", dataset.conditions.len());
    println!("Tables:      {}", dataset.tables.len());
    println!("Templates:   {}", dataset.templates.len());

    println!("\n--- Performance Summary ---");
    println!("Dataset Loading:  {:?}", load_duration);
    println!("Evaluation:       {:?}", eval_duration);
    println!("-----------------------------");
    println!("Total Execution:  {:?}", total_duration);
    println!("Evaluations:      {}", outcomes.len());
    println!("Faults:           {}", fault_total);
    println!();
}

/// Runs the CLI in non-interactive mode, taking all arguments from the command line.
fn run_non_interactive(cli: Cli) {
    let dataset_path = cli.dataset_path.unwrap_or_else(|| {
        exit_with_error("Dataset path is required in non-interactive mode.");
    });
    let submission_id = cli.submission_id.unwrap_or_else(|| {
        exit_with_error("Submission id is required in non-interactive mode.");
    });
    if cli.refs.is_empty() && cli.subtree.is_none() {
        exit_with_error("Provide at least one capacity reference, or --subtree <node-id>.");
    }

    run_evaluation(dataset_path, submission_id, cli.refs, cli.subtree);
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive() {
    println!("--- Racine Interactive Mode ---");

    let dataset_path = prompt_for_input("Enter dataset path", Some("data/dataset.json"));
    let submission_id = prompt_for_input("Enter submission id", Some("submission-1"));
    let refs_line = prompt_for_input(
        "Enter capacity refs, space-separated (empty for subtree mode)",
        None,
    );

    let refs: Vec<String> = refs_line.split_whitespace().map(str::to_string).collect();
    let subtree = if refs.is_empty() {
        Some(prompt_for_input("Enter subtree root node id", Some("root")))
    } else {
        None
    };

    run_evaluation(dataset_path, submission_id, refs, subtree);
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    io::stdout().flush().unwrap();

    io::stdin()
        .read_line(&mut line)
        .expect("Failed to read line");
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
