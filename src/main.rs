use clap::{Parser as ClapParser, Subcommand};
use elastic_query::{
    cli::{self, CliError, CompileOptions, CompileOutput},
    output::to_json,
};
use std::{
    fs,
    io::{self, Read},
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "esql")]
#[command(about = "esql - Compile JSON query documents into parameterised SQL")]
#[command(version)]
struct Cli {
    /// Log compilation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a query document
    Compile {
        /// Path to the query document (reads from stdin if omitted or '-')
        file: Option<String>,

        /// Print the JSON request body instead of SQL and parameters
        #[arg(short, long)]
        body: bool,

        /// Only validate the document, don't compile
        #[arg(long)]
        validate_only: bool,

        /// Leave ordering out of the generated SQL
        #[arg(long)]
        no_order_by: bool,

        /// Separator replacing '.' in nested dynamic aliases
        #[arg(long)]
        dot_separator: Option<String>,
    },

    /// List documentation topics
    Docs,

    /// Show documentation for a specific topic
    Doc {
        /// Topic name (use 'esql docs' to list topics)
        topic: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Compile {
            file,
            body,
            validate_only,
            no_order_by,
            dot_separator,
        } => run_compile(file, body, validate_only, no_order_by, dot_separator),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { topic } => cli::get_doc_topic(&topic).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("elastic_query=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_compile(
    file: Option<String>,
    body: bool,
    validate_only: bool,
    no_order_by: bool,
    dot_separator: Option<String>,
) -> Result<(), CliError> {
    let input = match file.as_deref() {
        Some("-") | None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        Some("-") | None => None,
        Some(path) => Some(fs::read_to_string(path)?),
    };

    let options = CompileOptions {
        input,
        validate_only,
        no_order_by,
        dot_separator,
    };

    match cli::execute_compile(&options)? {
        CompileOutput::Valid => println!("Document is valid"),
        CompileOutput::Compiled(compiled) if body => {
            println!("{}", compiled.to_request_body_pretty());
        }
        CompileOutput::Compiled(compiled) => {
            println!("{}", compiled.sql);
            let params: Vec<_> = compiled.params.iter().map(to_json).collect();
            println!("{}", serde_json::to_string(&params)?);
        }
    }
    Ok(())
}
