use clap::Parser;
use gptt_core::CliOptions;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gptt",
    author,
    version,
    about = "CLI tool for generating GPT prompts for coding projects.",
    long_about = "gptt concatenates project files into a prompt for a language model. \nInput files are always included; optional files only when their file name \nappears in the prompt text. Patterns from .gpt.json are merged with the flags below \nand anything matched by .gitignore is left out.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  gptt --in src/main.rs --optional 'src/**' fix the bug in parser.rs\n  gptt --in 'src/*.ts' --exclude src/generated.ts --out prompt.txt add tests"
)]
pub struct Cli {
    #[arg(
        long,
        value_name = "FILE",
        help = "Write the generated prompt to FILE instead of standard output.",
        help_heading = "Output Control"
    )]
    pub out: Option<PathBuf>,

    #[arg(long = "in", value_name = "PATTERNS", value_delimiter = ',', action = clap::ArgAction::Append, help = "Input files or globs, always included (comma-separated).", help_heading = "Content Filtering")]
    pub input: Vec<String>,

    #[arg(long, value_name = "PATTERNS", value_delimiter = ',', action = clap::ArgAction::Append, help = "Optional files or globs, included when their name appears in the prompt [default: ./**].", help_heading = "Content Filtering")]
    pub optional: Option<Vec<String>>,

    #[arg(long, value_name = "PATTERNS", value_delimiter = ',', action = clap::ArgAction::Append, help = "Files or globs to leave out (comma-separated).", help_heading = "Content Filtering")]
    pub exclude: Vec<String>,

    #[arg(
        short = 'C',
        long,
        help = "Resolve patterns, .gpt.json and .gitignore against PATH (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(short, long, help = "Silence log messages and the save report.")]
    pub quiet: bool,

    #[arg(value_name = "PROMPT", help = "The request for the model; words are joined with spaces.")]
    pub prompt: Vec<String>,
}

impl Cli {
    pub fn user_prompt(&self) -> String {
        self.prompt.join(" ")
    }

    pub fn cli_options(&self) -> CliOptions {
        CliOptions {
            out: self.out.clone(),
            input: self.input.clone(),
            optional: self.optional.clone(),
            exclude: self.exclude.clone(),
        }
    }
}
