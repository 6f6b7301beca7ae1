use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gitlet::areas::lock::RepositoryLock;
use gitlet::areas::repository::Repository;
use gitlet::artifacts::core::{PagerWriter, should_page};
use gitlet::errors::RepositoryError;
use is_terminal::IsTerminal;
use minus::Pager;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "GITLET_LOG";

#[derive(Parser)]
#[command(
    name = "gitlet",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A small content-addressed version control system",
    long_about = "gitlet keeps snapshots of a working directory in a local object store, \
    with a staging area, named branches and three-way merges.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(name = "add", about = "Stage a file for the next commit")]
    Add {
        #[arg(index = 1, help = "The file to stage")]
        path: String,
    },
    #[command(
        name = "commit",
        about = "Record the staged changes",
        long_about = "This command creates a new commit on the active branch from the staging area."
    )]
    Commit {
        #[arg(index = 1, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "rm",
        about = "Unstage a file, or stage its removal and delete it"
    )]
    Rm {
        #[arg(index = 1, help = "The file to remove")]
        path: String,
    },
    #[command(name = "log", about = "Show the history of the active branch")]
    Log,
    #[command(name = "global-log", about = "Show every commit ever made")]
    GlobalLog,
    #[command(name = "find", about = "Print the ids of commits with the given message")]
    Find {
        #[arg(index = 1, help = "The exact commit message")]
        message: String,
    },
    #[command(name = "status", about = "Show branches, staged files and working tree changes")]
    Status,
    #[command(name = "branch", about = "Create a branch at the active head")]
    Branch {
        #[arg(index = 1, help = "The new branch name")]
        name: String,
    },
    #[command(name = "rm-branch", about = "Delete a branch pointer")]
    RmBranch {
        #[arg(index = 1, help = "The branch to delete")]
        name: String,
    },
    #[command(
        name = "checkout",
        about = "Restore a file or switch branches",
        long_about = "`checkout -- <file>` restores a file from the active head, \
        `checkout <commit> -- <file>` restores it from the given commit, \
        and `checkout <branch>` switches to the given branch."
    )]
    Checkout {
        #[arg(index = 1, help = "A branch name, or a commit id when a file follows")]
        target: Option<String>,
        #[arg(index = 2, last = true, help = "The file to restore")]
        file: Option<String>,
    },
    #[command(name = "reset", about = "Move the active branch to a commit")]
    Reset {
        #[arg(index = 1, help = "The full or abbreviated commit id")]
        commit: String,
    },
    #[command(name = "merge", about = "Merge a branch into the active branch")]
    Merge {
        #[arg(index = 1, help = "The branch to merge")]
        branch: String,
    },
}

impl Commands {
    fn is_paged(&self) -> bool {
        matches!(self, Commands::Log | Commands::GlobalLog)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    match run(cli.command).await {
        Err(error) => match RepositoryError::find_in(&error) {
            Some(repository_error) => {
                println!("{repository_error}");
                Ok(())
            }
            None => Err(error),
        },
        ok => ok,
    }
}

async fn run(command: Commands) -> Result<()> {
    let pwd = std::env::current_dir().context("Failed to read the current directory")?;

    if let Commands::Init { path } = &command {
        let root = path.as_ref().map(PathBuf::from).unwrap_or(pwd);
        let mut repository = Repository::new(&root, Box::new(std::io::stdout()))?;

        return repository.init();
    }

    let pager = (command.is_paged() && should_page()).then(Pager::new);
    let writer: Box<dyn std::io::Write> = match &pager {
        Some(pager) => Box::new(PagerWriter::new(pager.clone())),
        None => Box::new(std::io::stdout()),
    };

    let mut repository = Repository::new(Path::new(&pwd), writer)?;
    repository.ensure_initialized()?;
    let _lock = RepositoryLock::acquire(&repository.gitlet_path())?;

    match command {
        Commands::Init { .. } => repository.init()?,
        Commands::Add { path } => repository.add(&path).await?,
        Commands::Commit { message } => repository.commit(&message).await?,
        Commands::Rm { path } => repository.rm(&path).await?,
        Commands::Log => repository.log()?,
        Commands::GlobalLog => repository.global_log()?,
        Commands::Find { message } => repository.find(&message)?,
        Commands::Status => repository.status().await?,
        Commands::Branch { name } => repository.branch(&name)?,
        Commands::RmBranch { name } => repository.rm_branch(&name)?,
        Commands::Checkout { target, file } => match (target, file) {
            (commit, Some(file)) => repository.checkout_file(commit.as_deref(), &file)?,
            (Some(branch), None) => repository.checkout_branch(&branch).await?,
            (None, None) => return Err(RepositoryError::IncorrectOperands.into()),
        },
        Commands::Reset { commit } => repository.reset(&commit).await?,
        Commands::Merge { branch } => repository.merge(&branch).await?,
    }

    if let Some(pager) = pager {
        drop(repository);
        minus::page_all(pager).context("Failed to page output")?;
    }

    Ok(())
}
