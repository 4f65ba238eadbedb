//! sprig CLI - single-node version control command line interface

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sprig::ops::{
    checkout_file, checkout_file_from_commit, commit, create_branch, find, global_log, log, merge,
    remove_branch, reset, stage_add, stage_remove, status, switch_branch,
};
use sprig::{Error, Repo};

#[derive(Parser)]
#[command(name = "sprig")]
#[command(about = "single-node version control - snapshots, branches and three-way merge")]
#[command(version)]
struct Cli {
    /// working tree of the repository
    #[arg(short = 'C', long, default_value = ".", env = "SPRIG_DIR")]
    repo: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// initialize a new repository in the working tree
    Init,

    /// stage a file for the next commit
    Add {
        /// path relative to the working tree
        file: String,
    },

    /// stage a file for removal and delete it if tracked
    Rm {
        /// path relative to the working tree
        file: String,
    },

    /// record the staged changes
    Commit {
        /// commit message
        message: String,
    },

    /// show history from HEAD along first parents
    Log,

    /// show every commit ever made
    GlobalLog,

    /// print ids of commits with exactly this message
    Find {
        /// commit message to match
        message: String,
    },

    /// show branches, staged files and working tree changes
    Status,

    /// create a branch at the current commit
    Branch {
        /// branch name
        name: String,
    },

    /// delete a branch pointer
    RmBranch {
        /// branch name
        name: String,
    },

    /// switch branches, or restore a file with `[commit] -- <file>`
    Checkout {
        /// branch to switch to, or commit to restore from
        target: Option<String>,

        /// file to restore
        #[arg(last = true)]
        file: Option<String>,
    },

    /// move the current branch to a commit and replay its files
    Reset {
        /// full or abbreviated commit id
        commit: String,
    },

    /// merge a branch into the current one
    Merge {
        /// branch to merge
        branch: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> sprig::Result<()> {
    match cli.command {
        Commands::Init => {
            Repo::init(&cli.repo)?;
            Ok(())
        }
        command => dispatch(&Repo::open(&cli.repo)?, command),
    }
}

fn dispatch(repo: &Repo, command: Commands) -> sprig::Result<()> {
    match command {
        Commands::Init => return Err(Error::RepoExists(repo.work_tree().to_path_buf())),

        Commands::Add { file } => stage_add(repo, &file)?,

        Commands::Rm { file } => stage_remove(repo, &file)?,

        Commands::Commit { message } => {
            commit(repo, &message)?;
        }

        Commands::Log => {
            for entry in log(repo)? {
                print!("{}", entry);
            }
        }

        Commands::GlobalLog => {
            for entry in global_log(repo)? {
                print!("{}", entry);
            }
        }

        Commands::Find { message } => {
            for hash in find(repo, &message)? {
                println!("{}", hash);
            }
        }

        Commands::Status => print!("{}", status(repo)?),

        Commands::Branch { name } => create_branch(repo, &name)?,

        Commands::RmBranch { name } => remove_branch(repo, &name)?,

        Commands::Checkout { target, file } => match (target, file) {
            (Some(branch), None) => switch_branch(repo, &branch)?,
            (None, Some(file)) => checkout_file(repo, &file)?,
            (Some(commit_id), Some(file)) => checkout_file_from_commit(repo, &commit_id, &file)?,
            (None, None) => return Err(Error::IncorrectOperands),
        },

        Commands::Reset { commit } => reset(repo, &commit)?,

        Commands::Merge { branch } => {
            let outcome = merge(repo, &branch)?;
            if let Some(message) = outcome.message() {
                println!("{}", message);
            }
        }
    }

    Ok(())
}
