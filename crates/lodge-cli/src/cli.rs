use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lodge", about = "Lodge: room management for rental units", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a lodge.toml config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the storage directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List rooms
    List(ListArgs),
    /// Show one room
    Show(IdArgs),
    /// Add a room
    Add(AddArgs),
    /// Edit room details
    Edit(EditArgs),
    /// Set a room's status (empty, occupied, or cleaning)
    Status(StatusArgs),
    /// Let a room to a tenant
    Assign(AssignArgs),
    /// Vacate a room; it moves to cleaning
    Vacate(IdArgs),
    /// Delete a room
    Remove(IdArgs),
    /// Show room counts by status
    Summary,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only rooms with this status
    #[arg(short, long)]
    pub status: Option<String>,
}

#[derive(Args)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(short, long)]
    pub number: String,
    #[arg(short, long)]
    pub price: f64,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long = "amenity")]
    pub amenities: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: String,
    #[arg(short, long)]
    pub number: Option<String>,
    #[arg(short, long)]
    pub price: Option<f64>,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Replace the amenity list
    #[arg(short, long = "amenity")]
    pub amenities: Vec<String>,
    /// Clear all amenities
    #[arg(long, conflicts_with = "amenities")]
    pub clear_amenities: bool,
}

#[derive(Args)]
pub struct StatusArgs {
    pub id: String,
    pub status: String,
}

#[derive(Args)]
pub struct AssignArgs {
    pub id: String,
    pub tenant: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add() {
        let cli = Cli::parse_from([
            "lodge", "add", "--number", "101", "--price", "1500000", "-a", "wifi", "-a", "fan",
        ]);
        match cli.command {
            Command::Add(args) => {
                assert_eq!(args.number, "101");
                assert_eq!(args.price, 1_500_000.0);
                assert_eq!(args.amenities, vec!["wifi", "fan"]);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["lodge", "list", "--format", "json", "--data-dir", "/tmp/x"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }
}
