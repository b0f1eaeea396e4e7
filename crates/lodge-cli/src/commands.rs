use anyhow::{bail, Context};
use colored::Colorize;
use lodge_sdk::{
    open_store, LodgeConfig, NewRoom, RecordId, Room, RoomPatch, RoomStatus, RoomStore,
};
use serde::Serialize;
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let store = open_store(&config)
        .await
        .context("failed to open room store")?;
    if let Some(error) = store.error() {
        bail!("failed to load rooms: {error}");
    }
    let out = Output(cli.format);

    match cli.command {
        Command::List(args) => cmd_list(&store, out, args),
        Command::Show(args) => cmd_show(&store, out, args).await,
        Command::Add(args) => cmd_add(&store, out, args).await,
        Command::Edit(args) => cmd_edit(&store, out, args).await,
        Command::Status(args) => cmd_status(&store, out, args).await,
        Command::Assign(args) => cmd_assign(&store, out, args).await,
        Command::Vacate(args) => cmd_vacate(&store, out, args).await,
        Command::Remove(args) => cmd_remove(&store, out, args).await,
        Command::Summary => cmd_summary(&store, out),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<LodgeConfig> {
    let mut config = match &cli.config {
        Some(path) => LodgeConfig::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => LodgeConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    debug!(?config, "resolved configuration");
    Ok(config)
}

#[derive(Clone, Copy)]
struct Output(OutputFormat);

impl Output {
    fn json(&self) -> bool {
        self.0 == OutputFormat::Json
    }

    fn print_json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn room(&self, room: &Room) -> anyhow::Result<()> {
        if self.json() {
            return self.print_json(room);
        }
        println!("{} {}", "Room".bold(), room.room_number.bold());
        println!("  id:        {}", room.meta.id.as_str().cyan());
        println!("  status:    {}", paint_status(room.status));
        println!("  price:     {}", format_price(room.price));
        if let Some(tenant) = &room.current_tenant_id {
            println!("  tenant:    {}", tenant.as_str().yellow());
        }
        if !room.description.is_empty() {
            println!("  about:     {}", room.description);
        }
        if !room.amenities.is_empty() {
            println!("  amenities: {}", room.amenities.join(", "));
        }
        println!("  updated:   {}", room.meta.updated_at.format("%Y-%m-%d %H:%M"));
        Ok(())
    }
}

fn cmd_list(store: &RoomStore, out: Output, args: ListArgs) -> anyhow::Result<()> {
    let rooms = match args.status {
        Some(status) => store.by_status(parse_status(&status)?),
        None => store.items(),
    };
    if out.json() {
        return out.print_json(&rooms);
    }
    if rooms.is_empty() {
        println!("No rooms.");
        return Ok(());
    }
    for room in &rooms {
        println!(
            "{:<10} {:<10} {:>14}  {}",
            room.room_number.bold(),
            paint_status(room.status),
            format_price(room.price),
            room.meta.id.short_id().dimmed(),
        );
    }
    Ok(())
}

async fn cmd_show(store: &RoomStore, out: Output, args: IdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    let room = store.get(&id).await?.with_context(|| not_found(&id))?;
    out.room(&room)
}

async fn cmd_add(store: &RoomStore, out: Output, args: AddArgs) -> anyhow::Result<()> {
    let draft = NewRoom::new(args.number, args.price)
        .with_description(args.description.unwrap_or_default())
        .with_amenities(args.amenities);
    let room = store.add(draft).await?;
    if !out.json() {
        println!("{} Added room {}", "✓".green().bold(), room.room_number.bold());
    }
    out.room(&room)
}

async fn cmd_edit(store: &RoomStore, out: Output, args: EditArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    let amenities = if args.clear_amenities {
        Some(Vec::new())
    } else if args.amenities.is_empty() {
        None
    } else {
        Some(args.amenities)
    };
    let patch = RoomPatch {
        room_number: args.number,
        price: args.price,
        description: args.description,
        amenities,
    };
    if patch.is_empty() {
        bail!("nothing to change; pass --number, --price, --description, or --amenity");
    }
    let room = store.edit(&id, patch).await?.with_context(|| not_found(&id))?;
    out.room(&room)
}

async fn cmd_status(store: &RoomStore, out: Output, args: StatusArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    let room = store
        .set_status_named(&id, &args.status)
        .await?
        .with_context(|| not_found(&id))?;
    out.room(&room)
}

async fn cmd_assign(store: &RoomStore, out: Output, args: AssignArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    let tenant = parse_id(&args.tenant)?;
    let room = store
        .assign_tenant(&id, tenant)
        .await?
        .with_context(|| not_found(&id))?;
    out.room(&room)
}

async fn cmd_vacate(store: &RoomStore, out: Output, args: IdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    let room = store
        .remove_tenant(&id)
        .await?
        .with_context(|| not_found(&id))?;
    out.room(&room)
}

async fn cmd_remove(store: &RoomStore, out: Output, args: IdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    if !store.remove(&id).await? {
        bail!(not_found(&id));
    }
    if out.json() {
        return out.print_json(&serde_json::json!({ "removed": id }));
    }
    println!("{} Removed room {}", "✓".green().bold(), id.as_str().cyan());
    Ok(())
}

fn cmd_summary(store: &RoomStore, out: Output) -> anyhow::Result<()> {
    let counts = store.status_counts();
    if out.json() {
        return out.print_json(&counts);
    }
    println!("{} rooms", counts.total().to_string().bold());
    for status in RoomStatus::ALL {
        println!("  {:<10} {}", paint_status(status), counts.get(status));
    }
    println!("  occupancy  {:.0}%", counts.occupancy() * 100.0);
    Ok(())
}

fn parse_id(raw: &str) -> anyhow::Result<RecordId> {
    raw.parse().with_context(|| format!("invalid id {raw:?}"))
}

fn parse_status(raw: &str) -> anyhow::Result<RoomStatus> {
    Ok(raw.parse()?)
}

fn not_found(id: &RecordId) -> String {
    format!("room {id} not found")
}

fn paint_status(status: RoomStatus) -> colored::ColoredString {
    let label = format!("{:<8}", status.as_str());
    match status {
        RoomStatus::Empty => label.green(),
        RoomStatus::Occupied => label.yellow(),
        RoomStatus::Cleaning => label.blue(),
    }
}

/// Price with thousands separators, e.g. `1,500,000`.
fn format_price(price: f64) -> String {
    let total_cents = (price * 100.0).round() as u64;
    let whole = (total_cents / 100).to_string();
    let cents = total_cents % 100;
    let mut out = String::with_capacity(whole.len() + whole.len() / 3 + 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if cents > 0 {
        out.push_str(&format!(".{cents:02}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(1_500_000.0), "1,500,000");
        assert_eq!(format_price(999.0), "999");
        assert_eq!(format_price(1000.5), "1,000.50");
        assert_eq!(format_price(1000.05), "1,000.05");
        assert_eq!(format_price(1000.999), "1,001");
        assert_eq!(format_price(999.996), "1,000");
    }

    #[test]
    fn status_parsing_errors_are_reported() {
        assert!(parse_status("cleaning").is_ok());
        let err = parse_status("unknown").unwrap_err();
        assert!(err.to_string().contains("invalid room status"));
    }

    #[tokio::test]
    async fn commands_run_against_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();
        let run = |args: &[&str]| {
            let mut argv = vec!["lodge", "--data-dir", data_dir];
            argv.extend_from_slice(args);
            Cli::parse_from(argv)
        };

        run_command(run(&["add", "--number", "101", "--price", "1000"]))
            .await
            .unwrap();
        run_command(run(&["summary"])).await.unwrap();

        let mut config = LodgeConfig::default();
        config.storage.data_dir = dir.path().to_path_buf();
        let store = open_store(&config).await.unwrap();
        let room = store.items().pop().unwrap();
        let id = room.meta.id.as_str();

        run_command(run(&["assign", id, "tenant-1"])).await.unwrap();
        run_command(run(&["status", id, "empty"])).await.unwrap();
        assert!(run_command(run(&["status", id, "unknown"])).await.is_err());
        let room = store.get(&room.meta.id).await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Empty);
        assert_eq!(room.current_tenant_id.as_ref().map(|t| t.as_str()), Some("tenant-1"));

        run_command(run(&["vacate", id])).await.unwrap();
        run_command(run(&["remove", id])).await.unwrap();
        assert!(run_command(run(&["show", id])).await.is_err());
    }
}
