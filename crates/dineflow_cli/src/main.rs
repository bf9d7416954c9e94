//! Admin and kitchen shell over `dineflow_core`.
//!
//! # Responsibility
//! - Check core linkage (`ping`, `version`).
//! - List restaurants and browse menus.
//! - List, advance and cancel kitchen orders, and watch one order's status.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dineflow_core::{
    default_log_level, init_logging, normalize_poll_interval, open_db, step_of, MenuFilter, Order,
    OrderListQuery, OrderStatus, PollEvent, PriceSort, SqliteMenuService, SqliteOrderService,
    SqliteRestaurantService, StatusPoller,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "dineflow")]
#[command(about = "Admin and kitchen tools for DineFlow")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, default_value = "dineflow.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rotating log files; logging is off when unset
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// `debug` in debug builds, `info` in release builds
    #[arg(long, global = true, default_value_t = default_log_level().to_string())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Checks that the core library is linked
    Ping,
    /// Prints the core version
    Version,
    /// Lists restaurants sorted by name
    Restaurants,
    /// Browses a restaurant's menu
    Menu(MenuArgs),
    #[command(subcommand)]
    Kitchen(KitchenCommand),
    /// Polls one order until it reaches a terminal status
    Watch {
        order_id: Uuid,
        /// Seconds between polls, clamped to 5..=30
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct MenuArgs {
    restaurant_id: Uuid,
    #[arg(long)]
    category: Option<Uuid>,
    /// Case-insensitive match on name or description
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    tag: Option<String>,
    #[arg(long)]
    available_only: bool,
    #[arg(long, value_enum)]
    sort: Option<SortArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for PriceSort {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Asc => PriceSort::Ascending,
            SortArg::Desc => PriceSort::Descending,
        }
    }
}

#[derive(Subcommand, Debug)]
enum KitchenCommand {
    /// Lists orders, newest first
    List {
        #[arg(long)]
        restaurant: Option<Uuid>,
        /// Status label such as `PAID` (case-insensitive)
        #[arg(long)]
        status: Option<OrderStatus>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Moves an order forward to `status`
    Advance { order_id: Uuid, status: OrderStatus },
    Cancel { order_id: Uuid },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(&cli.log_level, log_dir).context("failed to start logging")?;
    }

    match cli.command {
        Command::Ping => println!("dineflow_core ping={}", dineflow_core::ping()),
        Command::Version => println!("dineflow_core version={}", dineflow_core::core_version()),
        Command::Restaurants => list_restaurants(&cli.db)?,
        Command::Menu(args) => browse_menu(&cli.db, args)?,
        Command::Kitchen(command) => kitchen(&cli.db, command)?,
        Command::Watch { order_id, interval } => watch(&cli.db, order_id, interval)?,
    }
    Ok(())
}

fn list_restaurants(db: &Path) -> Result<()> {
    let conn = open_db(db)?;
    let restaurants = SqliteRestaurantService::from_connection(&conn)?.list_restaurants()?;
    for restaurant in restaurants {
        let state = if restaurant.is_open { "open" } else { "closed" };
        println!("{}  {:<6}  {}", restaurant.id, state, restaurant.name);
    }
    Ok(())
}

fn browse_menu(db: &Path, args: MenuArgs) -> Result<()> {
    let filter = MenuFilter {
        category: args.category,
        search: args.search,
        tag: args.tag,
        available_only: args.available_only,
        sort: args.sort.map(PriceSort::from).unwrap_or_default(),
    };

    let conn = open_db(db)?;
    let items = SqliteMenuService::from_connection(&conn)?.browse(args.restaurant_id, &filter)?;
    if items.is_empty() {
        println!("no matching items");
    }
    for item in items {
        let flag = if item.is_available { "" } else { "  (unavailable)" };
        println!("{}  {:>8}  {}{flag}", item.id, item.price.to_string(), item.name);
    }
    Ok(())
}

fn kitchen(db: &Path, command: KitchenCommand) -> Result<()> {
    let conn = open_db(db)?;
    let orders = SqliteOrderService::from_connection(&conn)?;

    match command {
        KitchenCommand::List {
            restaurant,
            status,
            limit,
        } => {
            let query = OrderListQuery {
                restaurant_id: restaurant,
                status,
                limit,
                offset: 0,
            };
            for order in orders.list_by_status(&query)? {
                println!("{}", order_row(&order));
            }
        }
        KitchenCommand::Advance { order_id, status } => {
            if status == OrderStatus::Cancelled {
                bail!("use `kitchen cancel` to cancel an order");
            }
            let order = orders.update_status(order_id, status)?;
            println!("{}", order_row(&order));
        }
        KitchenCommand::Cancel { order_id } => {
            let order = orders.cancel(order_id)?;
            println!("{}", order_row(&order));
        }
    }
    Ok(())
}

fn order_row(order: &Order) -> String {
    format!(
        "{}  {:<16} step={:>2}  items={:>3}  total={}",
        order.id,
        order.status.as_str(),
        step_of(order.status).as_index(),
        order.lines.iter().map(|line| line.quantity).sum::<u32>(),
        order.totals.total
    )
}

fn watch(db: &Path, order_id: Uuid, interval: Option<u64>) -> Result<()> {
    let conn = open_db(db)?;
    // Fail fast on an unknown order instead of polling it forever.
    SqliteOrderService::from_connection(&conn)?.get_order(order_id)?;

    let (tx, rx) = mpsc::channel();
    let handle = StatusPoller::spawn(
        normalize_poll_interval(interval),
        move || -> Result<OrderStatus, String> {
            let orders = SqliteOrderService::from_connection(&conn).map_err(|err| err.to_string())?;
            orders
                .get_order(order_id)
                .map(|order| order.status)
                .map_err(|err| err.to_string())
        },
        move |event| {
            // The receiver only goes away once main is done watching.
            let _ = tx.send(event);
        },
    )
    .context("failed to start status poller")?;

    for event in rx {
        match event {
            PollEvent::Changed(status) => {
                println!("{order_id}  {status}  step={}", step_of(status).as_index());
            }
            PollEvent::Failed(message) => eprintln!("poll failed: {message}"),
        }
    }
    handle.stop();
    Ok(())
}
