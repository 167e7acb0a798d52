use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use thiserror::Error;

use food_ordering::application::checkout::{CheckoutDetails, CheckoutError};
use food_ordering::application::kitchen::{
    next_action, time_ago, AdvanceError, DailyStats, KitchenDashboard,
};
use food_ordering::application::session::{OrderingSession, ResumeOutcome};
use food_ordering::config::{ClientConfig, ConfigError};
use food_ordering::domain::errors::ApiError;
use food_ordering::domain::menu::format_price;
use food_ordering::domain::order::{
    Contact, Fulfillment, Order, OrderStatus, Payment, SettingsUpdate,
};
use food_ordering::domain::status::{project, project_reported, StatusDisplay, StepState};
use food_ordering::infrastructure::http_api::{AdminToken, HttpOrderingApi};
use food_ordering::infrastructure::token_store::FileTokenStore;

/// Order food and run the kitchen against the ordering API.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Show the menu and whether orders are open
    Menu,
    /// Place an order and follow it until it is delivered
    Order(OrderArgs),
    /// Resume following the last order
    Track,
    /// Forget the last order
    New,
    /// Show the kitchen board
    Kitchen,
    /// Move an order to its next status
    Advance {
        /// Order id as shown on the kitchen board
        id: i64,
    },
    /// Today's summary (needs ADMIN_PASSWORD)
    Stats,
    /// Stop taking orders (needs ADMIN_PASSWORD)
    Pause(PrepArgs),
    /// Start taking orders again (needs ADMIN_PASSWORD)
    Open(PrepArgs),
}

#[derive(Debug, PartialEq, Eq, Args)]
struct OrderArgs {
    /// Unit or location the order is delivered to
    unit: String,
    /// Items as <id>[x<qty>][:<notes>], e.g. 3x2:no-onions
    #[arg(required = true, value_name = "ITEM")]
    items: Vec<ItemArg>,
    /// Collect the order instead of having it delivered
    #[arg(long)]
    pickup: bool,
    /// Include cutlery
    #[arg(long)]
    cutlery: bool,
    #[arg(long, conflicts_with = "email")]
    phone: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Pay by GCash with this reference instead of cash
    #[arg(long, value_name = "REFERENCE")]
    gcash: Option<String>,
    /// Delivery notes for the rider
    #[arg(long)]
    notes: Option<String>,
}

impl OrderArgs {
    fn details(&self) -> CheckoutDetails {
        let contact = match (&self.phone, &self.email) {
            (Some(phone), _) => Contact::Phone(phone.clone()),
            (None, Some(email)) => Contact::Email(email.clone()),
            (None, None) => Contact::None,
        };
        CheckoutDetails {
            unit_number: self.unit.clone(),
            contact,
            delivery_notes: self.notes.clone().unwrap_or_default(),
            fulfillment: if self.pickup {
                Fulfillment::Pickup
            } else {
                Fulfillment::Delivery
            },
            payment: match &self.gcash {
                Some(reference) => Payment::Wallet {
                    reference: reference.clone(),
                },
                None => Payment::Cash,
            },
            cutlery: self.cutlery,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Args)]
struct PrepArgs {
    /// New preparation estimate in minutes
    #[arg(long = "prep", value_name = "MINUTES")]
    prep_minutes: Option<u32>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Checkout(#[from] CheckoutError),
    #[error("{0}")]
    Advance(#[from] AdvanceError),
    #[error("ADMIN_PASSWORD must be set for this command")]
    MissingAdminPassword,
}

/// One `<id>[x<qty>][:<notes>]` item argument.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ItemArg {
    id: i64,
    quantity: i64,
    notes: String,
}

impl FromStr for ItemArg {
    type Err = String;

    fn from_str(arg: &str) -> Result<Self, Self::Err> {
        let (head, notes) = arg.split_once(':').unwrap_or((arg, ""));
        let (id, quantity) = head.split_once('x').unwrap_or((head, "1"));
        let id = id
            .parse()
            .map_err(|_| format!("invalid item id in '{arg}'"))?;
        let quantity = quantity
            .parse()
            .map_err(|_| format!("invalid quantity in '{arg}'"))?;
        Ok(ItemArg {
            id,
            quantity,
            notes: notes.to_string(),
        })
    }
}

// ── Output ───────────────────────────────────────────────────────────────────

fn print_status(display: &StatusDisplay) {
    let steps: String = display
        .step_states()
        .iter()
        .map(|state| match state {
            StepState::Completed => "[x]",
            StepState::Active => "[>]",
            StepState::Pending => "[ ]",
        })
        .collect();
    println!(
        "{} {} {} ({}%): {}",
        steps,
        display.icon,
        display.label,
        display.progress_percent(),
        display.message
    );
}

fn print_order(order: &Order) {
    println!("Order #{} for unit {}", order.order_number, order.unit_number);
    for line in &order.items {
        println!(
            "  {}x {:<24} {}",
            line.quantity,
            line.name,
            format_price(&line.line_total())
        );
        if !line.notes.is_empty() {
            println!("     {}", line.notes);
        }
    }
    println!("  Total: {}", format_price(&order.total));
}

/// Prints status changes until the order is delivered or the user hits Ctrl-C.
async fn follow(session: &mut OrderingSession) {
    if let Some(display) = session.status_display() {
        print_status(&display);
    }
    if let Some(tracking) = session.tracking_mut() {
        loop {
            tokio::select! {
                changed = tracking.changed() => match changed {
                    Some(status) => print_status(&project(status)),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    println!("Stopped following; run `track` to resume.");
                    session.end();
                    return;
                }
            }
        }
    }
    if session.can_start_new_order() {
        println!("Order complete. Run `new` to start another one.");
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

async fn admin_login(
    api: &HttpOrderingApi,
    config: &ClientConfig,
) -> Result<AdminToken, CliError> {
    let password = config
        .admin_password
        .as_deref()
        .ok_or(CliError::MissingAdminPassword)?;
    Ok(api.login(password).await?)
}

async fn admin_logout(api: &HttpOrderingApi, token: &AdminToken) {
    if let Err(e) = api.logout(token).await {
        log::warn!("Admin logout failed: {}", e);
    }
}

async fn set_accepting(
    api: &HttpOrderingApi,
    config: &ClientConfig,
    accepting: bool,
    prep: PrepArgs,
) -> Result<(), CliError> {
    let token = admin_login(api, config).await?;
    let update = SettingsUpdate {
        accepting_orders: Some(accepting),
        prep_time_minutes: prep.prep_minutes,
    };
    let settings = api.update_settings(&token, &update).await;
    admin_logout(api, &token).await;
    let settings = settings?;
    println!(
        "Accepting orders: {} (estimate {})",
        settings.accepting_orders,
        settings.estimate_label()
    );
    Ok(())
}

async fn run(command: Command, config: ClientConfig) -> Result<(), CliError> {
    let api = Arc::new(HttpOrderingApi::new(config.api_base_url.clone())?);
    let tokens = Arc::new(FileTokenStore::new(config.token_file.clone()));
    let mut session =
        OrderingSession::new(api.clone(), tokens).with_poll_interval(config.poll_interval);

    match command {
        Command::Menu => {
            session.start().await?;
            if let Some(settings) = session.settings() {
                if settings.accepting_orders {
                    println!("Open for orders, ready in {}", settings.estimate_label());
                } else {
                    println!("Not accepting orders right now");
                }
            }
            let menu = session.menu();
            for category in menu.categories() {
                println!("\n{category}");
                for item in menu.in_category(category) {
                    println!("  [{}] {:<24} {}", item.id, item.name, format_price(&item.price));
                }
            }
        }
        Command::Order(args) => {
            session.start().await?;
            for item in &args.items {
                session.cart_mut().set_quantity(item.id, item.quantity);
                session.cart_mut().set_notes(item.id, item.notes.as_str());
            }
            let order = session.place_order(&args.details()).await?;
            print_order(order);
            if let Some(settings) = session.settings() {
                println!("Estimated time: {}", settings.estimate_label());
            }
            follow(&mut session).await;
        }
        Command::Track => match session.resume().await {
            ResumeOutcome::NoToken => println!("No order to track."),
            ResumeOutcome::Completed => println!("Your last order was delivered."),
            ResumeOutcome::Discarded => println!("Your last order could not be found."),
            ResumeOutcome::Deferred => println!("Could not reach the restaurant; try again later."),
            ResumeOutcome::Tracking => {
                if let Some(order) = session.current_order() {
                    print_order(&order);
                }
                follow(&mut session).await;
            }
        },
        Command::New => {
            session.start_new_order();
            println!("Ready for a new order.");
        }
        Command::Kitchen => {
            let mut dashboard = KitchenDashboard::new(api);
            let board = dashboard.refresh().await?;
            let now = Utc::now();
            for status in [OrderStatus::New, OrderStatus::Preparing, OrderStatus::Ready] {
                let column = board.column(status);
                println!("\n{} ({})", project(status).label, column.len());
                for order in column {
                    println!(
                        "  #{} unit {} · {} · {} → {}",
                        order.order_number,
                        order.unit_number,
                        time_ago(order.created_at, now),
                        format_price(&order.total),
                        next_action(status).unwrap_or_default()
                    );
                }
            }
            println!("\n{} active", board.active_count());
        }
        Command::Advance { id } => {
            let mut dashboard = KitchenDashboard::new(api);
            let order = dashboard.advance(id).await?;
            if let Some(display) = project_reported(&order.status) {
                println!("Order #{} → {}", order.order_number, display.label);
            }
        }
        Command::Stats => {
            let token = admin_login(&api, &config).await?;
            let orders = api.todays_orders(&token).await;
            admin_logout(&api, &token).await;
            let orders = orders?;
            let stats = DailyStats::from_orders(&orders);
            println!("Orders today: {}", stats.total_orders);
            println!("Revenue:      {}", format_price(&stats.revenue));
            println!("Active:       {}", stats.active);
            println!("Delivered:    {}", stats.delivered);
        }
        Command::Pause(prep) => set_accepting(&api, &config, false, prep).await?,
        Command::Open(prep) => set_accepting(&api, &config, true, prep).await?,
    }
    Ok(())
}

async fn execute(command: Command) -> Result<(), CliError> {
    let config = ClientConfig::from_env()?;
    run(command, config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let cli = Cli::parse();

    match execute(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
