use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use skyway_api::countdown::{spawn_countdown, TICK};
use skyway_api::reports::report_filename;
use skyway_api::socket::refresh::refresh_targets;
use skyway_api::socket::{
    ConnectionState, RefreshTarget, SocketClient, SocketIdentity, SocketSettings, WsConnector,
};
use skyway_api::{ApiClient, ApiError};
use skyway_core::access::{guard, Access, SessionView};
use skyway_core::booking::{BookingCategory, CategorizedBookings};
use skyway_core::countdown::CountdownDisplay;
use skyway_core::search::FlightTab;
use skyway_core::{
    rating, reference, validation, AppRoute, Flight, FlightCountdown, FlightQuery, FlightStatus,
    Page, ReportType, Role, ViewState,
};
use skyway_store::{Config, FileSessionStore, SessionStore, UserCache};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "skyway", version, about = "Client for the Skyway flight operations platform")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SKYWAY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List flights
    Flights {
        #[arg(long)]
        tab: Option<FlightTab>,
        #[arg(long)]
        status: Option<FlightStatus>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        per_page: u32,
        #[arg(long)]
        airline: Option<i64>,
        #[arg(long)]
        from: Option<i64>,
        #[arg(long)]
        to: Option<i64>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show one flight with its ratings
    Flight { id: i64 },
    Book { flight_id: i64 },
    Bookings,
    CancelBooking { booking_id: i64 },
    /// Rate a completed flight (1-5)
    Rate { flight_id: i64, score: u8 },
    Approve { flight_id: i64 },
    Reject {
        flight_id: i64,
        #[arg(long)]
        reason: String,
    },
    CancelFlight { flight_id: i64 },
    /// Generate a PDF report
    Report {
        #[arg(required = true)]
        types: Vec<ReportType>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    Deposit { amount: String },
    Withdraw { amount: String },
    /// Upload a profile picture
    Avatar { path: PathBuf },
    /// Listen for live flight updates
    Watch {
        /// Flight rooms to join
        #[arg(long = "flight")]
        flights: Vec<i64>,
        /// Show a landing countdown for an in-progress flight
        #[arg(long)]
        countdown: Option<i64>,
    },
}

impl Command {
    fn route(&self) -> AppRoute {
        match self {
            Command::Login { .. } | Command::Logout => AppRoute::Login,
            Command::Whoami
            | Command::Deposit { .. }
            | Command::Withdraw { .. }
            | Command::Avatar { .. } => AppRoute::Account,
            Command::Flights { .. }
            | Command::Flight { .. }
            | Command::Book { .. }
            | Command::Rate { .. } => AppRoute::Flights,
            Command::Bookings | Command::CancelBooking { .. } => AppRoute::Bookings,
            Command::Approve { .. } | Command::Reject { .. } => AppRoute::AdminDashboard,
            Command::CancelFlight { .. } => AppRoute::ManagerDashboard,
            Command::Report { .. } => AppRoute::Reports,
            Command::Watch { .. } => AppRoute::Home,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyway_api=debug,skyway_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;
    tracing::debug!("Using API at {}", config.api.root_url());

    let sessions: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&config.session.path));
    let user_cache = Arc::new(UserCache::new(config.session.user_cache_ttl()));
    let client = ApiClient::new(&config.api, sessions, user_cache)?;

    check_access(&client, cli.command.route()).await?;
    run(&client, &config, cli.command).await
}

/// Role-gated commands check against the cached (or refetched) user; the
/// rest only need a stored session.
async fn check_access(client: &ApiClient, route: AppRoute) -> Result<()> {
    let session = match client.session().await? {
        Some(_) if route.required_role().is_some() => {
            SessionView::Authenticated(client.users().current_user().await?.role)
        }
        Some(session) => SessionView::Authenticated(session.user.role),
        None => SessionView::Anonymous,
    };

    match guard(route, session) {
        Access::Allow => Ok(()),
        Access::Redirect(path) if path == skyway_core::access::LOGIN_PATH => {
            bail!("Not signed in. Run `skyway login` first.")
        }
        Access::Redirect(_) => bail!("Your role is not allowed to use {}", route.path()),
        Access::Pending => bail!("Session is still loading"),
    }
}

async fn run(client: &ApiClient, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = client.auth().login(&email, &password).await?;
            println!("Signed in as {} ({})", user.full_name(), user.role);
        }
        Command::Logout => {
            client.auth().logout().await?;
            println!("Signed out");
        }
        Command::Whoami => {
            let user = client.users().refresh_current().await?;
            println!("{} <{}>", user.full_name(), user.email);
            println!("role:    {}", user.role);
            println!("balance: {:.2}", user.account_balance);
        }
        Command::Flights {
            tab,
            status,
            page,
            per_page,
            airline,
            from,
            to,
            min_price,
            max_price,
            date,
        } => {
            let query = FlightQuery {
                status,
                airline_id: airline,
                departure_airport_id: from,
                arrival_airport_id: to,
                min_price,
                max_price,
                departure_date: date,
                ..FlightQuery::page(page, per_page)
            };
            let flights = match tab {
                Some(tab) => client.flights().list_by_tab(tab, &query).await?,
                None => client.flights().list(&query).await?,
            };
            print_flight_page(&flights);
        }
        Command::Flight { id } => {
            let flight = client.flights().get(id).await?;
            print_flight(&flight);
            if let Some(reason) = &flight.rejection_reason {
                println!("  rejected: {}", reason);
            }
            let ratings = client.ratings().list_for_flight(id, 1, 50).await?;
            for r in &ratings.items {
                let author = r.user_name.as_deref().unwrap_or(reference::UNKNOWN);
                println!("  {} {}", rating::stars(r.rating), author);
            }
        }
        Command::Book { flight_id } => {
            let flight = client.flights().get(flight_id).await?;
            if !flight.is_bookable() {
                bail!(
                    "Flight {} is not open for booking ({})",
                    flight.flight_name,
                    flight.status.label()
                );
            }
            client.bookings().create(flight_id).await?;
            println!("Booked {} for {:.2}", flight.flight_name, flight.price);
        }
        Command::Bookings => {
            let bookings = CategorizedBookings::from_bookings(client.bookings().list_mine().await?);
            if bookings.is_empty() {
                println!("No bookings yet");
            }
            for (category, section) in [
                (BookingCategory::Upcoming, &bookings.upcoming),
                (BookingCategory::InProgress, &bookings.in_progress),
                (BookingCategory::Completed, &bookings.completed),
                (BookingCategory::Cancelled, &bookings.cancelled),
            ] {
                if section.is_empty() {
                    continue;
                }
                println!("{}", category.title());
                for booking in section {
                    match &booking.flight {
                        Some(flight) => {
                            print!("  booking #{:<5} ", booking.booking_id);
                            print_flight(flight);
                        }
                        None => println!(
                            "  booking #{:<5} flight #{}",
                            booking.booking_id, booking.flight_id
                        ),
                    }
                }
            }
        }
        Command::CancelBooking { booking_id } => {
            let bookings = client.bookings().list_mine().await?;
            let Some(booking) = bookings.iter().find(|b| b.booking_id == booking_id) else {
                bail!("Booking {} not found", booking_id);
            };
            validation::validate_booking_cancellation(booking)?;
            client.bookings().cancel(booking_id).await?;
            println!("Booking {} cancelled", booking_id);
        }
        Command::Rate { flight_id, score } => {
            let flight = client.flights().get(flight_id).await?;
            client.ratings().create(flight_id, flight.status, score).await?;
            println!("Rated {} {}", flight.flight_name, rating::stars(score));
        }
        Command::Approve { flight_id } => {
            let flight = client.flights().approve(flight_id).await?;
            println!("{} is now {}", flight.flight_name, flight.status.label());
        }
        Command::Reject { flight_id, reason } => {
            let flight = client.flights().reject(flight_id, &reason).await?;
            println!("{} is now {}", flight.flight_name, flight.status.label());
        }
        Command::CancelFlight { flight_id } => {
            let flight = client.flights().cancel(flight_id).await?;
            println!("{} is now {}", flight.flight_name, flight.status.label());
        }
        Command::Report { types, out } => {
            let pdf = client.reports().generate(&types).await?;
            let path = out.join(report_filename(&types, Utc::now().date_naive()));
            tokio::fs::write(&path, &pdf)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved {}", path.display());
        }
        Command::Deposit { amount } => {
            let user = client.users().deposit(&amount).await?;
            println!("Balance: {:.2}", user.account_balance);
        }
        Command::Withdraw { amount } => {
            let user = client.users().withdraw(&amount).await?;
            println!("Balance: {:.2}", user.account_balance);
        }
        Command::Avatar { path } => {
            let image = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            client.users().upload_avatar(image_content_type(&path), &image).await?;
            println!("Profile picture updated");
        }
        Command::Watch { flights, countdown } => watch(client, config, flights, countdown).await?,
    }
    Ok(())
}

/// Views kept warm while watching; each is refetched when an event marks it stale.
#[derive(Default)]
struct WatchedViews {
    admin: ViewState<Page<Flight>>,
    manager: ViewState<Page<Flight>>,
    flights: ViewState<Page<Flight>>,
    bookings: ViewState<CategorizedBookings>,
}

async fn watch(
    client: &ApiClient,
    config: &Config,
    flights: Vec<i64>,
    countdown: Option<i64>,
) -> Result<()> {
    let session = client.session().await?.ok_or(ApiError::NotAuthenticated)?;
    let role = session.user.role;
    let socket = SocketClient::connect(
        Arc::new(WsConnector),
        SocketSettings::from(&config.socket),
        SocketIdentity::from_session(&session),
    );
    let mut events = socket.subscribe();
    let mut state = socket.state_changes();
    let mut session_events = client.subscribe();

    for flight_id in &flights {
        socket.join_flight_room(*flight_id).await?;
    }

    let mut landing = match countdown {
        Some(id) => Some(start_countdown(client, id).await?),
        None => None,
    };

    let mut views = WatchedViews::default();
    println!("Watching as {} (ctrl-c to stop)", role);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(event) => {
                    println!("{} {}", Utc::now().format("%H:%M:%S"), describe(&event));
                    for target in refresh_targets(&event) {
                        refresh(client, role, &flights, &mut views, target).await;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!("Missed {} socket events", missed);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow();
                tracing::info!("Socket state: {:?}", current);
                if current == ConnectionState::Failed {
                    bail!("Lost connection to the flight service");
                }
            }
            display = next_display(&mut landing) => match display {
                Some((id, display)) => println!("flight #{}: {}", id, display),
                None => landing = None,
            },
            Ok(skyway_api::SessionEvent::Expired { .. }) = session_events.recv() => {
                socket.disconnect().await;
                bail!("Session expired, please log in again");
            }
        }
    }

    socket.disconnect().await;
    Ok(())
}

async fn start_countdown(
    client: &ApiClient,
    flight_id: i64,
) -> Result<(i64, watch::Receiver<CountdownDisplay>)> {
    let flight = client.flights().get(flight_id).await?;
    if flight.status != FlightStatus::InProgress {
        tracing::warn!("Flight {} is {}, countdown may be meaningless", flight_id, flight.status);
    }
    let countdown = FlightCountdown::new(flight.arrival_time).on_complete(move || {
        tracing::info!("Flight {} has landed", flight_id);
    });
    let (display, _task) = spawn_countdown(countdown, TICK);
    Ok((flight_id, display))
}

/// Next countdown update; `None` once the countdown has finished.
async fn next_display(
    landing: &mut Option<(i64, watch::Receiver<CountdownDisplay>)>,
) -> Option<(i64, CountdownDisplay)> {
    match landing {
        Some((id, rx)) => {
            rx.changed().await.ok()?;
            let display = rx.borrow().clone();
            Some((*id, display))
        }
        None => std::future::pending().await,
    }
}

async fn refresh(
    client: &ApiClient,
    role: Role,
    joined: &[i64],
    views: &mut WatchedViews,
    target: RefreshTarget,
) {
    match target {
        RefreshTarget::AdminDashboard if role == Role::Administrator => {
            let query = FlightQuery::page(1, 10).with_status(FlightStatus::Pending);
            reload(&mut views.admin, client.flights().list(&query)).await;
            show(&views.admin, |page| format!("{} flights awaiting approval", page.total));
        }
        RefreshTarget::ManagerDashboard if role == Role::Manager => {
            reload(&mut views.manager, client.flights().list(&FlightQuery::page(1, 10))).await;
            show(&views.manager, |page| format!("{} flights on the dashboard", page.total));
        }
        RefreshTarget::FlightsPage => {
            let query = FlightQuery::page(1, 10);
            let flights = client.flights();
            let load = flights.list_by_tab(FlightTab::Upcoming, &query);
            reload(&mut views.flights, load).await;
            show(&views.flights, |page| format!("{} upcoming flights", page.total));
        }
        RefreshTarget::MyBookings if role == Role::User => {
            let load = async {
                client.bookings().list_mine().await.map(CategorizedBookings::from_bookings)
            };
            reload(&mut views.bookings, load).await;
            show(&views.bookings, |b| {
                format!(
                    "bookings: {} upcoming, {} in progress",
                    b.upcoming.len(),
                    b.in_progress.len()
                )
            });
        }
        RefreshTarget::FlightComments(flight_id) if joined.contains(&flight_id) => {
            match client.ratings().list_for_flight(flight_id, 1, 50).await {
                Ok(page) => println!(
                    "  flight #{} has {} ratings on the first page",
                    flight_id,
                    page.items.len()
                ),
                Err(e) => tracing::warn!("{}", e.user_message("Failed to load ratings")),
            }
        }
        _ => {}
    }
}

async fn reload<T>(view: &mut ViewState<T>, load: impl Future<Output = Result<T, ApiError>>) {
    view.invalidate();
    if view.begin() {
        view.finish(load.await);
    }
}

fn show<T>(view: &ViewState<T>, render: impl FnOnce(&T) -> String) {
    match view {
        ViewState::Loaded(data) => println!("  {}", render(data)),
        ViewState::Error(message) => tracing::warn!("Refresh failed: {}", message),
        _ => {}
    }
}

fn describe(event: &skyway_api::socket::ServerEvent) -> String {
    match event.flight_id() {
        Some(id) => format!("{} (flight #{})", event.name(), id),
        None => event.name().to_string(),
    }
}

fn print_flight_page(page: &Page<Flight>) {
    for flight in &page.items {
        print_flight(flight);
    }
    println!("page {} of {} ({} flights)", page.page, page.pages.max(1), page.total);
}

fn print_flight(flight: &Flight) {
    println!(
        "#{:<5} {:<10} {:<14} {:<12} {}  {:>9.2}  {:<16} seats {}",
        flight.flight_id,
        flight.flight_name,
        flight.airline_label(),
        flight.route_label(),
        flight.departure_time.format("%Y-%m-%d %H:%M"),
        flight.price,
        flight.status.label(),
        flight.available_seats.map_or_else(
            || flight.total_seats.to_string(),
            |s| format!("{}/{}", s, flight.total_seats)
        ),
    );
}

fn image_content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
