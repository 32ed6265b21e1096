//! Cabinstay Admin CLI
//!
//! Administration tool for cabins, bookings and booking settings.
//!
//! # Usage
//!
//! ```bash
//! cabinstay-admin cabin add 001 --capacity 2 --price 250
//! cabinstay-admin cabin list
//! cabinstay-admin booking add --cabin 1 --guest alice@example.com --from 2024-03-10 --to 2024-03-12
//! cabinstay-admin booking status 4 checked-in
//! cabinstay-admin guest list
//! cabinstay-admin settings set --max-length 30
//! ```
//!
//! Uses the same configuration as the server (`--config`, `CABINSTAY_*`).

use cabinstay::config::Config;
use cabinstay::db::{
    init_db, CabinRepository, NewBooking, NewCabin, SettingsRepository, SqliteBookingRepository,
    SqliteGuestRepository,
};
use cabinstay_core::{
    blocked_dates, BookingId, BookingRepository, BookingStatus, CabinId, GuestRepository,
    NormalizedEmail,
};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use sqlx::SqlitePool;
use std::path::PathBuf;

type CliResult = Result<(), Box<dyn std::error::Error>>;

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "cabinstay-admin")]
#[command(version)]
#[command(about = "Cabinstay administration tool")]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage cabins
    Cabin(CabinCommand),
    /// Manage bookings
    Booking(BookingCommand),
    /// Inspect guests
    Guest(GuestCommand),
    /// Manage booking settings
    Settings(SettingsCommand),
}

#[derive(Args)]
struct CabinCommand {
    #[command(subcommand)]
    command: CabinSubcommand,
}

#[derive(Subcommand)]
enum CabinSubcommand {
    /// Add a cabin
    Add {
        /// Cabin name
        name: String,
        /// Maximum number of guests
        #[arg(long)]
        capacity: i64,
        /// Regular price per night
        #[arg(long, default_value_t = 0.0)]
        price: f64,
        /// Discount per night
        #[arg(long, default_value_t = 0.0)]
        discount: f64,
        #[arg(long, default_value = "")]
        description: String,
        /// Image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// List all cabins
    List,
}

#[derive(Args)]
struct BookingCommand {
    #[command(subcommand)]
    command: BookingSubcommand,
}

#[derive(Subcommand)]
enum BookingSubcommand {
    /// Add a booking for an existing guest
    Add {
        #[arg(long)]
        cabin: CabinId,
        /// Guest email
        #[arg(long)]
        guest: String,
        /// First night (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day of the stay (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
        #[arg(long, default_value_t = 1)]
        guests: i64,
    },
    /// List bookings of a cabin
    List {
        #[arg(long)]
        cabin: CabinId,
    },
    /// Change the status of a booking
    Status {
        id: BookingId,
        /// unconfirmed, checked-in or checked-out
        status: BookingStatus,
    },
}

#[derive(Args)]
struct GuestCommand {
    #[command(subcommand)]
    command: GuestSubcommand,
}

#[derive(Subcommand)]
enum GuestSubcommand {
    /// List all guests
    List,
}

#[derive(Args)]
struct SettingsCommand {
    #[command(subcommand)]
    command: SettingsSubcommand,
}

#[derive(Subcommand)]
enum SettingsSubcommand {
    /// Show current settings
    Show,
    /// Update settings
    Set {
        #[arg(long)]
        min_length: Option<i64>,
        #[arg(long)]
        max_length: Option<i64>,
        #[arg(long)]
        max_guests: Option<i64>,
        #[arg(long)]
        breakfast_price: Option<f64>,
    },
}

// ============================================================================
// Commands
// ============================================================================

async fn add_cabin(pool: SqlitePool, cabin: NewCabin) -> CliResult {
    let created = CabinRepository::new(pool).create(&cabin).await?;
    println!("Added cabin: {} (id {})", created.name, created.id);
    println!("  Capacity: {}", created.max_capacity);
    Ok(())
}

async fn list_cabins(pool: SqlitePool) -> CliResult {
    let cabins = CabinRepository::new(pool).list().await?;

    if cabins.is_empty() {
        println!("No cabins registered.");
        return Ok(());
    }

    println!("{:<6} {:<20} {:<10} {:<10}", "ID", "NAME", "CAPACITY", "PRICE");
    println!("{}", "-".repeat(50));
    for cabin in &cabins {
        println!(
            "{:<6} {:<20} {:<10} {:<10.2}",
            cabin.id, cabin.name, cabin.max_capacity, cabin.regular_price
        );
    }
    println!();
    println!("Total: {} cabin(s)", cabins.len());
    Ok(())
}

async fn add_booking(
    pool: SqlitePool,
    cabin_id: CabinId,
    guest: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    num_guests: i64,
) -> CliResult {
    if end_date < start_date {
        return Err(format!("Stay ends ({}) before it starts ({})", end_date, start_date).into());
    }

    let email = NormalizedEmail::parse(&guest).ok_or("Guest email is empty")?;
    let guest = SqliteGuestRepository::new(pool.clone())
        .find_by_email(&email)
        .await?
        .ok_or_else(|| format!("No guest registered as '{}'. Guests sign in first.", email))?;

    let cabin = CabinRepository::new(pool.clone()).get(cabin_id).await?;
    if num_guests > cabin.max_capacity {
        return Err(format!(
            "Cabin {} holds at most {} guest(s)",
            cabin.name, cabin.max_capacity
        )
        .into());
    }

    let bookings = SqliteBookingRepository::new(pool);
    let existing = bookings
        .list_active_for_cabin(cabin_id, Utc::now().date_naive())
        .await?;
    if blocked_dates(&existing)?.overlaps(start_date, end_date) {
        return Err(format!(
            "Cabin {} is already booked between {} and {}",
            cabin.name, start_date, end_date
        )
        .into());
    }

    let booking = bookings
        .create(&NewBooking {
            cabin_id,
            guest_id: guest.id,
            start_date,
            end_date,
            num_guests,
            status: BookingStatus::Unconfirmed,
        })
        .await?;

    println!("Added booking {} for {}", booking.id, email);
    println!("  Cabin: {}", cabin.name);
    println!("  Dates: {} to {}", booking.start_date, booking.end_date);
    Ok(())
}

async fn list_bookings(pool: SqlitePool, cabin_id: CabinId) -> CliResult {
    let bookings = SqliteBookingRepository::new(pool)
        .list_for_cabin(cabin_id)
        .await?;

    if bookings.is_empty() {
        println!("No bookings for cabin {}.", cabin_id);
        return Ok(());
    }

    println!(
        "{:<6} {:<8} {:<12} {:<12} {:<14}",
        "ID", "GUEST", "FROM", "TO", "STATUS"
    );
    println!("{}", "-".repeat(56));
    for b in &bookings {
        println!(
            "{:<6} {:<8} {:<12} {:<12} {:<14}",
            b.id,
            b.guest_id,
            b.start_date.to_string(),
            b.end_date.to_string(),
            b.status
        );
    }
    Ok(())
}

async fn set_booking_status(pool: SqlitePool, id: BookingId, status: BookingStatus) -> CliResult {
    SqliteBookingRepository::new(pool)
        .set_status(id, status)
        .await?;
    println!("Booking {} is now {}", id, status);
    Ok(())
}

async fn list_guests(pool: SqlitePool) -> CliResult {
    let guests = SqliteGuestRepository::new(pool).list().await?;

    if guests.is_empty() {
        println!("No guests registered.");
        return Ok(());
    }

    println!("{:<6} {:<40} {:<30}", "ID", "EMAIL", "NAME");
    println!("{}", "-".repeat(76));
    for guest in &guests {
        println!("{:<6} {:<40} {:<30}", guest.id, guest.email, guest.full_name);
    }
    println!();
    println!("Total: {} guest(s)", guests.len());
    Ok(())
}

async fn show_settings(pool: SqlitePool) -> CliResult {
    let settings = SettingsRepository::new(pool).get().await?;
    println!("Minimum nights:     {}", settings.min_booking_length);
    println!("Maximum nights:     {}", settings.max_booking_length);
    println!("Guests per booking: {}", settings.max_guests_per_booking);
    println!("Breakfast price:    {:.2}", settings.breakfast_price);
    Ok(())
}

async fn update_settings(
    pool: SqlitePool,
    min_length: Option<i64>,
    max_length: Option<i64>,
    max_guests: Option<i64>,
    breakfast_price: Option<f64>,
) -> CliResult {
    let repo = SettingsRepository::new(pool.clone());
    let mut settings = repo.get().await?;

    if let Some(v) = min_length {
        settings.min_booking_length = v;
    }
    if let Some(v) = max_length {
        settings.max_booking_length = v;
    }
    if let Some(v) = max_guests {
        settings.max_guests_per_booking = v;
    }
    if let Some(v) = breakfast_price {
        settings.breakfast_price = v;
    }
    if settings.min_booking_length > settings.max_booking_length {
        return Err("Minimum booking length exceeds the maximum".into());
    }

    repo.update(&settings).await?;
    show_settings(pool).await
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> CliResult {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;
    let pool = init_db(&config.database_path).await?;

    match cli.command {
        Commands::Cabin(cmd) => match cmd.command {
            CabinSubcommand::Add {
                name,
                capacity,
                price,
                discount,
                description,
                image,
            } => {
                let cabin = NewCabin {
                    name,
                    max_capacity: capacity,
                    regular_price: price,
                    discount,
                    description,
                    image,
                };
                add_cabin(pool, cabin).await
            }
            CabinSubcommand::List => list_cabins(pool).await,
        },
        Commands::Booking(cmd) => match cmd.command {
            BookingSubcommand::Add {
                cabin,
                guest,
                from,
                to,
                guests,
            } => add_booking(pool, cabin, guest, from, to, guests).await,
            BookingSubcommand::List { cabin } => list_bookings(pool, cabin).await,
            BookingSubcommand::Status { id, status } => {
                set_booking_status(pool, id, status).await
            }
        },
        Commands::Guest(cmd) => match cmd.command {
            GuestSubcommand::List => list_guests(pool).await,
        },
        Commands::Settings(cmd) => match cmd.command {
            SettingsSubcommand::Show => show_settings(pool).await,
            SettingsSubcommand::Set {
                min_length,
                max_length,
                max_guests,
                breakfast_price,
            } => update_settings(pool, min_length, max_length, max_guests, breakfast_price).await,
        },
    }
}
