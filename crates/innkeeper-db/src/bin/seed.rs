//! # Seed Data Generator
//!
//! Populates a database with sample hotels, rooms, bookings and line items
//! for development, then checks that every derived value is consistent.
//!
//! ## Usage
//! ```bash
//! # Seed the default database (INNKEEPER_DB_PATH or the platform data dir)
//! cargo run -p innkeeper-db --bin seed
//!
//! # Ten hotels into a scratch file, print everything as JSON
//! cargo run -p innkeeper-db --bin seed -- --db ./dev.db --hotels 10 --json
//! ```
//!
//! Rows go through the record repository exactly like form input, so
//! `TotalCost` and `NumberOfNights` are filled in by the consistency engine.

use chrono::{Duration, NaiveDate};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use innkeeper_core::stay::format_date;
use innkeeper_core::{Fields, Record, Table};
use innkeeper_db::{Database, DbConfig, RecordRepository};

/// Sample hotels: name, city, address, rating
const HOTELS: &[(&str, &str, &str, &str)] = &[
    ("Hotel Adlon", "Berlin", "Unter den Linden 77", "4.8"),
    ("Grand Hotel Europe", "Saint Petersburg", "Mikhailovskaya 1/7", "4.6"),
    ("Hotel Sacher", "Vienna", "Philharmoniker Str. 4", "4.7"),
    ("Pension Alpenblick", "Innsbruck", "Hungerburgweg 12", ""),
    ("Hotel Danieli", "Venice", "Riva degli Schiavoni 4196", "4.5"),
    ("Baltic Inn", "Riga", "Kalku iela 9", "3.9"),
];

/// Room types: type, nightly price, max guests
const ROOM_TYPES: &[(&str, &str, &str)] = &[
    ("Single", "60", "1"),
    ("Double", "100", "2"),
    ("Family", "145,50", "4"),
    ("Suite", "250", "2"),
];

const GUESTS: &[&str] = &[
    "Ada Lovelace",
    "Alan Turing",
    "Grace Hopper",
    "Edsger Dijkstra",
    "Barbara Liskov",
    "Donald Knuth",
    "Frances Allen",
];

/// Bookings created per hotel
const BOOKINGS_PER_HOTEL: usize = 2;

struct Options {
    db_path: Option<PathBuf>,
    hotels: usize,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,innkeeper=debug,sqlx=warn")),
        )
        .init();

    let Some(options) = parse_args()? else {
        return Ok(());
    };

    let db_path = match options.db_path {
        Some(path) => path,
        None => DbConfig::from_env()?.database_path,
    };

    println!("🌱 Innkeeper Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path.display());
    println!("Hotels:   {}", options.hotels);
    println!();

    let db = Database::create(&db_path).await?;
    let repo = db.records();
    println!("✓ Database ready");

    let existing = repo.count(Table::Hotels).await?;
    if existing > 0 {
        println!("⚠ Database already has {} hotels", existing);
        println!("  Skipping seed to avoid duplicates.");
    } else {
        let start = std::time::Instant::now();
        let inserted = seed(&repo, options.hotels).await?;
        println!("✓ Inserted {} rows in {:?}", inserted, start.elapsed());
    }

    println!();
    println!("Verifying derived values...");
    let discrepancies = repo.verify().await?;
    if discrepancies.is_empty() {
        println!("  ✓ Every TotalCost and NumberOfNights is consistent");
    } else {
        for discrepancy in &discrepancies {
            println!("  ✗ {:?}", discrepancy);
        }
    }

    for table in Table::ALL {
        println!("  {:<12} {} rows", table.name(), repo.count(table).await?);
    }

    if options.json {
        let snapshot = repo.snapshot().await?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    db.close().await?;
    println!();
    println!("✓ Seed complete!");
    Ok(())
}

/// `None` when only help was requested.
fn parse_args() -> Result<Option<Options>, Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut options = Options {
        db_path: None,
        hotels: 3,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                let value = args.get(i + 1).ok_or("--db needs a path")?;
                options.db_path = Some(PathBuf::from(value));
                i += 1;
            }
            "--hotels" | "-n" => {
                let value = args.get(i + 1).ok_or("--hotels needs a number")?;
                options.hotels = value
                    .parse()
                    .map_err(|_| format!("'{}' is not a number of hotels", value))?;
                i += 1;
            }
            "--json" => options.json = true,
            "--help" | "-h" => {
                println!("Innkeeper Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: $INNKEEPER_DB_PATH or data dir)");
                println!("  -n, --hotels <N>    Number of hotels to generate (default: 3)");
                println!("      --json          Print a JSON snapshot of all tables");
                println!("  -h, --help          Show this help message");
                return Ok(None);
            }
            other => return Err(format!("unknown argument '{}'", other).into()),
        }
        i += 1;
    }

    Ok(Some(options))
}

/// Inserts the sample data and returns the number of rows written.
async fn seed(repo: &RecordRepository, hotels: usize) -> Result<usize, Box<dyn std::error::Error>> {
    let mut inserted = 0;
    let first_check_in = NaiveDate::from_ymd_opt(2024, 3, 1).ok_or("invalid base date")?;

    for h in 0..hotels {
        let (name, city, address, rating) = HOTELS[h % HOTELS.len()];
        let name = if h < HOTELS.len() {
            name.to_string()
        } else {
            format!("{} {}", name, h / HOTELS.len() + 1)
        };

        let hotel = repo
            .insert(&Fields::parse(
                Table::Hotels,
                [
                    ("Name", name.as_str()),
                    ("City", city),
                    ("Address", address),
                    ("Rating", rating),
                ],
            )?)
            .await?;
        let hotel_id = hotel.id().to_string();
        inserted += 1;

        let mut room_ids = Vec::new();
        for &(room_type, price, max_guests) in ROOM_TYPES {
            let room = repo
                .insert(&Fields::parse(
                    Table::Rooms,
                    [
                        ("HotelId", hotel_id.as_str()),
                        ("RoomType", room_type),
                        ("PricePerNight", price),
                        ("MaxGuests", max_guests),
                    ],
                )?)
                .await?;
            room_ids.push(room.id().to_string());
            inserted += 1;
        }

        for b in 0..BOOKINGS_PER_HOTEL {
            let n = h * BOOKINGS_PER_HOTEL + b;
            let check_in = first_check_in + Duration::days(((h * 3 + b * 9) % 25) as i64);
            let check_out = check_in + Duration::days(1 + (n % 4) as i64);

            let booking = repo
                .insert(&Fields::parse(
                    Table::Bookings,
                    [
                        ("HotelId", hotel_id.clone()),
                        ("GuestName", GUESTS[n % GUESTS.len()].to_string()),
                        ("CheckInDate", format_date(check_in)),
                        ("CheckOutDate", format_date(check_out)),
                    ],
                )?)
                .await?;
            let booking_id = booking.id().to_string();
            inserted += 1;

            // One or two rooms per booking
            for room_id in room_ids.iter().skip(n % room_ids.len()).take(1 + n % 2) {
                repo.insert(&Fields::parse(
                    Table::BookedRooms,
                    [("BookingId", booking_id.as_str()), ("RoomId", room_id.as_str())],
                )?)
                .await?;
                inserted += 1;
            }

            if let Some(Record::Booking(booking)) = repo.get(Table::Bookings, booking.id()).await? {
                println!(
                    "  {:<16} {} → {}  {:>8}",
                    booking.guest_name,
                    format_date(booking.check_in_date),
                    format_date(booking.check_out_date),
                    booking.total_cost.to_string()
                );
            }
        }
    }

    Ok(inserted)
}
