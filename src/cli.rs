//! Command line boundary: caller identity, argument parsing and JSON output
use super::config::Config;
use super::error::BookingError;
use super::model::{BookingRequest, NewItem, NewUser, TimeStamp};
use super::query::SearchState;
use super::service::BookingService;
use super::store::{ItemRepository, SledStore, UserRepository};
use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "shareit", version, about = "Reserve items lent by other users")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    User(UserCommand),
    #[command(subcommand)]
    Item(ItemCommand),
    #[command(subcommand)]
    Booking(BookingCommand),
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a user.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ItemCommand {
    /// List an item owned by `--user`.
    Add {
        #[arg(long)]
        user: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        available: bool,
    },
    /// Last and next bookings of an item, for its owner.
    Window {
        #[arg(long)]
        user: String,
        item: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BookingCommand {
    Create {
        #[arg(long)]
        user: String,
        #[arg(long)]
        item: String,
        #[arg(long)]
        start: DateTime<Utc>,
        #[arg(long)]
        end: DateTime<Utc>,
    },
    Decide {
        #[arg(long)]
        user: String,
        booking: String,
        #[arg(long, action = ArgAction::Set)]
        approved: bool,
    },
    Get {
        #[arg(long)]
        user: String,
        booking: String,
    },
    /// Bookings made by `--user`.
    List {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "ALL")]
        state: String,
        #[arg(long, default_value_t = 0)]
        from: usize,
        #[arg(long)]
        size: Option<usize>,
    },
    /// Bookings of items owned by `--user`.
    OwnerList {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "ALL")]
        state: String,
        #[arg(long, default_value_t = 0)]
        from: usize,
        #[arg(long)]
        size: Option<usize>,
    },
    /// Whether `--user` has finished renting `--item`.
    Completed {
        #[arg(long)]
        user: String,
        #[arg(long)]
        item: String,
    },
}

fn render<T: Serialize>(value: &T) -> Result<String, BookingError> {
    serde_json::to_string_pretty(value).map_err(|e| anyhow::Error::from(e).into())
}

/// Execute one command and return its JSON rendering.
pub fn run(cli: &Cli) -> Result<String, BookingError> {
    let service = BookingService::new(cli.config.open_store()?);
    let output = execute(&service, &cli.config, &cli.command)?;
    service.store().flush()?;
    Ok(output)
}

pub fn execute(
    service: &BookingService<SledStore>,
    config: &Config,
    command: &Command,
) -> Result<String, BookingError> {
    match command {
        Command::User(UserCommand::Add { name, email }) => {
            let user = service.store().save_user(NewUser {
                name: name.clone(),
                email: email.clone(),
            })?;
            render(&serde_json::json!({ "id": user.id, "name": user.name, "email": user.email }))
        }
        Command::Item(ItemCommand::Add {
            user,
            name,
            description,
            available,
        }) => {
            if service.store().find_user(user)?.is_none() {
                return Err(BookingError::NotFound(format!("user {user}")));
            }
            let item = service.store().save_item(NewItem {
                name: name.clone(),
                description: description.clone(),
                available: *available,
                owner_id: user.clone(),
            })?;
            render(&serde_json::json!({
                "id": item.id,
                "name": item.name,
                "description": item.description,
                "available": item.available,
            }))
        }
        Command::Item(ItemCommand::Window { user, item }) => {
            render(&service.item_booking_window(user, item, TimeStamp::new())?)
        }
        Command::Booking(BookingCommand::Create {
            user,
            item,
            start,
            end,
        }) => {
            let request = BookingRequest::new(item.clone(), (*start).into(), (*end).into());
            render(&service.create(user, request)?)
        }
        Command::Booking(BookingCommand::Decide {
            user,
            booking,
            approved,
        }) => render(&service.decide(user, booking, *approved)?),
        Command::Booking(BookingCommand::Get { user, booking }) => {
            render(&service.get_by_id(user, booking)?)
        }
        Command::Booking(BookingCommand::List {
            user,
            state,
            from,
            size,
        }) => render(&service.list_by_booker(
            user,
            state.parse::<SearchState>()?,
            TimeStamp::new(),
            config.page(*from, *size)?,
        )?),
        Command::Booking(BookingCommand::OwnerList {
            user,
            state,
            from,
            size,
        }) => render(&service.list_by_owner(
            user,
            state.parse::<SearchState>()?,
            TimeStamp::new(),
            config.page(*from, *size)?,
        )?),
        Command::Booking(BookingCommand::Completed { user, item }) => {
            let completed = service.has_completed_booking(user, item, TimeStamp::new())?;
            render(&serde_json::json!({ "completed": completed }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_booking_create() {
        let cli = Cli::try_parse_from([
            "shareit",
            "booking",
            "create",
            "--user",
            "user_1",
            "--item",
            "item_1",
            "--start",
            "2030-01-01T10:00:00Z",
            "--end",
            "2030-01-02T10:00:00Z",
        ])
        .unwrap();

        match cli.command {
            Command::Booking(BookingCommand::Create { user, start, .. }) => {
                assert_eq!(user, "user_1");
                assert_eq!(start.to_rfc3339(), "2030-01-01T10:00:00+00:00");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn decide_requires_explicit_flag_value() {
        let cli = Cli::try_parse_from([
            "shareit", "booking", "decide", "--user", "user_o", "booking_1", "--approved", "false",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Booking(BookingCommand::Decide { approved: false, .. })
        ));
    }

    #[test]
    fn listing_defaults_to_all_from_zero() {
        let cli = Cli::try_parse_from(["shareit", "booking", "list", "--user", "user_b"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Booking(BookingCommand::List { ref state, from: 0, size: None, .. }) if state == "ALL"
        ));
    }
}
