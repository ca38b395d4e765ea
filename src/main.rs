use clap::{ArgAction, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use slide_rotation::catalog_draft::{category_update, new_category, BoardDraft};
use slide_rotation::client::ApiClient;
use slide_rotation::config::{ClientConfig, DurationUnit, SurfaceKind};
use slide_rotation::credentials::{load_credentials, resolve_token, Credentials};
use slide_rotation::launcher::{launch_board, show_selected, EntryPoint, LaunchOutcome};
use slide_rotation::model::group_boards_by_category;
use slide_rotation::notify::Notification;
use slide_rotation::player::Player;
use slide_rotation::registry::SessionRegistry;
use slide_rotation::schedule::{cycle_length, parse_slide_time};
use slide_rotation::slide_draft::SlideDraft;
use slide_rotation::surface::opener_from_config;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rotate a board's slides on a presentation surface")]
struct Args {
    /// Path to config file (TOML format); built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print URLs instead of launching the configured viewer
    #[arg(long, global = true)]
    console: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rotate through the enabled slides of a board
    Play {
        #[arg(short, long)]
        board: i64,

        /// Unit of the slide time field (overrides config file)
        #[arg(short, long, value_enum)]
        unit: Option<DurationUnit>,

        /// Stop after this many seconds instead of running until the surface closes
        #[arg(long)]
        for_secs: Option<u64>,
    },
    /// Show a single slide without rotating
    Show {
        #[arg(short, long)]
        board: i64,

        #[arg(short, long)]
        slide: i64,
    },
    /// List active categories and their boards
    Boards,
    /// List the slides of a board
    Slides {
        #[arg(short, long)]
        board: i64,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Enable or disable a slide
    Toggle {
        #[arg(short, long)]
        slide: i64,

        #[arg(long, action = ArgAction::Set)]
        activate: bool,
    },
    /// Add a slide to a board
    AddSlide {
        #[arg(short, long)]
        board: i64,

        #[arg(long)]
        title: String,

        #[arg(long)]
        url: String,

        /// Display time, in the configured unit
        #[arg(long)]
        time: String,
    },
    /// Edit a slide; omitted fields keep their stored value
    EditSlide {
        #[arg(short, long)]
        board: i64,

        #[arg(short, long)]
        slide: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        url: Option<String>,

        /// Display time, in the configured unit
        #[arg(long)]
        time: Option<String>,
    },
    /// Add a board to a category
    AddBoard {
        #[arg(long)]
        category: i64,

        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,
    },
    /// Edit a board; omitted fields keep their stored value
    EditBoard {
        #[arg(short, long)]
        board: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Move the board to another category
        #[arg(long)]
        category: Option<i64>,
    },
    /// Add a category
    AddCategory {
        #[arg(long)]
        title: String,
    },
    /// Rename a category or set its status
    EditCategory {
        #[arg(long)]
        category: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, action = ArgAction::Set)]
        activate: Option<bool>,
    },
    /// Flip a category between active and inactive
    ToggleCategory {
        #[arg(long)]
        category: i64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if args.console {
        config.surface.kind = SurfaceKind::Console;
    }

    let credentials = load_credentials().map_err(|e| format!("Failed to load credentials: {}", e))?;
    let token = resolve_token(&credentials, &config.credential_profile)?;
    let client = ApiClient::from_config(&config, &token)?;

    match args.command {
        Command::Play {
            board,
            unit,
            for_secs,
        } => play(&client, &config, board, unit, for_secs),
        Command::Show { board, slide } => {
            let opener = opener_from_config(&config.surface);
            match show_selected(&client, &Player::new(), opener.as_ref(), board, slide) {
                Ok(_surface) => Ok(()),
                Err(notification) => fail(notification),
            }
        }
        Command::Boards => list_boards(&client),
        Command::Slides { board, json } => list_slides(&client, board, json, config.duration_unit),
        Command::Toggle { slide, activate } => match client.set_slide_status(slide, activate) {
            Ok(()) => {
                let state = if activate { "enabled" } else { "disabled" };
                println!("{}", Notification::success(format!("Slide {} {}.", slide, state)));
                Ok(())
            }
            Err(e) => fail(Notification::from_api_error(&e, "update the slide")),
        },
        Command::AddSlide {
            board,
            title,
            url,
            time,
        } => {
            let time = parse_slide_time(&time)?;
            let author = current_user(&credentials, &config.credential_profile);
            let body = SlideDraft { title, url, time }.into_new_slide(board, author)?;
            match client.create_slide(&body) {
                Ok(created) => {
                    println!(
                        "{}",
                        Notification::success(format!(
                            "Slide {} added to board {}.",
                            created.slide_id, board
                        ))
                    );
                    Ok(())
                }
                Err(e) => fail(Notification::from_api_error(&e, "add the slide")),
            }
        }
        Command::EditSlide {
            board,
            slide,
            title,
            url,
            time,
        } => {
            let editor = current_user(&credentials, &config.credential_profile);
            edit_slide(&client, board, slide, title, url, time, editor)
        }
        Command::AddBoard {
            category,
            title,
            description,
        } => {
            let body = BoardDraft {
                title,
                description,
                category_id: category,
            }
            .into_body()?;
            match client.create_board(&body) {
                Ok(created) => report(format!(
                    "Board {} added to category {}.",
                    created.board_id, category
                )),
                Err(e) => fail(Notification::from_api_error(&e, "add the board")),
            }
        }
        Command::EditBoard {
            board,
            title,
            description,
            category,
        } => edit_board(&client, board, title, description, category),
        Command::AddCategory { title } => {
            let author = current_user(&credentials, &config.credential_profile);
            let body = new_category(&title, author)?;
            match client.create_category(&body) {
                Ok(()) => report(format!("Category '{}' added.", body.category_title)),
                Err(e) => fail(Notification::from_api_error(&e, "add the category")),
            }
        }
        Command::EditCategory {
            category,
            title,
            activate,
        } => {
            let categories = match client.list_categories() {
                Ok(c) => c,
                Err(e) => return fail(Notification::from_api_error(&e, "load categories")),
            };
            let existing = match categories.iter().find(|c| c.category_id == category) {
                Some(c) => c,
                None => return fail(Notification::error(format!("Category {} not found.", category))),
            };
            let editor = current_user(&credentials, &config.credential_profile);
            let body = category_update(existing, title.as_deref(), activate, editor)?;
            match client.update_category(category, &body) {
                Ok(()) => report(format!("Category {} updated.", category)),
                Err(e) => fail(Notification::from_api_error(&e, "update the category")),
            }
        }
        Command::ToggleCategory { category } => match client.toggle_category(category) {
            Ok(()) => report(format!("Category {} toggled.", category)),
            Err(e) => fail(Notification::from_api_error(&e, "update the category")),
        },
    }
}

/// User id recorded in audit fields, from the active credential profile
fn current_user(credentials: &Option<Credentials>, profile: &str) -> Option<String> {
    credentials
        .as_ref()
        .and_then(|c| c.api.get(profile))
        .and_then(|p| p.user_id.clone())
}

fn edit_slide(
    client: &ApiClient,
    board: i64,
    slide: i64,
    title: Option<String>,
    url: Option<String>,
    time: Option<String>,
    editor: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let slides = match client.list_slides_by_board(board) {
        Ok(s) => s,
        Err(e) => return fail(Notification::from_api_error(&e, "load slides")),
    };
    let existing = match slides.iter().find(|s| s.slide_id == slide) {
        Some(s) => s,
        None => return fail(Notification::error(format!("Slide {} not found.", slide))),
    };

    let mut draft = SlideDraft::from_slide(existing);
    if let Some(title) = title {
        draft.title = title;
    }
    if let Some(url) = url {
        draft.url = url;
    }
    if let Some(time) = time {
        draft.time = parse_slide_time(&time)?;
    }
    let body = draft.into_slide_update(existing, editor)?;
    match client.update_slide(&body) {
        Ok(()) => report(format!("Slide {} updated.", slide)),
        Err(e) => fail(Notification::from_api_error(&e, "update the slide")),
    }
}

fn edit_board(
    client: &ApiClient,
    board: i64,
    title: Option<String>,
    description: Option<String>,
    category: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let boards = match client.list_boards() {
        Ok(b) => b,
        Err(e) => return fail(Notification::from_api_error(&e, "load boards")),
    };
    let existing = match boards.iter().find(|b| b.board_id == board) {
        Some(b) => b,
        None => return fail(Notification::error(format!("Board {} not found.", board))),
    };

    let body = BoardDraft {
        title: title.unwrap_or_else(|| existing.board_title.clone()),
        description: description.unwrap_or_else(|| existing.board_description.clone()),
        category_id: category.unwrap_or(existing.category_id),
    }
    .into_body()?;
    match client.update_board(board, &body) {
        Ok(()) => report(format!("Board {} updated.", board)),
        Err(e) => fail(Notification::from_api_error(&e, "update the board")),
    }
}

fn report(message: String) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", Notification::success(message));
    Ok(())
}

fn play(
    client: &ApiClient,
    config: &ClientConfig,
    board: i64,
    unit: Option<DurationUnit>,
    for_secs: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let unit = unit.unwrap_or(config.duration_unit);
    let opener = opener_from_config(&config.surface);
    let registry = SessionRegistry::new(Player::new(), config.concurrent_start);

    match launch_board(
        client,
        &registry,
        opener.as_ref(),
        board,
        unit,
        EntryPoint::BoardList,
    ) {
        LaunchOutcome::Started(session) => {
            match for_secs {
                Some(secs) => {
                    std::thread::sleep(Duration::from_secs(secs));
                    info!("[{}] Time limit reached", session.id());
                    session.stop();
                }
                None => session.wait(),
            }
            registry.stop_all();
            Ok(())
        }
        LaunchOutcome::NeedsSlides(board) => {
            println!(
                "{}",
                Notification::info(format!(
                    "Board {} has no enabled slides. Add one with: add-slide --board {} --title <title> --url <url> --time <time>",
                    board, board
                ))
            );
            Ok(())
        }
        LaunchOutcome::Failed(notification) => fail(notification),
    }
}

fn list_boards(client: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    let categories = match client.list_categories() {
        Ok(c) => c,
        Err(e) => return fail(Notification::from_api_error(&e, "load categories")),
    };
    let boards = match client.list_boards() {
        Ok(b) => b,
        Err(e) => return fail(Notification::from_api_error(&e, "load boards")),
    };

    for (category, members) in group_boards_by_category(&categories, &boards) {
        println!("{} (#{})", category.category_title, category.category_id);
        if members.is_empty() {
            println!("    (no boards)");
        }
        for board in members {
            println!(
                "    #{:<5} {:<30} {}",
                board.board_id, board.board_title, board.board_description
            );
        }
    }
    Ok(())
}

fn list_slides(
    client: &ApiClient,
    board: i64,
    json: bool,
    unit: DurationUnit,
) -> Result<(), Box<dyn std::error::Error>> {
    let slides = match client.list_slides_by_board(board) {
        Ok(s) => s,
        Err(e) => return fail(Notification::from_api_error(&e, "load slides")),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&slides)?);
        return Ok(());
    }
    if slides.is_empty() {
        println!("{}", Notification::info("This board has no slides."));
    }
    for slide in &slides {
        println!(
            "#{:<5} [{}] {:>6} {:<30} {}",
            slide.slide_id,
            if slide.slide_status { "on " } else { "off" },
            slide.time,
            slide.slide_title,
            slide.url
        );
    }

    let enabled: Vec<f64> = slides
        .iter()
        .filter(|s| s.slide_status)
        .map(|s| s.time)
        .collect();
    if !enabled.is_empty() {
        match cycle_length(&enabled, unit) {
            Ok(total) => println!(
                "Full rotation: {}s ({} enabled, time in {:?})",
                total.as_secs_f64(),
                enabled.len(),
                unit
            ),
            Err(e) => println!("{}", Notification::error(e)),
        }
    }
    Ok(())
}

fn fail(notification: Notification) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("{}", notification);
    std::process::exit(1);
}
