use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    resolve, resolve_slide, AgendaClient, AgendaController, Alert, Route, Slide, View,
};
use shared::{
    domain::{ItemId, ProjectorId, SpeakerId, UserId},
    protocol::ItemDraft,
    tree::TreeNode,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, DEFAULT_SETTINGS_FILE};

#[derive(Parser, Debug)]
#[command(about = "Manage a meeting agenda over its REST API")]
struct Cli {
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    projector_id: Option<i64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the agenda as an indented list.
    List,
    /// Show one item with its tags and list of speakers.
    Show {
        item_id: i64,
    },
    /// List the item types the server accepts.
    Types,
    /// Create an agenda item.
    Create {
        title: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        duration: Option<String>,
        #[arg(long = "type")]
        item_type: Option<i64>,
    },
    /// Change the title of an item.
    Rename {
        item_id: i64,
        title: String,
    },
    /// Delete an item.
    Delete {
        item_id: i64,
    },
    /// Close the list of speakers of an item.
    CloseList {
        item_id: i64,
    },
    /// Reopen the list of speakers of an item.
    OpenList {
        item_id: i64,
    },
    /// Put a user on the list of speakers.
    AddSpeaker {
        item_id: i64,
        user_id: i64,
    },
    /// Take a speaker off the list of speakers.
    RemoveSpeaker {
        item_id: i64,
        speaker_id: i64,
    },
    /// Start a speech; without --speaker the next waiting speaker is called.
    BeginSpeech {
        item_id: i64,
        #[arg(long)]
        speaker: Option<i64>,
    },
    /// End the current speech.
    EndSpeech {
        item_id: i64,
    },
    /// Put the agenda on the projector.
    ProjectAgenda,
    /// Put an item's list of speakers on the projector.
    ProjectSpeakers {
        item_id: i64,
    },
    /// Show what the projector currently displays.
    Slides,
    /// Replace the agenda order with a JSON tree read from a file.
    Sort {
        tree_file: PathBuf,
    },
    /// Create items from a JSON array of drafts.
    Import {
        drafts_file: PathBuf,
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config)?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(projector_id) = cli.projector_id {
        settings.projector_id = projector_id;
    }
    info!(server_url = %settings.server_url, projector_id = settings.projector_id, "agenda client starting");

    let client = AgendaClient::new(&settings.server_url)
        .context("failed to create agenda client")?
        .with_projector(ProjectorId(settings.projector_id));
    let controller = AgendaController::new(client);

    match cli.command {
        Command::List => match resolve(controller.client(), Route::ItemList).await? {
            View::ItemList(view) => print!("{}", render::agenda_rows(&view.rows, view.agenda_projected)),
            other => bail!("unexpected view for agenda list: {other:?}"),
        },
        Command::Show { item_id } => {
            match resolve(controller.client(), Route::ItemDetail(ItemId(item_id))).await? {
                View::ItemDetail(view) => print!("{}", render::item_detail(&view)),
                other => bail!("unexpected view for item detail: {other:?}"),
            }
        }
        Command::Types => {
            let types = controller.client().item_types().await?;
            print!("{}", render::type_choices(&types));
        }
        Command::Create {
            title,
            text,
            duration,
            item_type,
        } => {
            let draft = ItemDraft {
                text,
                duration,
                item_type,
                ..ItemDraft::titled(title)
            };
            let saved = controller.create(&draft).await?;
            println!("created item {}", saved.item.id.0);
        }
        Command::Rename { item_id, title } => {
            let mut item = controller.client().items.find(ItemId(item_id)).await?;
            item.title = title;
            let saved = controller.update(&item).await?;
            println!("renamed item {} to '{}'", saved.item.id.0, saved.item.title);
        }
        Command::Delete { item_id } => {
            controller.delete(ItemId(item_id)).await?;
            println!("deleted item {item_id}");
        }
        Command::CloseList { item_id } => set_list_closed(&controller, item_id, true).await?,
        Command::OpenList { item_id } => set_list_closed(&controller, item_id, false).await?,
        Command::AddSpeaker { item_id, user_id } => {
            let alert = controller.add_speaker(ItemId(item_id), UserId(user_id)).await;
            report(alert, "speaker added")?;
        }
        Command::RemoveSpeaker {
            item_id,
            speaker_id,
        } => {
            let alert = controller
                .remove_speaker(ItemId(item_id), SpeakerId(speaker_id))
                .await;
            report(alert, "speaker removed")?;
        }
        Command::BeginSpeech { item_id, speaker } => {
            let alert = controller
                .begin_speech(ItemId(item_id), speaker.map(SpeakerId))
                .await;
            report(alert, "speech started")?;
        }
        Command::EndSpeech { item_id } => {
            let alert = controller.end_speech(ItemId(item_id)).await;
            report(alert, "speech ended")?;
        }
        Command::ProjectAgenda => {
            controller.project_agenda().await?;
            println!("agenda projected");
        }
        Command::ProjectSpeakers { item_id } => {
            controller.project_list_of_speakers(ItemId(item_id)).await?;
            println!("list of speakers of item {item_id} projected");
        }
        Command::Slides => {
            let projector = controller.client().projector().await?;
            for element in &projector.elements {
                match resolve_slide(controller.client(), element).await {
                    Ok(Slide::ItemList(slide)) => print!("{}", render::slide_item_list(&slide)),
                    Ok(Slide::Item(slide)) if slide.is_list_of_speakers => {
                        println!("List of speakers: {}", slide.item.title);
                        for row in &slide.speakers {
                            println!("  {}", row.name);
                        }
                    }
                    Ok(Slide::Item(slide)) => println!("{}", slide.item.title),
                    Err(err) => println!("{} ({err})", element.name),
                }
            }
        }
        Command::Sort { tree_file } => {
            let raw = fs::read_to_string(&tree_file)
                .with_context(|| format!("failed to read '{}'", tree_file.display()))?;
            let tree: Vec<TreeNode> = serde_json::from_str(&raw)
                .with_context(|| format!("'{}' is not an agenda tree", tree_file.display()))?;
            controller.sort_dropped(&tree).await?;
            println!("agenda order saved");
        }
        Command::Import {
            drafts_file,
            concurrency,
        } => {
            let raw = fs::read_to_string(&drafts_file)
                .with_context(|| format!("failed to read '{}'", drafts_file.display()))?;
            let drafts: Vec<ItemDraft> = serde_json::from_str(&raw).with_context(|| {
                format!("'{}' is not a list of agenda items", drafts_file.display())
            })?;
            let report = controller
                .importer()
                .with_concurrency(concurrency.unwrap_or(settings.import_concurrency))
                .run(drafts)
                .await;
            print!("{}", render::import_report(&report));
            if report.failed() > 0 {
                bail!("{} item(s) failed to import", report.failed());
            }
        }
    }

    Ok(())
}

async fn set_list_closed(controller: &AgendaController, item_id: i64, closed: bool) -> Result<()> {
    let item = controller.client().items.find(ItemId(item_id)).await?;
    let saved = controller.close_list(&item, closed).await?;
    let state = if saved.speaker_list_closed { "closed" } else { "open" };
    println!("list of speakers of item {item_id} is {state}");
    Ok(())
}

fn report(alert: Alert, success: &str) -> Result<()> {
    match alert.message() {
        Some(detail) => bail!("{detail}"),
        None => {
            println!("{success}");
            Ok(())
        }
    }
}
