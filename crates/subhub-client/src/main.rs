use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use subhub_client::{ClientConfig, SubhubClient, Workspace};
use subhub_shared::link::extract_file_id;
use subhub_shared::{FileId, SubscriptionId};
use subhub_store::{Database, SavedSubscription, SubscriptionDraft};
use tracing_subscriber::EnvFilter;

/// Save, publish and manage subscription texts.
#[derive(Parser)]
#[command(name = "subhub", version, about)]
struct Cli {
    /// subhub server base URL (overrides SUBHUB_SERVER)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Local database file (overrides SUBHUB_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List saved subscriptions
    List,
    /// Show one saved subscription
    Show {
        id: SubscriptionId,
        #[arg(long)]
        password: Option<String>,
    },
    /// Save a new subscription locally
    Save {
        #[arg(long)]
        title: String,
        #[command(flatten)]
        content: ContentArgs,
        /// Protect the entry with this password
        #[arg(long)]
        password: Option<String>,
    },
    /// Edit a saved subscription and re-upload its content
    Update {
        id: SubscriptionId,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        content: ContentArgs,
        /// Current password, if the entry is protected
        #[arg(long)]
        password: Option<String>,
        /// Set or change the password
        #[arg(long, conflicts_with = "remove_password")]
        new_password: Option<String>,
        /// Drop password protection
        #[arg(long)]
        remove_password: bool,
    },
    /// Upload a saved subscription and store the returned link
    Publish {
        id: SubscriptionId,
        #[arg(long)]
        password: Option<String>,
    },
    /// Upload text without saving it
    Upload {
        #[command(flatten)]
        content: ContentArgs,
        /// Link (or file ID) of an earlier upload to replace
        #[arg(long)]
        replace: Option<String>,
    },
    /// Print the text stored under a file ID or link
    Fetch { id_or_link: String },
    /// Record a short link for a saved subscription
    ShortLink {
        id: SubscriptionId,
        url: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete a saved subscription
    Delete {
        id: SubscriptionId,
        #[arg(long)]
        password: Option<String>,
    },
    /// List configured converter backends
    Backends,
}

#[derive(Args)]
struct ContentArgs {
    /// Subscription text
    #[arg(long, conflicts_with = "file")]
    content: Option<String>,
    /// Read the subscription text from a file (`-` for stdin)
    #[arg(long)]
    file: Option<PathBuf>,
}

impl ContentArgs {
    fn read(&self) -> Result<Option<String>> {
        if let Some(content) = &self.content {
            return Ok(Some(content.clone()));
        }
        match &self.file {
            Some(path) if path.as_os_str() == "-" => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                Ok(Some(buf))
            }
            Some(path) => Ok(Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?,
            )),
            None => Ok(None),
        }
    }

    fn require(&self) -> Result<String> {
        match self.read()? {
            Some(content) => Ok(content),
            None => bail!("pass --content or --file"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,subhub_client=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(server) = cli.server {
        config.server_url = server.trim_end_matches('/').to_string();
    }
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }

    match cli.command {
        Command::Backends => {
            for backend in &config.backends {
                println!("{backend}");
            }
        }
        Command::List => {
            let subs = open_workspace(&config)?.list();
            if subs.is_empty() {
                println!("No saved subscriptions");
            }
            for sub in subs {
                let lock = if sub.has_password { " [locked]" } else { "" };
                println!("{}  {}{}", sub.id, sub.title, lock);
            }
        }
        Command::Show { id, password } => {
            let mut workspace = open_workspace(&config)?;
            let sub = workspace.open(id, password.as_deref())?;
            print_subscription(&sub);
        }
        Command::Save {
            title,
            content,
            password,
        } => {
            let mut draft = SubscriptionDraft::new(title, content.require()?);
            if let Some(password) = password {
                draft = draft.with_password(password);
            }
            let sub = open_workspace(&config)?.save(draft)?;
            println!("Saved {}", sub.id);
        }
        Command::Update {
            id,
            title,
            content,
            password,
            new_password,
            remove_password,
        } => {
            let mut workspace = open_workspace(&config)?;
            let existing = workspace.open(id, password.as_deref())?;
            let draft = SubscriptionDraft {
                title: title.unwrap_or(existing.title),
                content: content.read()?.unwrap_or(existing.content),
                has_password: !remove_password
                    && (existing.has_password || new_password.is_some()),
                password: new_password.unwrap_or_default(),
            };
            let sub = workspace.update(id, draft, password.as_deref()).await?;
            print_subscription(&sub);
        }
        Command::Publish { id, password } => {
            let sub = open_workspace(&config)?.publish(id, password.as_deref()).await?;
            println!("{}", sub.sub_link.unwrap_or_default());
        }
        Command::Upload { content, replace } => {
            let link = open_workspace(&config)?
                .publish_text(&content.require()?, replace.as_deref().map(replace_link).as_deref())
                .await?;
            println!("{link}");
        }
        Command::Fetch { id_or_link } => {
            let id = match extract_file_id(&id_or_link) {
                Some(id) => id,
                None => FileId::parse(&id_or_link)?,
            };
            match open_workspace(&config)?.fetch(&id).await? {
                Some(content) => print!("{content}"),
                None => bail!("subscription {id} not found"),
            }
        }
        Command::ShortLink { id, url, password } => {
            open_workspace(&config)?.set_short_link(id, url, password.as_deref())?;
            println!("Short link saved");
        }
        Command::Delete { id, password } => {
            open_workspace(&config)?.delete(id, password.as_deref())?;
            println!("Deleted {id}");
        }
    }

    Ok(())
}

fn open_workspace(config: &ClientConfig) -> Result<Workspace<Database>> {
    let db = match &config.db_path {
        Some(path) => Database::open_at(path)?,
        None => Database::new()?,
    };
    Ok(Workspace::new(db, SubhubClient::new(config.server_url.clone())))
}

/// Accept either a previously returned link or a bare file ID.
fn replace_link(value: &str) -> String {
    if extract_file_id(value).is_some() {
        value.to_string()
    } else {
        format!("/api/sub/{value}")
    }
}

fn print_subscription(sub: &SavedSubscription) {
    println!("id:         {}", sub.id);
    println!("title:      {}", sub.title);
    println!("protected:  {}", sub.has_password);
    println!("link:       {}", sub.sub_link.as_deref().unwrap_or("-"));
    println!("short link: {}", sub.short_sub_link.as_deref().unwrap_or("-"));
    println!("created:    {}", sub.created_at.to_rfc3339());
    println!("updated:    {}", sub.updated_at.to_rfc3339());
    println!();
    println!("{}", sub.content);
}
