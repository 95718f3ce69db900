use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::{
    AddPhotoshootRequest, AddShowcaseRequest, ImageSize, Language, PaidPlan, PromoId, ShowcaseId,
    ShowcaseUpdate, Theme, GALLERY_CATEGORY,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use photoset::admin::AdminClient;
use photoset::auth::{AuthClient, Registration, ResetOutcome};
use photoset::billing::BillingClient;
use photoset::config::{self, Config};
use photoset::gallery::GalleryClient;
use photoset::gateway::{Gateway, HttpGateway};
use photoset::generation::{GenerationClient, GenerationRequest, GenerationResult, Persistence, Remaining};
use photoset::search::{self, SearchAction};
use photoset::session::{FileStorage, Session, SessionStore};
use photoset::{i18n, share, tui};

#[derive(Parser)]
#[command(name = "photoset")]
#[command(about = "PhotoSet AI client - generate themed photoshoots from the terminal")]
#[command(version = env!("PHOTOSET_VERSION"))]
struct Cli {
    /// Display language (overrides config)
    #[arg(long, global = true)]
    lang: Option<Language>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive interface (default)
    Tui,
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the cached session
    Logout,
    /// Show the signed-in account and its balance
    Whoami,
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        full_name: Option<String>,
        /// Accept the terms of use
        #[arg(long)]
        accept_terms: bool,
    },
    /// Request or complete a password reset
    ResetPassword {
        #[command(subcommand)]
        action: ResetAction,
    },
    /// Generate an image
    Generate {
        /// Prompt text; may be empty when a theme is given
        prompt: Vec<String>,
        #[arg(long)]
        theme: Option<Theme>,
        #[arg(long)]
        size: Option<ImageSize>,
        #[arg(long)]
        model: Option<String>,
    },
    /// List your saved images
    Gallery,
    /// Search sections and themes
    Search { query: Vec<String> },
    /// Redeem a promo code
    Redeem { code: String },
    /// Start checkout for a plan (starter, standard, premium)
    Buy { plan: PaidPlan },
    /// Capture an approved checkout order
    Capture { order_id: String },
    /// Print share links for an image
    Share {
        image_url: String,
        #[arg(long, default_value = "")]
        prompt: String,
    },
    /// Admin operations
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ResetAction {
    /// Ask for a reset token
    Request {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with a reset token
    Complete {
        #[arg(long)]
        token: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Platform counters
    Stats,
    /// All users
    Users,
    /// All generated images
    Images,
    /// All promo codes
    Promos,
    /// Create a promo code
    CreatePromo {
        #[arg(long)]
        generations: Option<u32>,
        #[arg(long)]
        max_uses: Option<u32>,
    },
    /// Flip a promo code between active and inactive
    TogglePromo { id: PromoId },
    /// Curated gallery items of a category
    Gallery {
        #[arg(long, default_value = GALLERY_CATEGORY)]
        category: String,
    },
    /// Add a curated gallery item
    GalleryAdd {
        image_url: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        theme: String,
        #[arg(long, default_value = GALLERY_CATEGORY)]
        category: String,
    },
    /// Edit or hide a curated gallery item
    GalleryUpdate {
        id: ShowcaseId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        visible: Option<bool>,
    },
    /// Photoshoot examples
    Photoshoots,
    /// Add a photoshoot example
    PhotoshootAdd {
        image_url: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        theme: String,
        #[arg(long, default_value = "Image")]
        icon: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set a configuration value
    Set {
        /// Configuration key, e.g. endpoints.generate
        key: String,
        /// Configuration value
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Show all configuration
    Show,
    /// Get the config file path
    Path,
}

/// The TUI owns the terminal, so its logs go to a file instead
fn init_tracing(to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "photoset=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if to_file {
        let path = Config::data_dir()?.join("photoset.log");
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        registry
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(io::stderr)).init();
    }
    Ok(())
}

struct Clients {
    gateway: Arc<dyn Gateway>,
    store: Arc<SessionStore>,
}

impl Clients {
    fn new(config: &Config) -> Result<Self> {
        let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::from_config(config)?);
        let storage = Arc::new(FileStorage::in_data_dir()?);
        let store = Arc::new(SessionStore::new(
            AuthClient::new(gateway.clone()),
            storage,
            config.client.verify_timeout(),
        ));
        Ok(Self { gateway, store })
    }

    /// Load the cached session and verify it with the server
    async fn session(&self) -> Result<Session> {
        self.store.load().await?;
        Ok(self.store.ensure_verified().await?)
    }
}

fn read_line(prompt: &str) -> Result<String> {
    eprint!("{}: ", prompt);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    init_tracing(matches!(command, Commands::Tui))?;

    let mut config = Config::load()?;
    if let Some(lang) = cli.lang {
        config.client.language = lang;
    }

    match command {
        Commands::Config { action } => handle_config_command(action),
        Commands::Share { image_url, prompt } => {
            for link in share::share_links(&config.client.share_base_url, &image_url, &prompt, config.client.language) {
                println!("{:<10} {}", link.platform, link.url);
            }
            Ok(())
        }
        Commands::Search { query } => {
            let query = query.join(" ");
            if !search::is_open(&query) {
                return Ok(());
            }
            let strings = i18n::strings(config.client.language);
            for hit in search::search(&query, config.client.language) {
                let target = match hit.action {
                    SearchAction::Navigate(_) => strings.search.section,
                    SearchAction::SelectTheme(_) => strings.search.theme,
                };
                println!("{:<24} {}", hit.label, target);
            }
            Ok(())
        }
        command => {
            let clients = Clients::new(&config)?;
            run_command(command, &clients, &config).await
        }
    }
}

async fn run_command(command: Commands, clients: &Clients, config: &Config) -> Result<()> {
    let store = &clients.store;
    let strings = i18n::strings(config.client.language);

    match command {
        Commands::Tui => {
            let services = tui::Services::new(clients.gateway.clone(), store.clone());
            tui::run(services, config.clone()).await?;
        }
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_line(strings.forms.password)?,
            };
            let session = store.login(&email, &password).await?;
            println!("{} ({})", strings.notices.signed_in, session.user.display_name());
        }
        Commands::Logout => {
            store.logout().await;
            println!("{}", strings.notices.signed_out);
        }
        Commands::Whoami => {
            store.load().await?;
            match store.snapshot().user() {
                Some(user) => {
                    println!("{} <{}>", user.display_name(), user.email);
                    println!("{}: {}", strings.profile.plan, user.plan);
                    println!("{}: {}", strings.profile.credits_left, user.credits);
                    println!(
                        "{}: {} / {}",
                        strings.profile.free_left,
                        user.free_generations_remaining(),
                        user.free_generations_limit
                    );
                    if user.is_admin {
                        println!("admin");
                    }
                }
                None => println!("{}", strings.profile.signed_out),
            }
        }
        Commands::Register {
            email,
            username,
            full_name,
            accept_terms,
        } => {
            let password = read_line(strings.forms.password)?;
            let confirm_password = read_line(strings.forms.confirm_password)?;
            let form = Registration {
                email,
                username,
                full_name,
                password,
                confirm_password,
                accept_terms,
            };
            store.auth().register(&form).await?;
            println!("{}. photoset login --email {}", strings.notices.registered, form.email.trim());
        }
        Commands::ResetPassword { action } => match action {
            ResetAction::Request { email } => match store.auth().request_password_reset(&email).await? {
                ResetOutcome::TokenIssued { token, expires_at } => {
                    println!("{}: {}", strings.forms.reset_token, token);
                    if let Some(expires_at) = expires_at {
                        println!("expires: {}", expires_at);
                    }
                }
                ResetOutcome::EmailSent { message } => {
                    println!("{}", message.as_deref().unwrap_or(strings.notices.reset_sent));
                }
            },
            ResetAction::Complete { token } => {
                let password = read_line(strings.forms.password)?;
                let confirm = read_line(strings.forms.confirm_password)?;
                store
                    .auth()
                    .complete_password_reset(&token, &password, &confirm)
                    .await?;
                println!("{}", strings.notices.reset_done);
            }
        },
        Commands::Generate {
            prompt,
            theme,
            size,
            model,
        } => {
            let request = GenerationRequest::new(prompt.join(" "))
                .with_theme(theme)
                .with_size(size.unwrap_or(config.client.default_size))
                .with_model(model.unwrap_or_else(|| config.client.default_model.clone()));
            request.effective_prompt()?;
            store.load().await?;

            let generation = GenerationClient::new(clients.gateway.clone()).run(store, &request).await;
            match generation.result {
                GenerationResult::Success { image, remaining } => {
                    println!("{}", image.image_url);
                    if generation.used_fallback_prompt {
                        eprintln!("{}", strings.generator.fallback_prompt_note);
                    }
                    match remaining {
                        Remaining::FreeGenerations(n) => eprintln!("{}: {}", strings.generator.free_left, n),
                        Remaining::Credits(n) => eprintln!("{}: {}", strings.generator.credits_left, n),
                        Remaining::Unreported => {}
                    }
                    if let Some(Persistence::Failed { reason }) = generation.persistence {
                        eprintln!("{}: {}", strings.notices.not_saved, reason);
                    }
                }
                GenerationResult::QuotaExceeded(quota) => {
                    eprintln!("{}: {}", strings.errors.quota, quota);
                    eprintln!("photoset buy <starter|standard|premium>  /  photoset redeem <code>");
                }
                GenerationResult::Error(e) => return Err(e.into()),
            }
        }
        Commands::Gallery => {
            let session = clients.session().await?;
            let images = GalleryClient::new(clients.gateway.clone())
                .list_user_images(&session)
                .await?;
            if images.is_empty() {
                println!("{}", strings.gallery.empty);
            }
            for image in images {
                let star = if image.is_favorite { "*" } else { " " };
                println!("{} {}  {}", star, image.image_url, image.prompt);
            }
        }
        Commands::Redeem { code } => {
            store.load().await?;
            let resp = BillingClient::new(clients.gateway.clone()).redeem_promo(store, &code).await?;
            println!("{}: +{}", strings.notices.promo_redeemed, resp.generations_added);
        }
        Commands::Buy { plan } => {
            store.load().await?;
            let order = BillingClient::new(clients.gateway.clone()).create_order(store, plan).await?;
            println!("{}: {}", strings.notices.order_created, order.order_id);
            if let Some(link) = order.approve_link {
                println!("{}", link);
            }
            println!("photoset capture {}", order.order_id);
        }
        Commands::Capture { order_id } => {
            store.load().await?;
            let resp = BillingClient::new(clients.gateway.clone())
                .capture_order(store, &order_id)
                .await?;
            let status = resp.status.as_deref().unwrap_or("completed");
            println!("{} ({}): +{}", resp.order_id, status, resp.credits_added);
        }
        Commands::Admin { action } => {
            let session = clients.session().await?;
            handle_admin_command(action, &AdminClient::new(clients.gateway.clone()), &session).await?;
        }
        Commands::Config { .. } | Commands::Share { .. } | Commands::Search { .. } => {}
    }
    Ok(())
}

async fn handle_admin_command(action: AdminAction, admin: &AdminClient, session: &Session) -> Result<()> {
    match action {
        AdminAction::Stats => {
            let stats = admin.list_stats(session).await?;
            println!("total_users: {}", stats.total_users);
            println!("total_images: {}", stats.total_images);
            println!("total_credits_used: {}", stats.total_credits_used);
            println!("active_users: {}", stats.active_users_this_week);
        }
        AdminAction::Users => {
            for user in admin.list_users(session).await? {
                println!(
                    "{:>6}  {:<32} {:<10} credits={} free_used={}",
                    user.id, user.email, user.plan, user.credits, user.free_generations_used
                );
            }
        }
        AdminAction::Images => {
            for image in admin.list_images(session).await? {
                let owner = image.owner.username.unwrap_or_else(|| image.owner.id.to_string());
                println!("{:<16} {}  {}", owner, image.image_url, image.prompt);
            }
        }
        AdminAction::Promos => {
            for promo in admin.list_promos(session).await? {
                let max = promo.max_uses.map(|m| m.to_string()).unwrap_or_else(|| "-".to_string());
                let state = if promo.is_active { "active" } else { "inactive" };
                println!(
                    "{:>4}  {:<14} +{:<4} used {}/{}  {}",
                    promo.id, promo.code, promo.generations_granted, promo.used_count, max, state
                );
            }
        }
        AdminAction::CreatePromo { generations, max_uses } => {
            let created = admin.create_promo(session, generations, max_uses).await?;
            println!("{}", created.promo_code);
        }
        AdminAction::TogglePromo { id } => {
            let active = admin.toggle_promo(session, id).await?;
            println!("{}: {}", id, if active { "active" } else { "inactive" });
        }
        AdminAction::Gallery { category } => {
            for item in admin.list_gallery(session, &category).await? {
                let state = if item.is_visible { "visible" } else { "hidden" };
                println!(
                    "{:>4}  {:<7} {}  {}",
                    item.id,
                    state,
                    item.image_url,
                    item.title.unwrap_or_default()
                );
            }
        }
        AdminAction::GalleryAdd {
            image_url,
            title,
            description,
            theme,
            category,
        } => {
            let item = AddShowcaseRequest {
                image_url,
                title,
                description,
                theme,
                category,
            };
            println!("{}", admin.add_gallery(session, &item).await?);
        }
        AdminAction::GalleryUpdate {
            id,
            title,
            description,
            image_url,
            visible,
        } => {
            let update = ShowcaseUpdate {
                id,
                title,
                description,
                image_url,
                is_visible: visible,
            };
            admin.update_gallery(session, &update).await?;
            println!("{}: updated", id);
        }
        AdminAction::Photoshoots => {
            for example in admin.list_photoshoots(session).await? {
                println!(
                    "{:>4}  {:<12} {}  {}",
                    example.id,
                    example.theme_id.unwrap_or_default(),
                    example.image_url,
                    example.title
                );
            }
        }
        AdminAction::PhotoshootAdd {
            image_url,
            title,
            description,
            theme,
            icon,
        } => {
            let example = AddPhotoshootRequest {
                image_url,
                title,
                description,
                theme_id: theme,
                icon,
            };
            println!("{}", admin.add_photoshoot(session, &example).await?);
        }
    }
    Ok(())
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value } => {
            let mut config = Config::load().unwrap_or_default();
            config.set(&key, &value)?;
            config.save()?;
            println!("Configuration saved");
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Show => {
            let config = Config::load()?;
            for key in config::KEYS {
                println!("{}: {}", key, config.get(key)?);
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
