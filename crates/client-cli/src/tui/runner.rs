//! Terminal loop. Draws, reads keys, and runs `Action`s as tokio tasks whose
//! results come back over a channel.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::Instrument;
use uuid::Uuid;

use super::app::{Action, App, Completion, Outcome, Ticket};
use super::views;
use crate::admin::{AdminClient, AdminOverview};
use crate::billing::BillingClient;
use crate::config::Config;
use crate::error::ClientResult;
use crate::gallery::GalleryClient;
use crate::gateway::Gateway;
use crate::generation::GenerationClient;
use crate::session::SessionStore;

/// Everything the UI can call
#[derive(Clone)]
pub struct Services {
    pub store: Arc<SessionStore>,
    pub generation: GenerationClient,
    pub gallery: GalleryClient,
    pub admin: AdminClient,
    pub billing: BillingClient,
}

impl Services {
    pub fn new(gateway: Arc<dyn Gateway>, store: Arc<SessionStore>) -> Self {
        Self {
            store,
            generation: GenerationClient::new(gateway.clone()),
            gallery: GalleryClient::new(gateway.clone()),
            admin: AdminClient::new(gateway.clone()),
            billing: BillingClient::new(gateway),
        }
    }
}

/// Restores the terminal even when the loop bails out early
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }
}

pub async fn run(services: Services, mut config: Config) -> Result<()> {
    let mut app = App::new(
        config.client.language,
        config.client.default_size,
        config.client.default_model.clone(),
    )
    .with_share_base_url(config.client.share_base_url.clone());

    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut session_rx = services.store.subscribe();

    // First paint does not wait for verification
    {
        let store = services.store.clone();
        let tx = tx.clone();
        let ticket = app.ticket();
        tokio::spawn(async move {
            let outcome = Outcome::SessionLoaded(store.load().await);
            let _ = tx.send(Completion { ticket, outcome });
        });
    }

    let mut guard = TerminalGuard::enter()?;

    while !app.should_quit() {
        let mut actions = Vec::new();

        if session_rx.has_changed().unwrap_or(false) {
            let state = session_rx.borrow_and_update().clone();
            actions.extend(app.sync_session(state, services.store.epoch()));
        }

        while let Ok(done) = rx.try_recv() {
            actions.extend(app.apply(done));
        }

        guard.terminal.draw(|f| views::draw(f, &app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    actions.extend(app.handle_key(key.code, key.modifiers));
                }
            }
        }

        for action in actions {
            dispatch(action, &services, &mut config, &tx);
        }
    }

    drop(guard);
    Ok(())
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::Login { .. } => "login",
        Action::Register { .. } => "register",
        Action::RequestReset { .. } => "request_reset",
        Action::CompleteReset { .. } => "complete_reset",
        Action::Logout => "logout",
        Action::Generate { .. } => "generate",
        Action::LoadGallery { .. } => "load_gallery",
        Action::LoadAdmin { .. } => "load_admin",
        Action::CreatePromo { .. } => "create_promo",
        Action::TogglePromo { .. } => "toggle_promo",
        Action::RedeemPromo { .. } => "redeem_promo",
        Action::BuyPlan { .. } => "buy_plan",
        Action::SaveLanguage(_) => "save_language",
    }
}

fn spawn_with<F>(tx: &UnboundedSender<Completion>, ticket: Ticket, name: &'static str, work: F)
where
    F: std::future::Future<Output = Outcome> + Send + 'static,
{
    let tx = tx.clone();
    let span = tracing::debug_span!("action", id = %Uuid::new_v4(), name);
    tokio::spawn(
        async move {
            let outcome = work.await;
            tracing::debug!("finished");
            // The UI may already be gone
            let _ = tx.send(Completion { ticket, outcome });
        }
        .instrument(span),
    );
}

/// Drop the session when the server says it is no longer valid
async fn checked<T>(store: &SessionStore, result: ClientResult<T>) -> ClientResult<T> {
    if let Err(e) = &result {
        if e.invalidates_session() {
            store.invalidate().await;
        }
    }
    result
}

fn dispatch(action: Action, services: &Services, config: &mut Config, tx: &UnboundedSender<Completion>) {
    let name = action_name(&action);
    let s = services.clone();

    match action {
        Action::SaveLanguage(lang) => {
            config.client.language = lang;
            if let Err(e) = config.save() {
                tracing::warn!("failed to save language: {}", e);
            }
        }
        Action::Logout => {
            tokio::spawn(async move { s.store.logout().await });
        }
        Action::Login { ticket, email, password } => spawn_with(tx, ticket, name, async move {
            Outcome::LoggedIn(s.store.login(&email, &password).await.map(|_| ()))
        }),
        Action::Register { ticket, form } => spawn_with(tx, ticket, name, async move {
            let result = s.store.auth().register(&form).await;
            Outcome::Registered {
                email: form.email.trim().to_string(),
                result,
            }
        }),
        Action::RequestReset { ticket, email } => spawn_with(tx, ticket, name, async move {
            Outcome::ResetRequested(s.store.auth().request_password_reset(&email).await)
        }),
        Action::CompleteReset {
            ticket,
            token,
            password,
            confirm,
        } => spawn_with(tx, ticket, name, async move {
            Outcome::ResetCompleted(
                s.store
                    .auth()
                    .complete_password_reset(&token, &password, &confirm)
                    .await,
            )
        }),
        Action::Generate { ticket, request } => spawn_with(tx, ticket, name, async move {
            Outcome::Generated(s.generation.run(&s.store, &request).await)
        }),
        Action::LoadGallery { ticket } => spawn_with(tx, ticket, name, async move {
            let result = match s.store.ensure_verified().await {
                Ok(session) => s.gallery.list_user_images(&session).await,
                Err(e) => Err(e),
            };
            Outcome::Gallery(checked(&s.store, result).await)
        }),
        Action::LoadAdmin { ticket } => spawn_with(tx, ticket, name, async move {
            let overview = match s.store.ensure_verified().await {
                Ok(session) => s.admin.overview(&session).await,
                Err(e) => AdminOverview {
                    stats: Err(e.clone()),
                    users: Err(e.clone()),
                    images: Err(e.clone()),
                    promos: Err(e),
                },
            };
            let stats = checked(&s.store, overview.stats).await;
            Outcome::Admin(AdminOverview { stats, ..overview })
        }),
        Action::CreatePromo {
            ticket,
            generations,
            max_uses,
        } => spawn_with(tx, ticket, name, async move {
            let result = match s.store.ensure_verified().await {
                Ok(session) => s.admin.create_promo(&session, generations, max_uses).await,
                Err(e) => Err(e),
            };
            Outcome::PromoCreated(checked(&s.store, result).await)
        }),
        Action::TogglePromo { ticket, promo_id } => spawn_with(tx, ticket, name, async move {
            let result = match s.store.ensure_verified().await {
                Ok(session) => s.admin.toggle_promo(&session, promo_id).await,
                Err(e) => Err(e),
            };
            let result = checked(&s.store, result).await;
            Outcome::PromoToggled { promo_id, result }
        }),
        Action::RedeemPromo { ticket, code } => spawn_with(tx, ticket, name, async move {
            Outcome::PromoRedeemed(s.billing.redeem_promo(&s.store, &code).await)
        }),
        Action::BuyPlan { ticket, plan } => spawn_with(tx, ticket, name, async move {
            Outcome::OrderCreated(s.billing.create_order(&s.store, plan).await)
        }),
    }
}
