//! Terminal UI state.
//!
//! `App` owns no I/O. Key presses and finished requests go in, `Action`s come
//! out; the runner executes the actions and feeds their `Completion`s back.
//! Every completion carries the `Ticket` it was issued under so results that
//! arrive after the user moved on, or after the session changed, are dropped.

use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyModifiers};
use shared::{
    ActivatePromoResponse, AdminStats, CreateOrderResponse, CreatePromoResponse, GeneratedImage,
    ImageSize, Language, PaidPlan, PromoCode, PromoId, Theme, UserSummary,
};

use crate::admin::AdminOverview;
use crate::auth::{Registration, ResetOutcome};
use crate::error::{AuthError, ClientError, ClientResult, Level, Notification};
use crate::gallery::{Gallery, GalleryItem};
use crate::generation::{Generation, GenerationRequest, GenerationResult, Persistence, Remaining};
use crate::i18n::{self, Section, Strings};
use crate::search::{self, SearchAction, SearchHit};
use crate::session::SessionState;

const MAX_NOTIFICATIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Generator,
    Gallery,
    Examples,
    Prompts,
    Faq,
    Pricing,
    Support,
    Profile,
    Admin,
    Login,
    Register,
    ResetPassword,
}

impl From<Section> for View {
    fn from(section: Section) -> Self {
        match section {
            Section::Home => View::Home,
            Section::Generator => View::Generator,
            Section::Gallery => View::Gallery,
            Section::Examples => View::Examples,
            Section::Prompts => View::Prompts,
            Section::Faq => View::Faq,
            Section::Pricing => View::Pricing,
            Section::Support => View::Support,
            Section::Profile => View::Profile,
            Section::Admin => View::Admin,
        }
    }
}

impl View {
    pub fn section(&self) -> Option<Section> {
        Section::ALL.into_iter().find(|s| View::from(*s) == *self)
    }
}

/// Identifies the screen and session a request was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub view_epoch: u64,
    pub session_epoch: u64,
}

/// Side effects requested by the UI
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Login { ticket: Ticket, email: String, password: String },
    Register { ticket: Ticket, form: Registration },
    RequestReset { ticket: Ticket, email: String },
    CompleteReset { ticket: Ticket, token: String, password: String, confirm: String },
    Logout,
    Generate { ticket: Ticket, request: GenerationRequest },
    LoadGallery { ticket: Ticket },
    LoadAdmin { ticket: Ticket },
    CreatePromo { ticket: Ticket, generations: Option<u32>, max_uses: Option<u32> },
    TogglePromo { ticket: Ticket, promo_id: PromoId },
    RedeemPromo { ticket: Ticket, code: String },
    BuyPlan { ticket: Ticket, plan: PaidPlan },
    SaveLanguage(Language),
}

#[derive(Debug)]
pub enum Outcome {
    SessionLoaded(ClientResult<()>),
    LoggedIn(ClientResult<()>),
    Registered { email: String, result: ClientResult<Option<UserSummary>> },
    ResetRequested(ClientResult<ResetOutcome>),
    ResetCompleted(ClientResult<()>),
    Generated(Generation),
    Gallery(ClientResult<Vec<GeneratedImage>>),
    Admin(AdminOverview),
    PromoCreated(ClientResult<CreatePromoResponse>),
    PromoToggled { promo_id: PromoId, result: ClientResult<bool> },
    PromoRedeemed(ClientResult<ActivatePromoResponse>),
    OrderCreated(ClientResult<CreateOrderResponse>),
}

/// How much of the ticket must still match for a result to apply
enum Scope {
    Always,
    /// Identity flows change the session themselves
    View,
    /// App-level state, valid for as long as the same user is signed in
    Session,
    ViewAndSession,
}

impl Outcome {
    fn scope(&self) -> Scope {
        match self {
            Outcome::SessionLoaded(_) => Scope::Always,
            Outcome::LoggedIn(_)
            | Outcome::Registered { .. }
            | Outcome::ResetRequested(_)
            | Outcome::ResetCompleted(_) => Scope::View,
            Outcome::Generated(_) => Scope::Session,
            _ => Scope::ViewAndSession,
        }
    }
}

#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Email,
    Password,
    ConfirmPassword,
    Username,
    FullName,
    AcceptTerms,
    ResetToken,
    Generations,
    MaxUses,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub key: FieldKey,
    pub value: String,
    pub secret: bool,
    /// Checkbox state for toggle fields
    pub checked: Option<bool>,
}

enum FormInput {
    Submit,
    Consumed,
    Ignored,
}

/// Vertical list of inputs; Up/Down move, Enter advances and submits on the last
#[derive(Debug, Clone)]
pub struct Form {
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    fn new(fields: Vec<Field>) -> Self {
        Self { fields, focus: 0 }
    }

    fn text(key: FieldKey) -> Field {
        Field {
            key,
            value: String::new(),
            secret: false,
            checked: None,
        }
    }

    fn secret(key: FieldKey) -> Field {
        Field {
            secret: true,
            ..Self::text(key)
        }
    }

    fn toggle(key: FieldKey) -> Field {
        Field {
            checked: Some(false),
            ..Self::text(key)
        }
    }

    fn login() -> Self {
        Self::new(vec![Self::text(FieldKey::Email), Self::secret(FieldKey::Password)])
    }

    fn register() -> Self {
        Self::new(vec![
            Self::text(FieldKey::Email),
            Self::text(FieldKey::Username),
            Self::text(FieldKey::FullName),
            Self::secret(FieldKey::Password),
            Self::secret(FieldKey::ConfirmPassword),
            Self::toggle(FieldKey::AcceptTerms),
        ])
    }

    fn reset_request() -> Self {
        Self::new(vec![Self::text(FieldKey::Email)])
    }

    fn reset_complete(token: Option<String>) -> Self {
        let mut form = Self::new(vec![
            Self::text(FieldKey::ResetToken),
            Self::secret(FieldKey::Password),
            Self::secret(FieldKey::ConfirmPassword),
        ]);
        if let Some(token) = token {
            form.set(FieldKey::ResetToken, token);
            form.focus = 1;
        }
        form
    }

    fn promo() -> Self {
        Self::new(vec![Self::text(FieldKey::Generations), Self::text(FieldKey::MaxUses)])
    }

    pub fn value(&self, key: FieldKey) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn checked(&self, key: FieldKey) -> bool {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .and_then(|f| f.checked)
            .unwrap_or(false)
    }

    fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.key == key) {
            field.value = value.into();
        }
    }

    fn handle(&mut self, code: KeyCode) -> FormInput {
        let last = self.fields.len().saturating_sub(1);
        let Some(field) = self.fields.get_mut(self.focus) else {
            return FormInput::Ignored;
        };
        match code {
            KeyCode::Enter if self.focus >= last => FormInput::Submit,
            KeyCode::Enter | KeyCode::Down => {
                self.focus = (self.focus + 1).min(last);
                FormInput::Consumed
            }
            KeyCode::Up => {
                self.focus = self.focus.saturating_sub(1);
                FormInput::Consumed
            }
            KeyCode::Char(' ') if field.checked.is_some() => {
                field.checked = field.checked.map(|c| !c);
                FormInput::Consumed
            }
            KeyCode::Char(c) if field.checked.is_none() => {
                field.value.push(c);
                FormInput::Consumed
            }
            KeyCode::Backspace => {
                field.value.pop();
                FormInput::Consumed
            }
            _ => FormInput::Ignored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenField {
    Prompt,
    Theme,
    Size,
    Model,
}

impl GenField {
    const ORDER: [GenField; 4] = [GenField::Prompt, GenField::Theme, GenField::Size, GenField::Model];

    fn step(self, delta: isize) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        let len = Self::ORDER.len() as isize;
        Self::ORDER[(idx + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone)]
pub struct LastImage {
    pub image: GeneratedImage,
    pub remaining: Remaining,
    pub saved: bool,
    pub fallback_prompt: bool,
}

#[derive(Debug, Clone)]
pub struct GeneratorState {
    pub prompt: String,
    pub theme: Option<Theme>,
    pub size: ImageSize,
    pub model: String,
    pub focus: GenField,
    pub last: Option<LastImage>,
}

impl GeneratorState {
    fn cycle_theme(&mut self, delta: isize) {
        // None sits before the first theme
        let len = Theme::ALL.len() as isize + 1;
        let idx = match self.theme {
            Some(t) => Theme::ALL.iter().position(|x| *x == t).map(|i| i as isize + 1).unwrap_or(0),
            None => 0,
        };
        let next = (idx + delta).rem_euclid(len);
        self.theme = if next == 0 {
            None
        } else {
            Some(Theme::ALL[(next - 1) as usize])
        };
    }
}

#[derive(Debug, Default)]
pub struct GalleryState {
    pub gallery: Gallery,
    pub selected: usize,
    pub loading: bool,
    pub show_share: bool,
}

impl GalleryState {
    pub fn items(&self) -> Vec<GalleryItem> {
        self.gallery.items()
    }

    pub fn selected_item(&self) -> Option<GalleryItem> {
        self.items().into_iter().nth(self.selected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Overview,
    Users,
    Images,
    Promos,
}

impl AdminTab {
    pub const ALL: [AdminTab; 4] = [AdminTab::Overview, AdminTab::Users, AdminTab::Images, AdminTab::Promos];

    fn step(self, delta: isize) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0) as isize;
        Self::ALL[(idx + delta).rem_euclid(Self::ALL.len() as isize) as usize]
    }
}

#[derive(Debug, Default)]
pub struct AdminState {
    pub tab: AdminTab,
    pub stats: Option<AdminStats>,
    pub users: Vec<UserSummary>,
    pub images: Vec<GeneratedImage>,
    pub promos: Vec<PromoCode>,
    pub selected: usize,
    pub promo_form: Option<Form>,
    pub loading: bool,
}

#[derive(Debug, Default)]
pub struct PricingState {
    /// Promo code being typed, when the input is open
    pub promo: Option<String>,
    pub last_order: Option<CreateOrderResponse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStep {
    Request,
    Complete,
}

#[derive(Debug, Default)]
pub struct SearchState {
    pub query: String,
    pub selected: usize,
}

impl SearchState {
    pub fn is_open(&self) -> bool {
        search::is_open(&self.query)
    }
}

pub struct App {
    pub(super) lang: Language,
    pub(super) view: View,
    view_epoch: u64,
    pub(super) session: SessionState,
    session_epoch: u64,
    logging_out: bool,
    pub(super) selected: usize,
    pub(super) generator: GeneratorState,
    pending_generation: Option<Ticket>,
    /// Quota ran out while the user was busy elsewhere
    pub(super) upgrade_due: bool,
    pub(super) gallery: GalleryState,
    pub(super) admin: AdminState,
    pub(super) pricing: PricingState,
    pub(super) login: Form,
    pub(super) register: Form,
    pub(super) reset: Form,
    pub(super) reset_step: ResetStep,
    pub(super) search: Option<SearchState>,
    pub(super) notifications: VecDeque<Notification>,
    pub(super) busy: bool,
    pub(super) share_base_url: String,
    should_quit: bool,
}

impl App {
    pub fn new(lang: Language, size: ImageSize, model: impl Into<String>) -> Self {
        Self {
            lang,
            view: View::Home,
            view_epoch: 0,
            session: SessionState::SignedOut,
            session_epoch: 0,
            logging_out: false,
            selected: 0,
            generator: GeneratorState {
                prompt: String::new(),
                theme: None,
                size,
                model: model.into(),
                focus: GenField::Prompt,
                last: None,
            },
            pending_generation: None,
            upgrade_due: false,
            gallery: GalleryState::default(),
            admin: AdminState::default(),
            pricing: PricingState::default(),
            login: Form::login(),
            register: Form::register(),
            reset: Form::reset_request(),
            reset_step: ResetStep::Request,
            search: None,
            notifications: VecDeque::new(),
            busy: false,
            share_base_url: crate::config::DEFAULT_SHARE_BASE_URL.to_string(),
            should_quit: false,
        }
    }

    pub fn with_share_base_url(mut self, url: impl Into<String>) -> Self {
        self.share_base_url = url.into();
        self
    }

    pub fn strings(&self) -> &'static Strings {
        i18n::strings(self.lang)
    }

    pub fn ticket(&self) -> Ticket {
        Ticket {
            view_epoch: self.view_epoch,
            session_epoch: self.session_epoch,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Whether the generate trigger is currently disabled
    pub fn is_generating(&self) -> bool {
        self.pending_generation.is_some()
    }

    pub fn gallery_items(&self) -> Vec<GalleryItem> {
        self.gallery.items()
    }

    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.back()
    }

    fn notify(&mut self, notification: Notification) {
        if self.notifications.len() >= MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notifications.push_back(notification);
    }

    fn notify_error(&mut self, err: &ClientError) {
        let notification = err.notification(self.lang);
        self.notify(notification);
    }

    /// Sections in the navigation bar; admin only for admins
    pub fn nav_sections(&self) -> Vec<Section> {
        let is_admin = self.session.is_admin();
        Section::ALL
            .into_iter()
            .filter(|s| *s != Section::Admin || is_admin)
            .collect()
    }

    pub fn navigate(&mut self, view: View) -> Vec<Action> {
        if view == View::Admin && !self.session.is_admin() {
            self.notify_error(&AuthError::NotAdmin.into());
            return Vec::new();
        }

        if view == View::Pricing {
            self.upgrade_due = false;
        }
        self.view = view;
        self.view_epoch += 1;
        self.selected = 0;
        self.search = None;
        self.busy = false;
        let ticket = self.ticket();

        match view {
            View::Gallery if self.session.is_signed_in() => {
                self.gallery.loading = true;
                self.gallery.selected = 0;
                vec![Action::LoadGallery { ticket }]
            }
            View::Admin => {
                self.admin.loading = true;
                vec![Action::LoadAdmin { ticket }]
            }
            View::ResetPassword => {
                self.reset = Form::reset_request();
                self.reset_step = ResetStep::Request;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn cycle_section(&mut self, delta: isize) -> Vec<Action> {
        let sections = self.nav_sections();
        let current = self
            .view
            .section()
            .and_then(|s| sections.iter().position(|x| *x == s))
            .map(|i| i as isize)
            .unwrap_or(if delta > 0 { -1 } else { 0 });
        let next = (current + delta).rem_euclid(sections.len() as isize) as usize;
        self.navigate(View::from(sections[next]))
    }

    /// Pick up a new session snapshot from the store
    pub fn sync_session(&mut self, state: SessionState, epoch: u64) -> Vec<Action> {
        let identity_changed = epoch != self.session_epoch;
        // An unverified session that goes away is reported by its own load result
        let was_verified = self.session.is_verified();
        self.session = state;
        self.session_epoch = epoch;

        if !identity_changed {
            return Vec::new();
        }

        self.gallery = GalleryState::default();
        self.admin = AdminState::default();
        self.pricing.last_order = None;
        self.pending_generation = None;
        self.upgrade_due = false;

        if was_verified && !self.session.is_signed_in() && !self.logging_out {
            self.notify_error(&AuthError::SessionInvalid.into());
        }
        self.logging_out = false;

        match self.view {
            View::Admin if !self.session.is_admin() => self.navigate(View::Home),
            View::Gallery => self.navigate(View::Gallery),
            _ => Vec::new(),
        }
    }

    fn text_focused(&self) -> bool {
        match self.view {
            View::Generator => matches!(self.generator.focus, GenField::Prompt | GenField::Model),
            View::Login | View::Register | View::ResetPassword => true,
            View::Pricing => self.pricing.promo.is_some(),
            View::Admin => self.admin.promo_form.is_some(),
            _ => false,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Vec<Action> {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Vec::new();
                }
                KeyCode::Char('f') => {
                    self.search = Some(SearchState::default());
                    return Vec::new();
                }
                KeyCode::Char('l') => {
                    self.lang = self.lang.toggle();
                    return vec![Action::SaveLanguage(self.lang)];
                }
                _ => {}
            }
        }

        if self.search.is_some() {
            return self.handle_search_key(code);
        }

        match code {
            KeyCode::Tab => return self.cycle_section(1),
            KeyCode::BackTab => return self.cycle_section(-1),
            KeyCode::Char('/') if !self.text_focused() => {
                self.search = Some(SearchState::default());
                return Vec::new();
            }
            KeyCode::Char('q') if !self.text_focused() => {
                self.should_quit = true;
                return Vec::new();
            }
            _ => {}
        }

        let handled = match self.view {
            View::Home => self.home_key(code),
            View::Generator => self.generator_key(code),
            View::Gallery => self.gallery_key(code),
            View::Examples => self.examples_key(code),
            View::Prompts => self.prompts_key(code),
            View::Pricing => self.pricing_key(code),
            View::Profile => self.profile_key(code),
            View::Admin => self.admin_key(code),
            View::Login => self.login_key(code, modifiers),
            View::Register => self.register_key(code),
            View::ResetPassword => self.reset_key(code),
            View::Faq | View::Support => None,
        };

        match handled {
            Some(actions) => actions,
            None if code == KeyCode::Esc && self.view != View::Home => self.navigate(View::Home),
            None => Vec::new(),
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) -> Vec<Action> {
        let lang = self.lang;
        let Some(state) = self.search.as_mut() else {
            return Vec::new();
        };
        match code {
            KeyCode::Esc => self.search = None,
            KeyCode::Char(c) => {
                state.query.push(c);
                state.selected = 0;
            }
            KeyCode::Backspace => {
                state.query.pop();
                state.selected = 0;
            }
            KeyCode::Down => state.selected += 1,
            KeyCode::Up => state.selected = state.selected.saturating_sub(1),
            KeyCode::Enter => {
                let hits = search::search(&state.query, lang);
                let hit = hits.get(state.selected.min(hits.len().saturating_sub(1))).cloned();
                self.search = None;
                if let Some(hit) = hit {
                    return self.perform_search_hit(hit);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    /// Results for the open search box, empty (closed) for a blank query
    pub fn search_results(&self) -> Vec<SearchHit> {
        match &self.search {
            Some(state) => search::search(&state.query, self.lang),
            None => Vec::new(),
        }
    }

    fn perform_search_hit(&mut self, hit: SearchHit) -> Vec<Action> {
        match hit.action {
            SearchAction::Navigate(section) => self.navigate(View::from(section)),
            SearchAction::SelectTheme(theme) => {
                self.generator.theme = Some(theme);
                self.navigate(View::Generator)
            }
        }
    }

    fn home_key(&mut self, code: KeyCode) -> Option<Vec<Action>> {
        match code {
            KeyCode::Enter => Some(self.navigate(View::Generator)),
            _ => None,
        }
    }

    fn generator_key(&mut self, code: KeyCode) -> Option<Vec<Action>> {
        let gen = &mut self.generator;
        match code {
            KeyCode::Enter => return Some(self.submit_generation()),
            KeyCode::Down => gen.focus = gen.focus.step(1),
            KeyCode::Up => gen.focus = gen.focus.step(-1),
            KeyCode::Left | KeyCode::Right => {
                let delta = if code == KeyCode::Left { -1 } else { 1 };
                match gen.focus {
                    GenField::Theme => gen.cycle_theme(delta),
                    GenField::Size => {
                        gen.size = if delta > 0 {
                            gen.size.next()
                        } else {
                            gen.size.next().next()
                        }
                    }
                    _ => return None,
                }
            }
            KeyCode::Char(c) => match gen.focus {
                GenField::Prompt => gen.prompt.push(c),
                GenField::Model => gen.model.push(c),
                _ => return None,
            },
            KeyCode::Backspace => match gen.focus {
                GenField::Prompt => {
                    gen.prompt.pop();
                }
                GenField::Model => {
                    gen.model.pop();
                }
                _ => return None,
            },
            _ => return None,
        }
        Some(Vec::new())
    }

    /// Signed-out users are sent to registration and nothing is requested
    pub fn submit_generation(&mut self) -> Vec<Action> {
        if self.is_generating() {
            return Vec::new();
        }
        if !self.session.is_signed_in() {
            self.notify_error(&AuthError::NotSignedIn.into());
            return self.navigate(View::Register);
        }
        if self.upgrade_due {
            return self.navigate(View::Pricing);
        }

        let gen = &self.generator;
        let request = GenerationRequest::new(gen.prompt.clone())
            .with_theme(gen.theme)
            .with_size(gen.size)
            .with_model(gen.model.trim().to_string());
        if let Err(e) = request.effective_prompt() {
            self.notify_error(&e.into());
            return Vec::new();
        }

        let ticket = self.ticket();
        self.pending_generation = Some(ticket);
        vec![Action::Generate { ticket, request }]
    }

    fn gallery_key(&mut self, code: KeyCode) -> Option<Vec<Action>> {
        let count = self.gallery.gallery.len();
        match code {
            KeyCode::Down if count > 0 => {
                self.gallery.selected = (self.gallery.selected + 1).min(count - 1);
                self.gallery.show_share = false;
            }
            KeyCode::Up => {
                self.gallery.selected = self.gallery.selected.saturating_sub(1);
                self.gallery.show_share = false;
            }
            KeyCode::Char('f') => {
                if let Some(item) = self.gallery.selected_item() {
                    self.gallery.gallery.toggle_favorite(&item.image.image_url);
                }
            }
            KeyCode::Char('s') => self.gallery.show_share = !self.gallery.show_share,
            KeyCode::Char('r') => return Some(self.navigate(View::Gallery)),
            KeyCode::Esc if self.gallery.show_share => self.gallery.show_share = false,
            _ => return None,
        }
        Some(Vec::new())
    }

    fn examples_key(&mut self, code: KeyCode) -> Option<Vec<Action>> {
        match code {
            KeyCode::Down => self.selected = (self.selected + 1).min(Theme::ALL.len() - 1),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Enter => {
                self.generator.theme = Theme::ALL.get(self.selected).copied();
                return Some(self.navigate(View::Generator));
            }
            _ => return None,
        }
        Some(Vec::new())
    }

    /// Flattened prompt ideas in display order
    pub fn prompt_ideas(&self) -> Vec<&'static str> {
        self.strings()
            .prompts
            .categories
            .iter()
            .flat_map(|c| c.prompts.iter().copied())
            .collect()
    }

    fn prompts_key(&mut self, code: KeyCode) -> Option<Vec<Action>> {
        let ideas = self.prompt_ideas();
        match code {
            KeyCode::Down => self.selected = (self.selected + 1).min(ideas.len().saturating_sub(1)),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Enter => {
                if let Some(idea) = ideas.get(self.selected) {
                    self.generator.prompt = idea.to_string();
                    self.generator.focus = GenField::Prompt;
                }
                return Some(self.navigate(View::Generator));
            }
            _ => return None,
        }
        Some(Vec::new())
    }

    fn pricing_key(&mut self, code: KeyCode) -> Option<Vec<Action>> {
        if let Some(promo) = self.pricing.promo.as_mut() {
            match code {
                KeyCode::Esc => self.pricing.promo = None,
                KeyCode::Char(c) => promo.push(c),
                KeyCode::Backspace => {
                    promo.pop();
                }
                KeyCode::Enter => {
                    let code = promo.clone();
                    if !self.session.is_signed_in() {
                        return Some(self.navigate(View::Login));
                    }
                    self.busy = true;
                    return Some(vec![Action::RedeemPromo {
                        ticket: self.ticket(),
                        code,
                    }]);
                }
                _ => {}
            }
            return Some(Vec::new());
        }

        let plan = match code {
            KeyCode::Char('1') => PaidPlan::Starter,
            KeyCode::Char('2') => PaidPlan::Standard,
            KeyCode::Char('3') => PaidPlan::Premium,
            KeyCode::Char('p') => {
                self.pricing.promo = Some(String::new());
                return Some(Vec::new());
            }
            _ => return None,
        };
        if !self.session.is_signed_in() {
            return Some(self.navigate(View::Login));
        }
        self.busy = true;
        Some(vec![Action::BuyPlan {
            ticket: self.ticket(),
            plan,
        }])
    }

    fn profile_key(&mut self, code: KeyCode) -> Option<Vec<Action>> {
        if self.session.is_signed_in() {
            match code {
                KeyCode::Char('o') => {
                    self.logging_out = true;
                    let title = self.strings().notices.signed_out;
                    self.notify(Notification::info(title, ""));
                    Some(vec![Action::Logout])
                }
                _ => None,
            }
        } else {
            match code {
                KeyCode::Char('l') | KeyCode::Enter => Some(self.navigate(View::Login)),
                KeyCode::Char('r') => Some(self.navigate(View::Register)),
                _ => None,
            }
        }
    }

    fn admin_key(&mut self, code: KeyCode) -> Option<Vec<Action>> {
        if let Some(form) = self.admin.promo_form.as_mut() {
            if code == KeyCode::Esc {
                self.admin.promo_form = None;
                return Some(Vec::new());
            }
            return match form.handle(code) {
                FormInput::Submit => {
                    let generations = form.value(FieldKey::Generations).trim().parse().ok();
                    let max_uses = form.value(FieldKey::MaxUses).trim().parse().ok();
                    self.admin.promo_form = None;
                    Some(vec![Action::CreatePromo {
                        ticket: self.ticket(),
                        generations,
                        max_uses,
                    }])
                }
                _ => Some(Vec::new()),
            };
        }

        let rows = match self.admin.tab {
            AdminTab::Overview => 0,
            AdminTab::Users => self.admin.users.len(),
            AdminTab::Images => self.admin.images.len(),
            AdminTab::Promos => self.admin.promos.len(),
        };
        match code {
            KeyCode::Left | KeyCode::Right => {
                let delta = if code == KeyCode::Left { -1 } else { 1 };
                self.admin.tab = self.admin.tab.step(delta);
                self.admin.selected = 0;
            }
            KeyCode::Down if rows > 0 => self.admin.selected = (self.admin.selected + 1).min(rows - 1),
            KeyCode::Up => self.admin.selected = self.admin.selected.saturating_sub(1),
            KeyCode::Char('r') => return Some(self.navigate(View::Admin)),
            KeyCode::Char('n') if self.admin.tab == AdminTab::Promos => {
                self.admin.promo_form = Some(Form::promo());
            }
            KeyCode::Char('t') if self.admin.tab == AdminTab::Promos => {
                let promo_id = self.admin.promos.get(self.admin.selected)?.id;
                return Some(vec![Action::TogglePromo {
                    ticket: self.ticket(),
                    promo_id,
                }]);
            }
            _ => return None,
        }
        Some(Vec::new())
    }

    fn login_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<Vec<Action>> {
        if modifiers.contains(KeyModifiers::CONTROL) {
            return match code {
                KeyCode::Char('r') => Some(self.navigate(View::Register)),
                KeyCode::Char('p') => Some(self.navigate(View::ResetPassword)),
                _ => None,
            };
        }
        match self.login.handle(code) {
            FormInput::Submit => {
                self.busy = true;
                Some(vec![Action::Login {
                    ticket: self.ticket(),
                    email: self.login.value(FieldKey::Email).to_string(),
                    password: self.login.value(FieldKey::Password).to_string(),
                }])
            }
            FormInput::Consumed => Some(Vec::new()),
            FormInput::Ignored => None,
        }
    }

    fn register_key(&mut self, code: KeyCode) -> Option<Vec<Action>> {
        match self.register.handle(code) {
            FormInput::Submit => {
                let form = &self.register;
                let full_name = form.value(FieldKey::FullName);
                let registration = Registration {
                    email: form.value(FieldKey::Email).to_string(),
                    username: form.value(FieldKey::Username).to_string(),
                    full_name: (!full_name.trim().is_empty()).then(|| full_name.to_string()),
                    password: form.value(FieldKey::Password).to_string(),
                    confirm_password: form.value(FieldKey::ConfirmPassword).to_string(),
                    accept_terms: form.checked(FieldKey::AcceptTerms),
                };
                // Checked here too so a bad form never leaves the screen
                if let Err(e) = crate::auth::validate_registration(&registration) {
                    self.notify_error(&e.into());
                    return Some(Vec::new());
                }
                self.busy = true;
                Some(vec![Action::Register {
                    ticket: self.ticket(),
                    form: registration,
                }])
            }
            FormInput::Consumed => Some(Vec::new()),
            FormInput::Ignored => None,
        }
    }

    fn reset_key(&mut self, code: KeyCode) -> Option<Vec<Action>> {
        match self.reset.handle(code) {
            FormInput::Submit => {
                self.busy = true;
                let ticket = self.ticket();
                Some(vec![match self.reset_step {
                    ResetStep::Request => Action::RequestReset {
                        ticket,
                        email: self.reset.value(FieldKey::Email).to_string(),
                    },
                    ResetStep::Complete => Action::CompleteReset {
                        ticket,
                        token: self.reset.value(FieldKey::ResetToken).to_string(),
                        password: self.reset.value(FieldKey::Password).to_string(),
                        confirm: self.reset.value(FieldKey::ConfirmPassword).to_string(),
                    },
                }])
            }
            FormInput::Consumed => Some(Vec::new()),
            FormInput::Ignored => None,
        }
    }

    /// Apply a finished request, unless it is stale
    pub fn apply(&mut self, done: Completion) -> Vec<Action> {
        let Completion { ticket, outcome } = done;

        if matches!(outcome, Outcome::Generated(_)) && self.pending_generation == Some(ticket) {
            self.pending_generation = None;
        }

        let current = match outcome.scope() {
            Scope::Always => true,
            Scope::View => ticket.view_epoch == self.view_epoch,
            Scope::Session => ticket.session_epoch == self.session_epoch,
            Scope::ViewAndSession => ticket == self.ticket(),
        };
        if !current {
            tracing::debug!(?ticket, current = ?self.ticket(), "discarding stale result");
            return Vec::new();
        }
        self.busy = false;

        let strings = self.strings();
        match outcome {
            Outcome::SessionLoaded(result) => {
                if let Err(e) = result {
                    self.notify_error(&e);
                }
            }
            Outcome::LoggedIn(result) => match result {
                Ok(()) => {
                    self.login = Form::login();
                    self.notify(Notification::success(strings.notices.signed_in, ""));
                    return self.navigate(View::Generator);
                }
                Err(e) => self.notify_error(&e),
            },
            Outcome::Registered { email, result } => match result {
                Ok(_) => {
                    self.register = Form::register();
                    self.notify(Notification::success(strings.notices.registered, email.clone()));
                    let actions = self.navigate(View::Login);
                    self.login.set(FieldKey::Email, email);
                    self.login.focus = 1;
                    return actions;
                }
                Err(e) => self.notify_error(&e),
            },
            Outcome::ResetRequested(result) => match result {
                Ok(ResetOutcome::TokenIssued { token, .. }) => {
                    self.reset = Form::reset_complete(Some(token));
                    self.reset_step = ResetStep::Complete;
                    self.notify(Notification::success(strings.notices.reset_sent, ""));
                }
                Ok(ResetOutcome::EmailSent { message }) => {
                    self.reset = Form::reset_complete(None);
                    self.reset_step = ResetStep::Complete;
                    self.notify(Notification::info(
                        strings.notices.reset_sent,
                        message.unwrap_or_default(),
                    ));
                }
                Err(e) => self.notify_error(&e),
            },
            Outcome::ResetCompleted(result) => match result {
                Ok(()) => {
                    self.notify(Notification::success(strings.notices.reset_done, ""));
                    return self.navigate(View::Login);
                }
                Err(e) => self.notify_error(&e),
            },
            Outcome::Generated(generation) => return self.apply_generation(generation),
            Outcome::Gallery(result) => {
                self.gallery.loading = false;
                match result {
                    Ok(images) => self.gallery.gallery.set_persisted(images),
                    Err(e) => self.notify_error(&e),
                }
            }
            Outcome::Admin(overview) => self.apply_admin(overview),
            Outcome::PromoCreated(result) => match result {
                Ok(created) => {
                    self.notify(Notification::success(strings.notices.promo_created, created.promo_code));
                    return self.navigate(View::Admin);
                }
                Err(e) => self.notify_error(&e),
            },
            Outcome::PromoToggled { promo_id, result } => match result {
                Ok(is_active) => {
                    if let Some(promo) = self.admin.promos.iter_mut().find(|p| p.id == promo_id) {
                        promo.is_active = is_active;
                    }
                }
                Err(e) => self.notify_error(&e),
            },
            Outcome::PromoRedeemed(result) => match result {
                Ok(resp) => {
                    self.pricing.promo = None;
                    let detail = resp
                        .message
                        .unwrap_or_else(|| format!("+{}", resp.generations_added));
                    self.notify(Notification::success(strings.notices.promo_redeemed, detail));
                }
                Err(e) => self.notify_error(&e),
            },
            Outcome::OrderCreated(result) => match result {
                Ok(order) => {
                    let detail = order
                        .approve_link
                        .clone()
                        .unwrap_or_else(|| order.order_id.clone());
                    self.pricing.last_order = Some(order);
                    self.notify(Notification::success(strings.notices.order_created, detail));
                }
                Err(e) => self.notify_error(&e),
            },
        }
        Vec::new()
    }

    fn apply_generation(&mut self, generation: Generation) -> Vec<Action> {
        let strings = self.strings();
        let Generation {
            result,
            persistence,
            used_fallback_prompt,
        } = generation;

        match result {
            GenerationResult::Success { image, remaining } => {
                let saved = matches!(persistence, Some(Persistence::Saved { .. }));
                let detail = match remaining {
                    Remaining::FreeGenerations(n) => format!("{}: {}", strings.generator.free_left, n),
                    Remaining::Credits(n) => format!("{}: {}", strings.generator.credits_left, n),
                    Remaining::Unreported => String::new(),
                };
                self.notify(Notification::success(strings.notices.generated, detail));
                if let Some(Persistence::Failed { reason }) = &persistence {
                    self.notify(Notification::new(Level::Error, strings.notices.not_saved, reason.clone()));
                }
                self.gallery.gallery.add_generated(image.clone());
                self.generator.last = Some(LastImage {
                    image,
                    remaining,
                    saved,
                    fallback_prompt: used_fallback_prompt,
                });
                Vec::new()
            }
            GenerationResult::QuotaExceeded(quota) => {
                self.notify_error(&quota.into());
                // Half-filled forms are left alone until the next generate
                if self.view == View::Generator || !self.text_focused() {
                    self.navigate(View::Pricing)
                } else {
                    self.upgrade_due = true;
                    Vec::new()
                }
            }
            GenerationResult::Error(e) => {
                self.notify_error(&e);
                Vec::new()
            }
        }
    }

    /// Parts that failed keep their previous data
    fn apply_admin(&mut self, overview: AdminOverview) {
        self.admin.loading = false;
        let AdminOverview {
            stats,
            users,
            images,
            promos,
        } = overview;

        let mut auth_failure = None;
        let mut keep = |err: ClientError| {
            if matches!(err, ClientError::Auth(_)) {
                auth_failure = Some(err);
            }
        };
        match stats {
            Ok(stats) => self.admin.stats = Some(stats),
            Err(e) => keep(e),
        }
        match users {
            Ok(users) => self.admin.users = users,
            Err(e) => keep(e),
        }
        match images {
            Ok(images) => self.admin.images = images,
            Err(e) => keep(e),
        }
        match promos {
            Ok(promos) => self.admin.promos = promos,
            Err(e) => keep(e),
        }
        if let Some(err) = auth_failure {
            self.notify_error(&err);
        }
    }
}
