//! Application state management for the wedding RSVP terminal client.
//!
//! `App` owns the UI state, the RSVP `WizardSession`, the backend handles
//! and the channel through which background tasks report back to the
//! event loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use wedding_rsvp_core::admin::{self, AdminError, GuestList};
use wedding_rsvp_core::auth::{CredentialStore, Session, SessionData};
use wedding_rsvp_core::models::{
    filter_guests, DietaryChoice, Guest, GuestId, NewGuest, SongSuggestion, StatusFilter,
};
use wedding_rsvp_core::playlist::{self, PlaylistError};
use wedding_rsvp_core::wizard::{
    run_debounced, submit_updates, DraftEdit, GuestDraft, SearchOutcome, SubmitError,
};
use wedding_rsvp_core::{
    ApiError, Config, GuestStore, MemoryStore, PlaylistStore, SupabaseClient, WizardPhase,
    WizardSession,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for free-text answers (notes, dietary detail, song names).
const MAX_TEXT_LENGTH: usize = 200;

/// Maximum length for the search box and short names.
const MAX_NAME_LENGTH: usize = 80;

/// Maximum length for email input.
const MAX_EMAIL_LENGTH: usize = 100;

/// Maximum length for password input.
const MAX_PASSWORD_LENGTH: usize = 128;

/// How long a notification stays in the status bar.
const TOAST_DURATION: Duration = Duration::from_secs(6);

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Rsvp,
    Playlist,
    Dashboard,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Rsvp => "Confirmar asistencia",
            Tab::Playlist => "Playlist",
            Tab::Dashboard => "Panel",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Rsvp => Tab::Playlist,
            Tab::Playlist => Tab::Dashboard,
            Tab::Dashboard => Tab::Rsvp,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Rsvp => Tab::Dashboard,
            Tab::Playlist => Tab::Rsvp,
            Tab::Dashboard => Tab::Playlist,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    LoggingIn,
    ConfirmingQuit,
    ConfirmingDelete,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// One editable row of the current wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardField {
    Attending,
    SharedTransport,
    Dietary,
    DietaryOther,
    Departure,
    Return,
    Notes,
}

impl WizardField {
    pub fn label(&self) -> &'static str {
        match self {
            WizardField::Attending => "Asistirá",
            WizardField::SharedTransport => "Mismo autobús para todo el grupo",
            WizardField::Dietary => "Restricción alimentaria",
            WizardField::DietaryOther => "Especifica",
            WizardField::Departure => "Autobús de ida",
            WizardField::Return => "Autobús de vuelta",
            WizardField::Notes => "Algo especial que contarnos",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, WizardField::DietaryOther | WizardField::Notes)
    }
}

/// Rows shown for the current step. Fields that only matter to attending
/// guests are hidden when the guest declines.
pub fn visible_fields(wizard: &WizardSession) -> Vec<WizardField> {
    let Some(draft) = wizard.current_draft() else {
        return Vec::new();
    };

    let mut fields = vec![WizardField::Attending];
    if wizard.shared_transport_available() {
        fields.push(WizardField::SharedTransport);
    }
    if !draft.attending {
        return fields;
    }
    fields.push(WizardField::Dietary);
    if draft.dietary == DietaryChoice::Other {
        fields.push(WizardField::DietaryOther);
    }
    fields.extend([WizardField::Departure, WizardField::Return, WizardField::Notes]);
    fields
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistFocus {
    Song,
    Artist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardFocus {
    List,
    NewName,
    NewGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Destructive,
}

/// A short notification shown in the status bar.
#[derive(Debug, Clone)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

impl Toast {
    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() > TOAST_DURATION
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Where guest data lives for this run.
#[derive(Clone)]
pub enum Backend {
    Hosted(SupabaseClient),
    Demo(Arc<MemoryStore>),
}

impl Backend {
    pub fn is_demo(&self) -> bool {
        matches!(self, Backend::Demo(_))
    }

    /// Store used by guests: public anon access.
    fn public_store(&self) -> Arc<dyn GuestStore> {
        match self {
            Backend::Hosted(client) => Arc::new(client.clone()),
            Backend::Demo(store) => store.clone(),
        }
    }

    fn playlist_store(&self) -> Arc<dyn PlaylistStore> {
        match self {
            Backend::Hosted(client) => Arc::new(client.clone()),
            Backend::Demo(store) => store.clone(),
        }
    }

    /// Store carrying the host's session, if one is available.
    fn admin_store(&self, token: Option<&str>) -> Option<Arc<dyn GuestStore>> {
        match self {
            Backend::Hosted(client) => {
                token.map(|t| Arc::new(client.with_token(t.to_string())) as Arc<dyn GuestStore>)
            }
            Backend::Demo(store) => Some(store.clone()),
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from background tasks to the event loop.
enum BackgroundResult {
    Search(SearchOutcome),
    Submitted(Result<usize, SubmitError>),
    GuestsLoaded(Result<GuestList, AdminError>),
    GuestAdded(Result<NewGuest, AdminError>),
    GuestDeleted(Result<GuestId, AdminError>),
    SongAdded(Result<SongSuggestion, PlaylistError>),
    SignedIn(Result<SessionData, ApiError>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub backend: Backend,
    credentials: CredentialStore,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub toast: Option<Toast>,

    // RSVP wizard
    pub wizard: WizardSession,
    pub field_selection: usize,
    pub submitting: bool,
    search_task: Option<JoinHandle<()>>,

    // Playlist form
    pub song_input: String,
    pub artist_input: String,
    pub playlist_focus: PlaylistFocus,
    pub playlist_busy: bool,

    // Dashboard
    pub guest_list: GuestList,
    pub guests_loaded: bool,
    pub dashboard_focus: DashboardFocus,
    pub dashboard_filter: StatusFilter,
    pub guest_selection: usize,
    pub new_guest_name: String,
    pub new_guest_group: String,
    pub pending_delete: Option<Guest>,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
    pub login_busy: bool,

    // Background task channel
    result_rx: mpsc::Receiver<BackgroundResult>,
    result_tx: mpsc::Sender<BackgroundResult>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config, backend: Backend) -> Result<Self> {
        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, demo = backend.is_demo(), "App::new()");

        let mut session = Session::new(cache_dir);
        if !backend.is_demo() {
            match session.load() {
                Ok(loaded) => debug!(loaded, "Host session checked"),
                Err(e) => warn!(error = %e, "Failed to load host session"),
            }
        }

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_email = config.last_host_email.clone().unwrap_or_default();

        Ok(Self {
            config,
            session,
            backend,
            credentials: CredentialStore::default(),

            state: AppState::Normal,
            current_tab: Tab::Rsvp,
            toast: None,

            wizard: WizardSession::new(),
            field_selection: 0,
            submitting: false,
            search_task: None,

            song_input: String::new(),
            artist_input: String::new(),
            playlist_focus: PlaylistFocus::Song,
            playlist_busy: false,

            guest_list: GuestList::default(),
            guests_loaded: false,
            dashboard_focus: DashboardFocus::List,
            dashboard_filter: StatusFilter::All,
            guest_selection: 0,
            new_guest_name: String::new(),
            new_guest_group: String::new(),
            pending_delete: None,

            login_email,
            login_password: String::new(),
            login_focus: LoginFocus::Email,
            login_error: None,
            login_busy: false,

            result_rx: rx,
            result_tx: tx,
        })
    }

    /// Build the backend from configuration.
    pub fn hosted_backend(config: &Config) -> Result<Backend> {
        let (url, key) = config.backend().context(
            "No backend configured. Set SUPABASE_URL and SUPABASE_ANON_KEY, or run with --demo",
        )?;
        Ok(Backend::Hosted(SupabaseClient::new(url, key)?))
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub fn notify(&mut self, title: &str, description: impl Into<String>) {
        self.toast = Some(Toast {
            title: title.to_string(),
            description: description.into(),
            kind: ToastKind::Info,
            shown_at: Instant::now(),
        });
    }

    pub fn notify_error(&mut self, description: impl Into<String>) {
        self.toast = Some(Toast {
            title: "Error".to_string(),
            description: description.into(),
            kind: ToastKind::Destructive,
            shown_at: Instant::now(),
        });
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Whether the dashboard can be used right now
    pub fn is_host_authenticated(&self) -> bool {
        self.backend.is_demo() || self.session.is_valid()
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        if self.login_password.is_empty() && !self.login_email.is_empty() {
            if let Some(saved) = self.credentials.password_for(&self.login_email) {
                self.login_password = saved;
                self.login_focus = LoginFocus::Button;
            }
        }
        self.login_error = None;
    }

    /// Send the login form to the backend
    pub fn attempt_login(&mut self) {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email y contraseña obligatorios".to_string());
            return;
        }

        let Backend::Hosted(client) = &self.backend else {
            self.state = AppState::Normal;
            return;
        };

        self.login_error = None;
        self.login_busy = true;
        let client = client.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = client.sign_in(&email, &password).await;
            let _ = tx.send(BackgroundResult::SignedIn(result)).await;
        });
    }

    fn finish_login(&mut self, result: Result<SessionData, ApiError>) {
        self.login_busy = false;
        match result {
            Ok(data) => {
                if let Err(e) = self.credentials.remember(&data.email, &self.login_password) {
                    warn!(error = %e, "Failed to store credentials");
                }
                self.config.last_host_email = Some(data.email.clone());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.session.update(data);
                if let Err(e) = self.session.save() {
                    warn!(error = %e, "Failed to save session");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Host signed in");
                self.load_guests();
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(match e {
                    ApiError::Unauthorized | ApiError::InvalidResponse(_) => {
                        "Email o contraseña incorrectos".to_string()
                    }
                    ApiError::NetworkError(_) => {
                        "No se pudo conectar con el servidor".to_string()
                    }
                    other => format!("No se pudo iniciar sesión: {}", other),
                });
            }
        }
    }

    pub fn sign_out(&mut self) {
        if self.backend.is_demo() {
            return;
        }
        if let Some(email) = self.session.email().map(str::to_string) {
            if let Err(e) = self.credentials.forget(&email) {
                warn!(error = %e, "Failed to remove stored credentials");
            }
        }
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
        self.guest_list = GuestList::default();
        self.guests_loaded = false;
        self.notify("Sesión cerrada", "Hasta pronto");
    }

    // =========================================================================
    // RSVP Wizard
    // =========================================================================

    /// Replace the search text and schedule a debounced search.
    pub fn set_search_query(&mut self, query: String) {
        if let Some(pending) = self.search_task.take() {
            pending.abort();
        }
        let Some(request) = self.wizard.set_query(&query) else {
            return;
        };

        let store = self.backend.public_store();
        let delay = Duration::from_millis(self.config.search_debounce_ms);
        let tx = self.result_tx.clone();
        self.search_task = Some(tokio::spawn(async move {
            let outcome = run_debounced(store.as_ref(), request, delay).await;
            let _ = tx.send(BackgroundResult::Search(outcome)).await;
        }));
    }

    /// Move the group highlight by `delta`, starting from the top when
    /// nothing is selected yet.
    pub fn move_group_selection(&mut self, delta: isize) {
        let count = self.wizard.groups().len();
        if count == 0 {
            return;
        }
        let index = match self.wizard.selected_index() {
            None => 0,
            Some(i) => i.saturating_add_signed(delta).min(count - 1),
        };
        if let Err(e) = self.wizard.select_group_at(index) {
            warn!(error = %e, "Group selection out of range");
        }
    }

    /// "Continue": start the wizard for the selected group
    pub fn begin_wizard(&mut self) {
        match self.wizard.begin_wizard() {
            Ok(()) => self.field_selection = 0,
            Err(e) => self.notify_error(e.to_string()),
        }
    }

    pub fn current_field(&self) -> Option<WizardField> {
        visible_fields(&self.wizard).get(self.field_selection).copied()
    }

    /// Keep the field cursor on a visible row after the rows change.
    pub fn clamp_field_selection(&mut self) {
        let count = visible_fields(&self.wizard).len();
        self.field_selection = self.field_selection.min(count.saturating_sub(1));
    }

    fn current_draft_id(&self) -> Option<GuestId> {
        self.wizard.current_draft().map(|d| d.id.clone())
    }

    pub fn current_draft(&self) -> Option<&GuestDraft> {
        self.wizard.current_draft()
    }

    /// Apply an edit to the guest on screen
    pub fn edit_current(&mut self, edit: DraftEdit) {
        let Some(id) = self.current_draft_id() else {
            return;
        };
        if let Err(e) = self.wizard.edit(&id, edit) {
            self.notify_error(e.to_string());
        }
        self.clamp_field_selection();
    }

    pub fn toggle_shared_transport(&mut self) {
        let enable = !self.wizard.shared_transport_enabled();
        if let Err(e) = self.wizard.set_shared_transport(enable) {
            self.notify_error(e.to_string());
        }
    }

    pub fn next_step(&mut self) {
        if self.wizard.advance() {
            self.field_selection = 0;
        }
    }

    pub fn previous_step(&mut self) {
        if self.wizard.retreat() {
            self.field_selection = 0;
        } else {
            self.wizard.back_to_search();
        }
    }

    /// Validate and send the confirmation, one guest at a time.
    pub fn submit_wizard(&mut self) {
        if self.submitting {
            return;
        }
        let plan = match self.wizard.submission_plan() {
            Ok(plan) => plan,
            Err(e) => {
                self.notify_error(e.to_string());
                return;
            }
        };

        self.submitting = true;
        let store = self.backend.public_store();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let outcome = submit_updates(store.as_ref(), &plan).await;
            let _ = tx.send(BackgroundResult::Submitted(outcome)).await;
        });
    }

    fn finish_submission(&mut self, outcome: Result<usize, SubmitError>) {
        self.submitting = false;
        self.wizard.finish_submission(&outcome);
        match outcome {
            Ok(count) => {
                self.field_selection = 0;
                self.notify(
                    "¡Confirmación recibida!",
                    format!("Gracias por confirmar. Hemos guardado {} invitados.", count),
                );
            }
            Err(e) => self.notify_error(e.to_string()),
        }
    }

    // =========================================================================
    // Playlist
    // =========================================================================

    pub fn submit_song(&mut self) {
        if self.playlist_busy {
            return;
        }
        if self.song_input.trim().is_empty() || self.artist_input.trim().is_empty() {
            self.notify_error(PlaylistError::MissingFields.to_string());
            return;
        }

        self.playlist_busy = true;
        let store = self.backend.playlist_store();
        let (song, artist) = (self.song_input.clone(), self.artist_input.clone());
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = playlist::suggest_song(store.as_ref(), &song, &artist).await;
            let _ = tx.send(BackgroundResult::SongAdded(result)).await;
        });
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Reload the full guest list in the background
    pub fn load_guests(&mut self) {
        let Some(store) = self.backend.admin_store(self.session.token()) else {
            return;
        };
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = admin::load_guests(store.as_ref()).await;
            let _ = tx.send(BackgroundResult::GuestsLoaded(result)).await;
        });
    }

    pub fn filtered_guests(&self) -> Vec<&Guest> {
        filter_guests(&self.guest_list.guests, self.dashboard_filter)
    }

    pub fn selected_guest(&self) -> Option<&Guest> {
        self.filtered_guests().get(self.guest_selection).copied()
    }

    pub fn cycle_filter(&mut self) {
        self.dashboard_filter = self.dashboard_filter.next();
        self.guest_selection = 0;
    }

    pub fn add_guest(&mut self) {
        if self.new_guest_name.trim().is_empty() || self.new_guest_group.trim().is_empty() {
            self.notify_error(AdminError::MissingFields.to_string());
            return;
        }
        let Some(store) = self.backend.admin_store(self.session.token()) else {
            self.start_login();
            return;
        };
        let (name, group) = (self.new_guest_name.clone(), self.new_guest_group.clone());
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = admin::add_guest(store.as_ref(), &name, &group).await;
            let _ = tx.send(BackgroundResult::GuestAdded(result)).await;
        });
    }

    /// Ask for confirmation before deleting the selected guest
    pub fn request_delete(&mut self) {
        if let Some(guest) = self.selected_guest().cloned() {
            self.pending_delete = Some(guest);
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let Some(guest) = self.pending_delete.take() else {
            return;
        };
        let Some(store) = self.backend.admin_store(self.session.token()) else {
            self.start_login();
            return;
        };
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = admin::delete_guest(store.as_ref(), &guest.id)
                .await
                .map(|()| guest.id);
            let _ = tx.send(BackgroundResult::GuestDeleted(result)).await;
        });
    }

    fn admin_failed(&mut self, e: AdminError, message: &str) {
        error!(error = %e, "{}", message);
        if matches!(e, AdminError::Api(ApiError::Unauthorized)) && !self.backend.is_demo() {
            if let Err(e) = self.session.clear() {
                warn!(error = %e, "Failed to clear session");
            }
            self.start_login();
        }
        match e {
            AdminError::MissingFields => self.notify_error(e.to_string()),
            _ => self.notify_error(message),
        }
    }

    // =========================================================================
    // Background results
    // =========================================================================

    /// Drain results from finished background tasks
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            self.process_result(result);
        }

        if self.toast.as_ref().map(Toast::is_expired).unwrap_or(false) {
            self.toast = None;
        }
    }

    fn process_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Search(outcome) => {
                self.wizard.apply_search(outcome);
            }
            BackgroundResult::Submitted(outcome) => self.finish_submission(outcome),
            BackgroundResult::GuestsLoaded(Ok(list)) => {
                debug!(count = list.guests.len(), "Guest list loaded");
                self.guest_list = list;
                self.guests_loaded = true;
                let count = self.filtered_guests().len();
                self.guest_selection = self.guest_selection.min(count.saturating_sub(1));
            }
            BackgroundResult::GuestsLoaded(Err(e)) => {
                self.admin_failed(e, "No se pudieron cargar los invitados");
            }
            BackgroundResult::GuestAdded(Ok(_)) => {
                self.notify("¡Éxito!", "Invitado añadido correctamente");
                self.new_guest_name.clear();
                self.new_guest_group.clear();
                self.dashboard_focus = DashboardFocus::List;
                self.load_guests();
            }
            BackgroundResult::GuestAdded(Err(e)) => {
                self.admin_failed(e, "No se pudo añadir el invitado");
            }
            BackgroundResult::GuestDeleted(Ok(id)) => {
                debug!(guest_id = %id, "Guest removed");
                self.notify("Eliminado", "Invitado eliminado correctamente");
                self.load_guests();
            }
            BackgroundResult::GuestDeleted(Err(e)) => {
                self.admin_failed(e, "No se pudo eliminar el invitado");
            }
            BackgroundResult::SongAdded(Ok(song)) => {
                self.playlist_busy = false;
                self.notify(
                    "¡Genial!",
                    format!("\"{}\" de {} añadida a la playlist", song.song_name, song.artist),
                );
                self.song_input.clear();
                self.artist_input.clear();
                self.playlist_focus = PlaylistFocus::Song;
            }
            BackgroundResult::SongAdded(Err(e)) => {
                self.playlist_busy = false;
                error!(error = %e, "Song suggestion failed");
                match e {
                    PlaylistError::MissingFields => self.notify_error(e.to_string()),
                    PlaylistError::Api(_) => self.notify_error("No se pudo añadir la canción"),
                }
            }
            BackgroundResult::SignedIn(result) => self.finish_login(result),
        }
    }

    /// Entering the dashboard loads data, or asks for sign-in first
    pub fn enter_dashboard(&mut self) {
        if !self.is_host_authenticated() {
            self.start_login();
        } else if !self.guests_loaded {
            self.load_guests();
        }
    }

    pub fn is_editing(&self) -> bool {
        self.wizard.phase() == WizardPhase::Editing
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

fn can_add_char(current: &str, max: usize, c: char) -> bool {
    current.chars().count() < max && is_valid_input_char(c)
}

pub fn can_add_text_char(current: &str, c: char) -> bool {
    can_add_char(current, MAX_TEXT_LENGTH, c)
}

pub fn can_add_name_char(current: &str, c: char) -> bool {
    can_add_char(current, MAX_NAME_LENGTH, c)
}

pub fn can_add_email_char(current: &str, c: char) -> bool {
    can_add_char(current, MAX_EMAIL_LENGTH, c) && !c.is_whitespace()
}

pub fn can_add_password_char(current: &str, c: char) -> bool {
    can_add_char(current, MAX_PASSWORD_LENGTH, c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wedding_rsvp_core::models::{GuestGroup, GuestId};

    fn editing_wizard(attending: Option<bool>) -> WizardSession {
        let mut juan = Guest::new("1", "Juan García", Some("Familia García"));
        juan.attending = attending;
        let group = GuestGroup::Named {
            label: "Familia García".to_string(),
            guests: vec![juan, Guest::new("2", "Ana García", Some("Familia García"))],
        };
        let mut wizard = WizardSession::new();
        let request = wizard.set_query("García").expect("searchable");
        wizard.apply_search(SearchOutcome {
            generation: request.generation,
            result: Ok(vec![group]),
        });
        wizard.begin_wizard().expect("start");
        wizard
    }

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Rsvp.next(), Tab::Playlist);
        assert_eq!(Tab::Playlist.next(), Tab::Dashboard);
        assert_eq!(Tab::Dashboard.next(), Tab::Rsvp); // Wraps around
    }

    #[test]
    fn test_tab_prev() {
        assert_eq!(Tab::Rsvp.prev(), Tab::Dashboard); // Wraps around
        assert_eq!(Tab::Dashboard.prev(), Tab::Playlist);
        assert_eq!(Tab::Playlist.prev(), Tab::Rsvp);
    }

    #[test]
    fn test_visible_fields_first_step_of_group() {
        let wizard = editing_wizard(None);
        assert_eq!(
            visible_fields(&wizard),
            vec![
                WizardField::Attending,
                WizardField::SharedTransport,
                WizardField::Dietary,
                WizardField::Departure,
                WizardField::Return,
                WizardField::Notes,
            ]
        );
    }

    #[test]
    fn test_visible_fields_hide_details_when_declining() {
        let mut wizard = editing_wizard(Some(false));
        assert_eq!(
            visible_fields(&wizard),
            vec![WizardField::Attending, WizardField::SharedTransport]
        );

        // A declining first guest can still share transport with the rest.
        wizard.set_shared_transport(true).expect("available on first step");
        assert!(wizard.shared_transport_enabled());

        wizard.advance();
        wizard
            .edit(&GuestId::new("2"), DraftEdit::Attending(false))
            .expect("edit");
        assert_eq!(visible_fields(&wizard), vec![WizardField::Attending]);
    }

    #[test]
    fn test_visible_fields_show_dietary_detail() {
        let mut wizard = editing_wizard(None);
        wizard.advance();
        wizard
            .edit(&GuestId::new("2"), DraftEdit::Dietary(DietaryChoice::Other))
            .expect("edit");
        let fields = visible_fields(&wizard);
        assert!(fields.contains(&WizardField::DietaryOther));
        assert!(!fields.contains(&WizardField::SharedTransport));
    }

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char("", 'a'));
        assert!(!can_add_email_char("", ' '));
        assert!(!can_add_email_char(&"a".repeat(100), 'b'));
        assert!(!can_add_email_char("", '\n'));
    }

    #[test]
    fn test_can_add_text_char_counts_characters() {
        let nearly_full = "ñ".repeat(199);
        assert!(can_add_text_char(&nearly_full, 'é'));
        assert!(!can_add_text_char(&format!("{}ñ", nearly_full), 'a'));
        assert!(!can_add_text_char("", '\x00'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char("", '!'));
        assert!(!can_add_password_char(&"x".repeat(128), 'a'));
        assert!(!can_add_password_char("", '\r'));
    }

    #[test]
    fn test_can_add_name_char() {
        assert!(can_add_name_char("Gar", 'c'));
        assert!(!can_add_name_char(&"a".repeat(80), 'b'));
    }
}
